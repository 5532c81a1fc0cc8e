use bevy::input::keyboard::KeyboardInput;
use bevy::input::mouse::{MouseMotion, MouseScrollUnit, MouseWheel};
use bevy::input::ButtonState;
use bevy::pbr::{FogFalloff, FogSettings};
use bevy::prelude::*;
use bevy::window::WindowFocused;
use bevy_egui::EguiContexts;

use crate::camera::CameraController;
use crate::render::spawn::TreeGroup;
use crate::render::surface::SurfaceState;

pub const BACKGROUND: Color = Color::srgb(0.0196, 0.0196, 0.0314);

/// Pixels of trackpad scroll that count as one wheel notch.
const PIXELS_PER_LINE: f32 = 50.0;

#[derive(Component)]
pub struct LineageCamera;

pub fn setup_scene(mut commands: Commands, cam: Res<CameraController>) {
    let nav = &cam.settings;

    commands.insert_resource(AmbientLight {
        color: Color::WHITE,
        brightness: 300.0,
    });

    commands.spawn(PointLightBundle {
        point_light: PointLight {
            color: Color::srgb_u8(0x63, 0x66, 0xf1),
            intensity: 4.0e9,
            range: 8_000.0,
            shadows_enabled: false,
            ..default()
        },
        transform: Transform::from_xyz(0.0, 2000.0, 0.0),
        ..default()
    });

    commands.spawn((
        Camera3dBundle {
            projection: PerspectiveProjection {
                fov: nav.fov_degrees.to_radians(),
                near: nav.near,
                far: nav.far,
                ..default()
            }
            .into(),
            transform: cam.camera_transform(),
            ..default()
        },
        FogSettings {
            color: BACKGROUND,
            falloff: FogFalloff::ExponentialSquared { density: 0.0004 },
            ..default()
        },
        LineageCamera,
    ));
}

/// Left drag orbits, right or middle drag pans, the wheel dollies.
pub fn orbit_mouse_input(
    mut contexts: EguiContexts,
    buttons: Res<ButtonInput<MouseButton>>,
    mut motion: EventReader<MouseMotion>,
    mut wheel: EventReader<MouseWheel>,
    surface: Res<SurfaceState>,
    mut cam: ResMut<CameraController>,
) {
    let delta: Vec2 = motion.read().map(|m| m.delta).sum();
    let scroll: f32 = wheel
        .read()
        .map(|w| match w.unit {
            MouseScrollUnit::Line => w.y,
            MouseScrollUnit::Pixel => w.y / PIXELS_PER_LINE,
        })
        .sum();

    if contexts.ctx_mut().wants_pointer_input() {
        return;
    }

    let height = surface.size.y;
    let fov = cam.settings.fov_degrees.to_radians();
    if delta != Vec2::ZERO {
        if buttons.pressed(MouseButton::Left) {
            cam.orbit.rotate(delta, height);
        } else if buttons.pressed(MouseButton::Right) || buttons.pressed(MouseButton::Middle) {
            cam.orbit.pan(delta, height, fov);
        }
    }
    if scroll != 0.0 {
        cam.orbit.zoom(scroll);
    }
}

/// Feeds the held-key table. Presses are ignored while a text field has
/// focus; releases always land so keys never stick.
pub fn record_keys(
    mut contexts: EguiContexts,
    mut keys: EventReader<KeyboardInput>,
    mut focus: EventReader<WindowFocused>,
    mut cam: ResMut<CameraController>,
) {
    let typing = contexts.ctx_mut().wants_keyboard_input();
    for ev in keys.read() {
        match ev.state {
            ButtonState::Pressed if !typing => cam.keys.press(ev.key_code),
            ButtonState::Pressed => {}
            ButtonState::Released => cam.keys.release(ev.key_code),
        }
    }
    if focus.read().any(|f| !f.focused) {
        cam.keys.clear();
    }
}

pub fn drive_camera(time: Res<Time>, mut cam: ResMut<CameraController>) {
    cam.advance_transition(time.delta_seconds());
    cam.step_keyboard();
    cam.update_orbit();
}

pub fn sync_camera(
    cam: Res<CameraController>,
    mut cameras: Query<&mut Transform, (With<LineageCamera>, Without<TreeGroup>)>,
    mut groups: Query<&mut Transform, (With<TreeGroup>, Without<LineageCamera>)>,
) {
    for mut tf in cameras.iter_mut() {
        *tf = cam.camera_transform();
    }
    let rotation = cam.group_quat();
    for mut tf in groups.iter_mut() {
        tf.rotation = rotation;
    }
}
