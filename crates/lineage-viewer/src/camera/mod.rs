pub mod keys;
pub mod orbit;
pub mod transition;

use bevy::log::debug;
use bevy::prelude::{EulerRot, Quat, Resource, Transform, Vec3};
use serde::{Deserialize, Serialize};

use keys::{KeyState, NavMode};
use orbit::OrbitControls;
use transition::{Channel, Ease, Track, Transition, TransitionKind};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavSettings {
    pub home_position: [f32; 3],
    pub home_target: [f32; 3],
    pub move_speed: f32,
    pub rot_speed: f32,
    pub damping: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub focus_distance: f32,
    pub focus_height: f32,
    pub focus_duration: f32,
    pub reset_rotation_duration: f32,
    pub reset_camera_duration: f32,
    pub auto_rotate: bool,
    pub auto_rotate_speed: f32,
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for NavSettings {
    fn default() -> Self {
        Self {
            home_position: [4000.0, 2500.0, 4000.0],
            home_target: [0.0, 500.0, 0.0],
            move_speed: 65.0,
            rot_speed: 0.04,
            damping: 0.08,
            min_distance: 100.0,
            max_distance: 14_000.0,
            focus_distance: 800.0,
            focus_height: 300.0,
            focus_duration: 2.5,
            reset_rotation_duration: 2.5,
            reset_camera_duration: 3.0,
            auto_rotate: true,
            auto_rotate_speed: 4.0,
            fov_degrees: 60.0,
            near: 1.0,
            far: 20_000.0,
        }
    }
}

impl NavSettings {
    pub fn home_position(&self) -> Vec3 {
        Vec3::from_array(self.home_position)
    }

    pub fn home_target(&self) -> Vec3 {
        Vec3::from_array(self.home_target)
    }
}

/// Camera pose plus the rotation of the tree's content group. Scripted
/// transitions are exclusive: while one runs, new focus/reset requests and
/// keyboard navigation are dropped.
#[derive(Resource, Debug, Clone)]
pub struct CameraController {
    pub orbit: OrbitControls,
    /// Euler angles (XYZ) of the content group.
    pub group_rotation: Vec3,
    pub keys: KeyState,
    pub settings: NavSettings,
    transition: Option<Transition>,
}

impl Default for CameraController {
    fn default() -> Self {
        Self::new(NavSettings::default())
    }
}

impl CameraController {
    pub fn new(settings: NavSettings) -> Self {
        let mut orbit = OrbitControls::new(settings.home_position(), settings.home_target());
        orbit.damping = settings.damping;
        orbit.min_distance = settings.min_distance;
        orbit.max_distance = settings.max_distance;
        orbit.auto_rotate = settings.auto_rotate;
        orbit.auto_rotate_speed = settings.auto_rotate_speed;
        Self {
            orbit,
            group_rotation: Vec3::ZERO,
            keys: KeyState::default(),
            settings,
            transition: None,
        }
    }

    pub fn is_transitioning(&self) -> bool {
        self.transition.is_some()
    }

    pub fn transition_kind(&self) -> Option<TransitionKind> {
        self.transition.as_ref().map(|t| t.kind)
    }

    pub fn set_auto_rotate(&mut self, enabled: bool, speed: f32) {
        self.orbit.auto_rotate = enabled;
        self.orbit.auto_rotate_speed = speed;
        self.settings.auto_rotate = enabled;
        self.settings.auto_rotate_speed = speed;
    }

    /// Flies the camera to a point offset from `target`, looking at it.
    /// Returns `false` if another transition is still running.
    pub fn focus_on(&mut self, target: Vec3) -> bool {
        if self.is_transitioning() {
            debug!("focus request dropped: transition in progress");
            return false;
        }
        let s = &self.settings;
        let dir = target.normalize_or_zero();
        let destination = target + Vec3::new(dir.x * s.focus_distance, s.focus_height, dir.z * s.focus_distance);

        self.transition = Some(
            Transition::new(TransitionKind::Focus)
                .with_track(Track {
                    channel: Channel::CameraPosition,
                    from: self.orbit.position,
                    to: destination,
                    duration: s.focus_duration,
                    ease: Ease::ExpoInOut,
                })
                .with_track(Track {
                    channel: Channel::OrbitTarget,
                    from: self.orbit.target,
                    to: target,
                    duration: s.focus_duration,
                    ease: Ease::ExpoInOut,
                }),
        );
        true
    }

    /// Returns camera, target and content-group rotation to the home pose.
    pub fn reset_view(&mut self) -> bool {
        if self.is_transitioning() {
            debug!("reset request dropped: transition in progress");
            return false;
        }
        let s = &self.settings;
        self.transition = Some(
            Transition::new(TransitionKind::Reset)
                .with_track(Track {
                    channel: Channel::GroupRotation,
                    from: self.group_rotation,
                    to: Vec3::ZERO,
                    duration: s.reset_rotation_duration,
                    ease: Ease::QuadInOut,
                })
                .with_track(Track {
                    channel: Channel::CameraPosition,
                    from: self.orbit.position,
                    to: s.home_position(),
                    duration: s.reset_camera_duration,
                    ease: Ease::CubicInOut,
                })
                .with_track(Track {
                    channel: Channel::OrbitTarget,
                    from: self.orbit.target,
                    to: s.home_target(),
                    duration: s.reset_camera_duration,
                    ease: Ease::CubicInOut,
                }),
        );
        true
    }

    pub fn advance_transition(&mut self, dt: f32) {
        let Some(tr) = self.transition.as_mut() else {
            return;
        };
        for (channel, value) in tr.advance(dt) {
            match channel {
                Channel::CameraPosition => self.orbit.position = value,
                Channel::OrbitTarget => self.orbit.target = value,
                Channel::GroupRotation => self.group_rotation = value,
            }
        }
        if tr.is_finished() {
            debug!(kind = ?tr.kind, "transition finished");
            self.transition = None;
        }
    }

    /// One frame of held-key navigation.
    pub fn step_keyboard(&mut self) {
        if self.is_transitioning() {
            return;
        }
        let input = self.keys.nav_input();
        if input.is_idle() {
            return;
        }

        let speed = self.settings.move_speed;
        match input.mode {
            NavMode::Spin => {
                self.group_rotation.y += input.x * self.settings.rot_speed;
                self.group_rotation.x -= input.y * self.settings.rot_speed;
            }
            NavMode::Fly => {
                let basis = self.orbit.basis();
                self.orbit
                    .translate(basis.forward * input.y * speed + basis.right * input.x * speed);
            }
            NavMode::Pan => {
                let basis = self.orbit.basis();
                self.orbit
                    .translate(basis.right * input.x * speed + basis.up * input.y * speed);
            }
        }

        if input.reset {
            self.reset_view();
        }
    }

    pub fn update_orbit(&mut self) {
        self.orbit.update();
    }

    pub fn group_quat(&self) -> Quat {
        let r = self.group_rotation;
        Quat::from_euler(EulerRot::XYZ, r.x, r.y, r.z)
    }

    pub fn camera_transform(&self) -> Transform {
        self.orbit.transform()
    }

    pub fn group_transform(&self) -> Transform {
        Transform::from_rotation(self.group_quat())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::prelude::KeyCode;

    fn still() -> CameraController {
        let mut cam = CameraController::default();
        cam.set_auto_rotate(false, 0.0);
        cam
    }

    fn run_to_end(cam: &mut CameraController) {
        for _ in 0..400 {
            cam.advance_transition(1.0 / 60.0);
            cam.update_orbit();
        }
    }

    #[test]
    fn focus_while_animating_is_ignored() {
        let mut cam = still();
        let first = Vec3::new(750.0, 1350.0, 0.0);
        assert!(cam.focus_on(first));
        cam.advance_transition(0.5);

        assert!(!cam.focus_on(Vec3::new(-2000.0, 0.0, 0.0)));
        assert!(!cam.reset_view());
        assert_eq!(cam.transition_kind(), Some(TransitionKind::Focus));

        run_to_end(&mut cam);
        assert!(!cam.is_transitioning());
        assert!(cam.orbit.target.distance(first) < 1e-2);
        let dir = first.normalize();
        let expected = first + Vec3::new(dir.x * 800.0, 300.0, dir.z * 800.0);
        assert!(cam.orbit.position.distance(expected) < 0.5);
    }

    #[test]
    fn reset_returns_to_home() {
        let mut cam = still();
        cam.group_rotation = Vec3::new(0.4, -1.2, 0.0);
        cam.orbit.translate(Vec3::new(300.0, -200.0, 50.0));

        assert!(cam.reset_view());
        run_to_end(&mut cam);

        assert!(cam.group_rotation.length() < 1e-5);
        assert!(cam.orbit.target.distance(cam.settings.home_target()) < 1e-2);
        assert!(cam.orbit.position.distance(cam.settings.home_position()) < 1.0);
    }

    #[test]
    fn keyboard_is_blocked_during_transition() {
        let mut cam = still();
        cam.keys.press(KeyCode::ArrowRight);
        assert!(cam.focus_on(Vec3::new(0.0, 1800.0, 0.0)));
        let target = cam.orbit.target;
        cam.step_keyboard();
        assert_eq!(cam.orbit.target, target);
    }

    #[test]
    fn keyboard_modes_move_the_right_thing() {
        let mut cam = still();
        let target = cam.orbit.target;

        cam.keys.press(KeyCode::ArrowRight);
        cam.step_keyboard();
        assert!((cam.orbit.target.distance(target) - 65.0).abs() < 1e-2);
        assert_eq!(cam.group_rotation, Vec3::ZERO);

        cam.keys.press(KeyCode::ShiftLeft);
        cam.keys.press(KeyCode::ArrowUp);
        let before = cam.orbit.target;
        cam.step_keyboard();
        assert_eq!(cam.orbit.target, before);
        assert!((cam.group_rotation.y - 0.04).abs() < 1e-6);
        assert!((cam.group_rotation.x + 0.04).abs() < 1e-6);
    }

    #[test]
    fn alt_arrows_fly_along_the_view() {
        let mut cam = still();
        cam.keys.press(KeyCode::AltLeft);
        cam.keys.press(KeyCode::ArrowUp);

        let basis = cam.orbit.basis();
        let (position, target) = (cam.orbit.position, cam.orbit.target);
        cam.step_keyboard();
        assert!(cam.orbit.target.distance(target + basis.forward * 65.0) < 1e-2);
        assert!(cam.orbit.position.distance(position + basis.forward * 65.0) < 1e-2);
        assert!(cam.orbit.position.distance(position) > 64.0);

        cam.keys.release(KeyCode::ArrowUp);
        cam.keys.press(KeyCode::ArrowLeft);
        let basis = cam.orbit.basis();
        let target = cam.orbit.target;
        cam.step_keyboard();
        assert!(cam.orbit.target.distance(target - basis.right * 65.0) < 1e-2);
        assert_eq!(cam.group_rotation, Vec3::ZERO);
    }

    #[test]
    fn space_starts_reset() {
        let mut cam = still();
        cam.keys.press(KeyCode::Space);
        cam.step_keyboard();
        assert_eq!(cam.transition_kind(), Some(TransitionKind::Reset));
    }
}
