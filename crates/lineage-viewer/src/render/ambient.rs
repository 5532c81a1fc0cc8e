use bevy::pbr::NotShadowCaster;
use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::render::shapes::point_cloud;
use crate::render::spawn::SceneAssets;

const STAR_COUNT: usize = 12_000;
const STAR_SPREAD: f32 = 16_000.0;
const STAR_DRIFT: f32 = 0.0001;

const MOTE_COUNT: usize = 600;
const MOTE_SPREAD: f32 = 5_000.0;
const MOTE_LIFT: f32 = 500.0;
const MOTE_DRIFT: f32 = -0.0002;

const SPIN_STEP: Vec3 = Vec3::new(0.005, 0.01, 0.0);

#[derive(Component)]
pub struct Starfield;

#[derive(Component)]
pub struct DustMotes;

/// Accumulated idle rotation of a geometric node.
#[derive(Component, Debug, Default, Clone, Copy)]
pub struct Spin {
    pub euler: Vec3,
}

#[derive(Component)]
pub struct UnionPulse;

pub fn pulse_scale(t: f32) -> f32 {
    1.0 + (t * 3.0).sin() * 0.1
}

/// `count` points uniformly spread in a cube of side `spread`, raised by `lift`.
pub fn scatter(rng: &mut impl Rng, count: usize, spread: f32, lift: f32) -> Vec<[f32; 3]> {
    let half = spread / 2.0;
    (0..count)
        .map(|_| {
            [
                rng.gen_range(-half..half),
                rng.gen_range(-half..half) + lift,
                rng.gen_range(-half..half),
            ]
        })
        .collect()
}

pub fn spawn_atmosphere(
    mut commands: Commands,
    mut assets: ResMut<SceneAssets>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut mats: ResMut<Assets<StandardMaterial>>,
) {
    let mut rng = StdRng::seed_from_u64(0x5eed_1a6e);

    let star_mesh = meshes.add(point_cloud(scatter(&mut rng, STAR_COUNT, STAR_SPREAD, 0.0)));
    let star_mat = mats.add(StandardMaterial {
        base_color: Color::srgba_u8(0x66, 0x66, 0x88, 102),
        alpha_mode: AlphaMode::Blend,
        unlit: true,
        fog_enabled: false,
        ..default()
    });

    let mote_mesh = meshes.add(point_cloud(scatter(&mut rng, MOTE_COUNT, MOTE_SPREAD, MOTE_LIFT)));
    let mote_mat = mats.add(StandardMaterial {
        base_color: Color::srgba_u8(0x81, 0x8c, 0xf8, 31),
        alpha_mode: AlphaMode::Add,
        unlit: true,
        ..default()
    });

    commands.spawn((
        PbrBundle {
            mesh: star_mesh.clone(),
            material: star_mat.clone(),
            ..default()
        },
        Starfield,
        NotShadowCaster,
        Name::new("starfield"),
    ));
    commands.spawn((
        PbrBundle {
            mesh: mote_mesh.clone(),
            material: mote_mat.clone(),
            ..default()
        },
        DustMotes,
        NotShadowCaster,
        Name::new("dust"),
    ));

    assets.atmosphere_meshes.extend([star_mesh, mote_mesh]);
    assets.atmosphere_materials.extend([star_mat, mote_mat]);
}

pub fn drift_atmosphere(
    mut stars: Query<&mut Transform, (With<Starfield>, Without<DustMotes>)>,
    mut motes: Query<&mut Transform, (With<DustMotes>, Without<Starfield>)>,
) {
    for mut tf in stars.iter_mut() {
        tf.rotate_y(STAR_DRIFT);
    }
    for mut tf in motes.iter_mut() {
        tf.rotate_y(MOTE_DRIFT);
    }
}

pub fn spin_geometric_nodes(mut q: Query<(&mut Spin, &mut Transform)>) {
    for (mut spin, mut tf) in q.iter_mut() {
        spin.euler += SPIN_STEP;
        tf.rotation = Quat::from_euler(EulerRot::XYZ, spin.euler.x, spin.euler.y, spin.euler.z);
    }
}

pub fn pulse_union_nodes(time: Res<Time>, mut q: Query<&mut Transform, With<UnionPulse>>) {
    let s = pulse_scale(time.elapsed_seconds());
    for mut tf in q.iter_mut() {
        tf.scale = Vec3::splat(s);
    }
}
