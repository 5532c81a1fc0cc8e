pub mod ambient;
pub mod camera;
pub mod picking;
pub mod shapes;
pub mod spawn;
pub mod surface;

use bevy::prelude::Res;

use crate::render::spawn::SceneAssets;

pub use ambient::{drift_atmosphere, pulse_union_nodes, spawn_atmosphere, spin_geometric_nodes};
pub use camera::{drive_camera, orbit_mouse_input, record_keys, setup_scene, sync_camera};
pub use picking::{apply_selection, hover_and_pick, Hovered};
pub use spawn::{scene_outdated, spawn_scene, sync_visibility, teardown_on_exit};
pub use surface::{observe_surface, surface_ready, SurfaceState};

/// True once a tree has been spawned; idle animation and picking wait for it.
pub fn scene_live(assets: Res<SceneAssets>) -> bool {
    assets.group.is_some()
}
