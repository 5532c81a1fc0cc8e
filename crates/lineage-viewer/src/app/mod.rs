use bevy::log::{debug, info, warn};
use bevy::prelude::*;
use bevy::render::view::VisibilitySystems;

use crate::app::events::NodeSelected;
use crate::app::resources::{SourceRx, UiState, ViewerSettings};
use crate::camera::CameraController;
use crate::render::camera::BACKGROUND;
use crate::render::spawn::SceneAssets;
use crate::render::{self, Hovered, SurfaceState};
use crate::source::{Incoming, LoaderHandle};
use crate::tree::TreeState;
use crate::ui;
use crate::util::config::ViewerConfig;

pub mod events;
pub mod resources;

/// Trees applied per frame; later arrivals wait for the next frame.
const MAX_TREES_PER_FRAME: usize = 4;

/// Per-frame ordering. Input lands first, the scene is (re)spawned and
/// filtered, then picking, animation and finally the egui overlay. Filter
/// flags reach the ECS in `PostUpdate`.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum FrameSet {
    Input,
    Scene,
    Interaction,
    Animate,
    Overlay,
}

pub struct LineageViewerPlugin {
    pub cfg: ViewerConfig,
}

impl Plugin for LineageViewerPlugin {
    fn build(&self, app: &mut App) {
        let mut tree = TreeState::default();
        tree.apply_viewer_config(&self.cfg);

        app.add_event::<NodeSelected>()
            .insert_resource(ClearColor(BACKGROUND))
            .insert_resource(tree)
            .insert_resource(CameraController::new(self.cfg.navigation))
            .insert_resource(ViewerSettings(self.cfg.clone()))
            .init_resource::<SurfaceState>()
            .init_resource::<SceneAssets>()
            .init_resource::<Hovered>()
            .init_resource::<UiState>()
            .configure_sets(
                Update,
                (
                    FrameSet::Input,
                    FrameSet::Scene,
                    FrameSet::Interaction,
                    FrameSet::Animate,
                    FrameSet::Overlay,
                )
                    .chain(),
            )
            .add_systems(Startup, (render::setup_scene, render::spawn_atmosphere))
            .add_systems(
                Update,
                (
                    pump_source,
                    render::observe_surface,
                    render::record_keys,
                    render::orbit_mouse_input,
                    ui::handle_shortcuts,
                )
                    .in_set(FrameSet::Input),
            )
            .add_systems(
                Update,
                render::spawn_scene
                    .run_if(render::surface_ready.and_then(render::scene_outdated))
                    .in_set(FrameSet::Scene),
            )
            .add_systems(
                Update,
                (render::hover_and_pick, render::apply_selection)
                    .chain()
                    .in_set(FrameSet::Interaction)
                    .run_if(render::scene_live),
            )
            .add_systems(
                Update,
                (
                    render::drive_camera,
                    render::sync_camera,
                    render::drift_atmosphere,
                    render::spin_geometric_nodes,
                    render::pulse_union_nodes,
                )
                    .chain()
                    .in_set(FrameSet::Animate)
                    .run_if(render::scene_live),
            )
            .add_systems(
                Update,
                (
                    ui::ui_panel,
                    ui::node_labels,
                    ui::hover_tooltip,
                    ui::hud_overlay,
                    ui::help_overlay,
                )
                    .chain()
                    .in_set(FrameSet::Overlay),
            )
            .add_systems(Last, (render::teardown_on_exit, stop_loader_on_exit));
        schedule_visibility_sync(app);
    }
}

/// Filter changes can come from any `Update` system, the panel included, so
/// the mirror to `Visibility` runs once they are all done and before bevy
/// resolves visibility for this frame's render.
fn schedule_visibility_sync(app: &mut App) {
    app.add_systems(
        PostUpdate,
        render::sync_visibility.before(VisibilitySystems::VisibilityPropagate),
    );
}

fn stop_loader_on_exit(mut exit: EventReader<AppExit>, loader: Option<ResMut<LoaderHandle>>) {
    if exit.read().next().is_none() {
        return;
    }
    if let Some(mut loader) = loader {
        loader.stop();
    }
}

fn pump_source(mut tree: ResMut<TreeState>, rx: Res<SourceRx>) {
    for msg in rx.0.try_iter().take(MAX_TREES_PER_FRAME) {
        match msg {
            Incoming::Loaded { origin, root } => {
                let members = root.member_count();
                if tree.set_source(origin.clone(), root) {
                    info!(%origin, members, epoch = tree.scene_epoch, "family tree loaded");
                } else {
                    debug!(%origin, "reloaded tree is unchanged");
                }
            }
            Incoming::Error { origin, message } => {
                warn!(%origin, %message, "dataset unavailable");
                tree.record_error(origin, message);
            }
        }
    }
}
