use bevy::log::{debug, info};
use bevy::prelude::*;
use bevy::window::{PrimaryWindow, WindowResized};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceAction {
    /// Zero-sized surface; nothing can be built yet.
    Deferred,
    /// First usable size: build the scene now.
    Build,
    Resize,
}

/// Tracks the drawable surface. Scene construction waits for the first
/// non-zero size and happens exactly once per surface.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct SurfaceState {
    ready: bool,
    pub size: Vec2,
}

impl SurfaceState {
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn observe(&mut self, width: f32, height: f32) -> SurfaceAction {
        if width <= 0.0 || height <= 0.0 {
            return SurfaceAction::Deferred;
        }
        self.size = Vec2::new(width, height);
        if self.ready {
            SurfaceAction::Resize
        } else {
            self.ready = true;
            SurfaceAction::Build
        }
    }
}

pub fn observe_surface(
    mut surface: ResMut<SurfaceState>,
    windows: Query<&Window, With<PrimaryWindow>>,
    mut resized: EventReader<WindowResized>,
) {
    if surface.is_ready() {
        for ev in resized.read() {
            if surface.observe(ev.width, ev.height) == SurfaceAction::Resize {
                debug!(width = ev.width, height = ev.height, "surface resized");
            }
        }
        return;
    }

    let Ok(window) = windows.get_single() else {
        return;
    };
    if surface.observe(window.width(), window.height()) == SurfaceAction::Build {
        info!(
            width = window.width(),
            height = window.height(),
            "surface ready"
        );
    }
}

pub fn surface_ready(surface: Res<SurfaceState>) -> bool {
    surface.is_ready()
}
