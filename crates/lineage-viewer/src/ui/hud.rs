use bevy::prelude::{Local, Res, Time};
use bevy_egui::{egui, EguiContexts};

use crate::camera::CameraController;
use crate::tree::TreeState;
use crate::ui::{
    HUD_EDGE_PADDING, HUD_FALLBACK_Y_OFFSET, HUD_MIN_CONTENT_W, HUD_PANEL_GAP, PANEL_W,
};

const FPS_SMOOTHING: f32 = 0.1;

/// Exponential moving average of the frame rate.
fn smooth_fps(prev: f32, dt: f32) -> f32 {
    if dt <= 0.0 {
        return prev;
    }
    let now = 1.0 / dt;
    if prev <= 0.0 {
        now
    } else {
        prev + (now - prev) * FPS_SMOOTHING
    }
}

pub fn hud_overlay(
    mut contexts: EguiContexts,
    time: Res<Time>,
    tree: Res<TreeState>,
    cam: Res<CameraController>,
    mut fps: Local<f32>,
) {
    *fps = smooth_fps(*fps, time.delta_seconds());

    let ctx = contexts.ctx_mut();
    let screen = ctx.screen_rect();
    let mut x = screen.min.x + PANEL_W + HUD_PANEL_GAP;
    let mut y = screen.min.y + HUD_EDGE_PADDING;
    if screen.width() < PANEL_W + HUD_MIN_CONTENT_W {
        x = screen.min.x + HUD_EDGE_PADDING;
        y = screen.min.y + HUD_EDGE_PADDING + HUD_FALLBACK_Y_OFFSET;
    }

    egui::Area::new("hud".into())
        .order(egui::Order::Foreground)
        .fixed_pos(egui::pos2(x, y))
        .show(ctx, |ui| {
            ui.group(|ui| {
                ui.label(format!("FPS: {:.0}", *fps));
                ui.label(format!(
                    "Visible: {} / {} members",
                    tree.scene.visible_nodes(),
                    tree.member_count()
                ));
                if !tree.search.is_empty() {
                    ui.label(format!("Highlighted: {}", tree.scene.highlighted_count()));
                }
                ui.label(format!("Generations shown: 0..={}", tree.max_generation));
                if let Some(kind) = cam.transition_kind() {
                    ui.label(format!("Camera: {kind:?}"));
                }
                if tree.layout.is_empty() {
                    ui.label("Waiting for family data...");
                }
                if let Some((origin, message)) = &tree.last_error {
                    ui.colored_label(
                        egui::Color32::from_rgb(0xf8, 0x71, 0x71),
                        format!("{origin}: {message}"),
                    );
                }
            });
        });
}
