use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};

use crate::app::events::NodeSelected;
use crate::camera::CameraController;
use crate::render::camera::LineageCamera;
use crate::render::spawn::SceneAssets;
use crate::tree::{Tint, TreeState};

/// Labels float this far above their node, in tree space.
const LABEL_LIFT: Vec3 = Vec3::new(0.0, 50.0, 0.0);

fn color32(tint: Tint) -> egui::Color32 {
    let [r, g, b] = tint.rgb();
    egui::Color32::from_rgb(r, g, b)
}

/// Name tags drawn after the 3D pass. Clicking a tag selects the member.
pub fn node_labels(
    mut contexts: EguiContexts,
    tree: Res<TreeState>,
    cam: Res<CameraController>,
    assets: Res<SceneAssets>,
    cam_q: Query<(&Camera, &GlobalTransform), With<LineageCamera>>,
    mut out: EventWriter<NodeSelected>,
) {
    if assets.group.is_none() {
        return;
    }
    let Ok((camera, cam_tf)) = cam_q.get_single() else {
        return;
    };
    let ctx = contexts.ctx_mut();
    let group = cam.group_quat();

    for label in &tree.scene.labels {
        let Some(node) = tree.scene.nodes.get(label.node) else {
            continue;
        };
        if !node.visible {
            continue;
        }
        let world = group * (node.position + LABEL_LIFT);
        let Some(screen) = camera.world_to_viewport(cam_tf, world) else {
            continue;
        };

        let mut name = egui::RichText::new(&label.name).size(11.0).strong();
        name = if label.highlighted {
            name.color(egui::Color32::BLACK)
                .background_color(color32(Tint::Highlight))
        } else if node.is_union {
            name.color(color32(Tint::Accent))
        } else {
            name.color(egui::Color32::from_gray(225))
        };

        egui::Area::new(egui::Id::new(("node_label", label.node)))
            .order(egui::Order::Background)
            .pivot(egui::Align2::CENTER_BOTTOM)
            .fixed_pos(egui::pos2(screen.x, screen.y))
            .show(ctx, |ui| {
                ui.vertical_centered(|ui| {
                    let resp = ui.add(egui::Label::new(name).sense(egui::Sense::click()));
                    if let Some(role) = &label.role_text {
                        ui.label(egui::RichText::new(role.to_uppercase()).size(7.0).weak());
                    }
                    if resp.clicked() {
                        if let Some(layout) = tree.layout.nodes.get(node.layout) {
                            out.send(NodeSelected {
                                node: node.layout,
                                source: layout.source.clone(),
                            });
                        }
                    }
                });
            });
    }
}
