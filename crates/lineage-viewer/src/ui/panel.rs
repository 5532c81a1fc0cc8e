use bevy::log::{info, warn};
use bevy::prelude::{EventWriter, ResMut};
use bevy_egui::{egui, EguiContexts};

use crate::app::events::NodeSelected;
use crate::app::resources::{UiState, ViewerSettings};
use crate::camera::CameraController;
use crate::tree::TreeState;
use crate::ui::PANEL_W;
use crate::util::config;

const MAX_SPIN_SPEED: f32 = 20.0;

/// The slider reaches the deepest generation in the tree, or the current
/// cutoff when that is larger so loading a shallow tree keeps the setting.
fn generation_slider_max(tree: &TreeState) -> u32 {
    tree.deepest_generation().max(tree.max_generation)
}

pub fn ui_panel(
    mut contexts: EguiContexts,
    mut tree: ResMut<TreeState>,
    mut cam: ResMut<CameraController>,
    mut settings: ResMut<ViewerSettings>,
    mut ui_state: ResMut<UiState>,
    mut selected: EventWriter<NodeSelected>,
) {
    egui::SidePanel::left("left")
        .default_width(PANEL_W)
        .show(contexts.ctx_mut(), |ui| {
            ui.heading("Lineage");
            ui.label(format!("members: {}", tree.member_count()));
            if !tree.layout.is_empty() {
                ui.label(format!("generations: {}", tree.deepest_generation() + 1));
            }
            if !tree.origin.is_empty() {
                ui.label(format!("source: {}", tree.origin));
            }
            ui.separator();

            ui.label("Search (name or spouse):");
            let mut term = tree.search.clone();
            if ui.text_edit_singleline(&mut term).changed() {
                tree.set_search(term);
            }
            if !tree.search.is_empty() {
                ui.label(format!("matches: {}", tree.scene.highlighted_count()));
            }

            ui.add_space(8.0);
            let mut max_gen = tree.max_generation;
            ui.add(egui::Slider::new(&mut max_gen, 0..=generation_slider_max(&tree)).text("max generation"));
            if max_gen != tree.max_generation {
                tree.set_max_generation(max_gen);
            }

            ui.add_space(8.0);
            ui.separator();
            ui.heading("Camera");
            let mut auto = cam.orbit.auto_rotate;
            let mut speed = cam.orbit.auto_rotate_speed;
            ui.checkbox(&mut auto, "Auto-rotate");
            ui.add(egui::Slider::new(&mut speed, 0.0..=MAX_SPIN_SPEED).text("spin speed"));
            if auto != cam.orbit.auto_rotate || speed != cam.orbit.auto_rotate_speed {
                cam.set_auto_rotate(auto, speed);
            }
            if ui.button("Reset view (Space)").clicked() && !cam.reset_view() {
                ui_state.status = Some("camera is still moving".to_string());
            }

            ui.add_space(8.0);
            if ui.button("Save as defaults").clicked() {
                let mut cfg = settings.0.clone();
                cfg.max_generation = tree.max_generation;
                cfg.navigation = cam.settings;
                match config::save(&cfg) {
                    Ok(path) => {
                        info!(path = %path.display(), "viewer config saved");
                        ui_state.status = Some(format!("saved to {}", path.display()));
                        settings.0 = cfg;
                    }
                    Err(e) => {
                        warn!(error = %e, "failed to save viewer config");
                        ui_state.status = Some(format!("save failed: {e:#}"));
                    }
                }
            }
            if let Some(status) = &ui_state.status {
                ui.small(status);
            }

            let Some(person) = tree.selected_source().cloned() else {
                ui.add_space(8.0);
                ui.label("Click a member to see details.");
                return;
            };

            ui.add_space(8.0);
            ui.separator();
            ui.heading(&person.name);
            if let Some(spouse) = &person.spouse {
                ui.label(format!("spouse: {spouse}"));
            }
            if let Some(role) = person.role.display_name() {
                ui.label(format!("role: {role}"));
            }

            let descendants = person.descendants();
            ui.label(format!("descendants: {}", descendants.len()));
            egui::ScrollArea::vertical()
                .max_height(260.0)
                .show(ui, |ui| {
                    for d in &descendants {
                        if ui.link(&d.name).clicked() {
                            if let Some(node) = tree.index_of(d) {
                                selected.send(NodeSelected {
                                    node,
                                    source: d.clone(),
                                });
                            }
                        }
                    }
                });

            if ui.button("Close").clicked() {
                tree.selected = None;
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use lineage_core::{Role, SourceNode};
    use std::sync::Arc;

    fn chain(len: usize) -> Arc<SourceNode> {
        let mut node = SourceNode::new(format!("G{}", len - 1), Role::Generic);
        for depth in (0..len - 1).rev() {
            node = SourceNode::new(format!("G{depth}"), Role::Generic).with_child(node);
        }
        Arc::new(node)
    }

    #[test]
    fn slider_reaches_the_deepest_generation() {
        let mut tree = TreeState::default();
        tree.set_source("deep", chain(16));
        assert_eq!(tree.deepest_generation(), 15);
        assert_eq!(generation_slider_max(&tree), 15);

        tree.set_source("shallow", chain(3));
        assert_eq!(generation_slider_max(&tree), tree.max_generation);
    }
}
