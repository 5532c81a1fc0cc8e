use bevy::prelude::{EventWriter, ResMut};
use bevy_egui::{egui, EguiContexts};

use crate::app::events::NodeSelected;
use crate::app::resources::UiState;
use crate::tree::TreeState;

pub fn handle_shortcuts(
    mut contexts: EguiContexts,
    mut tree: ResMut<TreeState>,
    mut ui_state: ResMut<UiState>,
    mut selected: EventWriter<NodeSelected>,
) {
    let ctx = contexts.ctx_mut();
    let esc_pressed = ctx.input(|i| i.key_pressed(egui::Key::Escape));
    let wants_keyboard = ctx.wants_keyboard_input();

    if esc_pressed {
        ui_state.help_open = false;
        ui_state.status = None;
        tree.selected = None;
    }

    if wants_keyboard {
        return;
    }

    if ctx.input(|i| i.key_pressed(egui::Key::Questionmark) || i.key_pressed(egui::Key::F1)) {
        ui_state.help_open = !ui_state.help_open;
    }
    if ctx.input(|i| i.key_pressed(egui::Key::F)) {
        if let Some(node) = tree.selected {
            if let Some(source) = tree.selected_source().cloned() {
                selected.send(NodeSelected { node, source });
            }
        }
    }
}
