use bevy::prelude::ResMut;
use bevy_egui::{egui, EguiContexts};

use crate::app::resources::UiState;

pub fn help_overlay(mut contexts: EguiContexts, mut ui_state: ResMut<UiState>) {
    if !ui_state.help_open {
        return;
    }

    let mut open = true;
    egui::Window::new("Help / Shortcuts")
        .open(&mut open)
        .collapsible(false)
        .resizable(false)
        .show(contexts.ctx_mut(), |ui| {
            ui.label("Drag: orbit");
            ui.label("Right drag: pan");
            ui.label("Wheel: zoom");
            ui.label("Arrows: pan camera");
            ui.label("Shift + arrows: rotate the tree");
            ui.label("Alt + arrows: fly forward/back, strafe");
            ui.label("Space: reset view");
            ui.label("Click a member or its name: focus and show details");
            ui.label("F: focus selected member");
            ui.label("Esc: clear selection, close overlays");
            ui.label("? or F1: toggle help");
        });
    if !open {
        ui_state.help_open = false;
    }
}
