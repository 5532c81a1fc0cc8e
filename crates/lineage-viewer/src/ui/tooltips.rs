use bevy::prelude::Res;
use bevy_egui::{egui, EguiContexts};

use crate::render::Hovered;
use crate::tree::TreeState;

pub fn render_tooltip(
    ctx: &egui::Context,
    id: &str,
    pos: egui::Pos2,
    lines: impl IntoIterator<Item = String>,
) {
    egui::Area::new(egui::Id::new(id))
        .order(egui::Order::Tooltip)
        .fixed_pos(pos)
        .show(ctx, |ui| {
            ui.group(|ui| {
                for line in lines {
                    ui.label(line);
                }
            });
        });
}

pub fn member_lines(tree: &TreeState, node: usize) -> Vec<String> {
    let Some(layout) = tree.layout.nodes.get(node) else {
        return Vec::new();
    };
    let source = &layout.source;
    let mut lines = vec![source.name.clone()];
    if let Some(spouse) = &source.spouse {
        lines.push(format!("spouse: {spouse}"));
    }
    if let Some(role) = source.role.display_name() {
        lines.push(format!("role: {role}"));
    }
    lines.push(format!("generation {}", layout.depth));
    if !source.is_leaf() {
        lines.push(format!("{} descendants", source.member_count() - 1));
    }
    lines
}

pub fn hover_tooltip(mut contexts: EguiContexts, tree: Res<TreeState>, hovered: Res<Hovered>) {
    let Some(node) = hovered.0 else {
        return;
    };
    let ctx = contexts.ctx_mut();
    let Some(pointer) = ctx.input(|i| i.pointer.hover_pos()) else {
        return;
    };
    render_tooltip(
        ctx,
        "member_tooltip",
        pointer + egui::vec2(14.0, 14.0),
        member_lines(&tree, node),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use lineage_core::{Role, SourceNode};
    use std::sync::Arc;

    #[test]
    fn tooltip_lists_member_details() {
        let mut tree = TreeState::default();
        tree.set_source(
            "test",
            Arc::new(
                SourceNode::new("Ada", Role::Root).with_child(
                    SourceNode::new("Ben", Role::MaternalRoot)
                        .with_spouse("Cleo")
                        .with_child(SourceNode::new("Dan", Role::Generic)),
                ),
            ),
        );

        let lines = member_lines(&tree, 1);
        assert_eq!(
            lines,
            vec![
                "Ben".to_string(),
                "spouse: Cleo".to_string(),
                "role: maternal root".to_string(),
                "generation 1".to_string(),
                "1 descendants".to_string(),
            ]
        );
        assert_eq!(member_lines(&tree, 2), vec!["Dan".to_string(), "generation 2".to_string()]);
        assert!(member_lines(&tree, 99).is_empty());
    }
}
