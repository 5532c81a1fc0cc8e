use bevy::log::info;
use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use bevy_egui::EguiContexts;

use crate::app::events::NodeSelected;
use crate::camera::CameraController;
use crate::render::camera::LineageCamera;
use crate::render::spawn::NodeMarker;
use crate::tree::TreeState;

const HOVER_RADIUS_PX: f32 = 18.0;
const PICK_RADIUS_PX: f32 = 14.0;
/// Cursor travel between press and release beyond which a click is a drag.
const CLICK_SLOP_PX: f32 = 4.0;

#[derive(Resource, Default, Debug, Clone, Copy)]
pub struct Hovered(pub Option<usize>);

pub fn nearest_within(
    cursor: Vec2,
    candidates: impl IntoIterator<Item = (usize, Vec2)>,
    max_dist: f32,
) -> Option<usize> {
    let mut best: Option<(f32, usize)> = None;
    for (idx, screen) in candidates {
        let d = screen.distance(cursor);
        if d < max_dist && best.map(|(bd, _)| d < bd).unwrap_or(true) {
            best = Some((d, idx));
        }
    }
    best.map(|(_, idx)| idx)
}

#[allow(clippy::too_many_arguments)]
pub fn hover_and_pick(
    buttons: Res<ButtonInput<MouseButton>>,
    windows: Query<&Window, With<PrimaryWindow>>,
    cam_q: Query<(&Camera, &GlobalTransform), With<LineageCamera>>,
    nodes: Query<(&NodeMarker, &GlobalTransform, &InheritedVisibility)>,
    mut contexts: EguiContexts,
    tree: Res<TreeState>,
    mut hovered: ResMut<Hovered>,
    mut press_at: Local<Option<Vec2>>,
    mut out: EventWriter<NodeSelected>,
) {
    let Ok(window) = windows.get_single() else {
        return;
    };
    let Some(cursor) = window.cursor_position() else {
        hovered.0 = None;
        return;
    };
    let Ok((camera, cam_tf)) = cam_q.get_single() else {
        return;
    };
    if contexts.ctx_mut().wants_pointer_input() {
        hovered.0 = None;
        return;
    }

    let on_screen: Vec<(usize, Vec2)> = nodes
        .iter()
        .filter(|(_, _, vis)| vis.get())
        .filter_map(|(m, gt, _)| {
            camera
                .world_to_viewport(cam_tf, gt.translation())
                .map(|p| (m.index, p))
        })
        .collect();

    hovered.0 = nearest_within(cursor, on_screen.iter().copied(), HOVER_RADIUS_PX);

    if buttons.just_pressed(MouseButton::Left) {
        *press_at = Some(cursor);
    }
    if !buttons.just_released(MouseButton::Left) {
        return;
    }
    let Some(start) = press_at.take() else {
        return;
    };
    if start.distance(cursor) > CLICK_SLOP_PX {
        return;
    }

    if let Some(idx) = nearest_within(cursor, on_screen, PICK_RADIUS_PX) {
        if let Some(node) = tree.layout.nodes.get(idx) {
            out.send(NodeSelected {
                node: idx,
                source: node.source.clone(),
            });
        }
    }
}

/// Focuses the camera on each selected member. The selection itself always
/// updates, even when the focus flight is refused mid-transition.
pub fn apply_selection(
    mut events: EventReader<NodeSelected>,
    mut tree: ResMut<TreeState>,
    mut cam: ResMut<CameraController>,
) {
    for ev in events.read() {
        let Some(node) = tree.layout.nodes.get(ev.node) else {
            continue;
        };
        let world = cam.group_quat() * node.position;
        let focused = cam.focus_on(world);
        tree.selected = Some(ev.node);
        info!(name = %ev.source.name, focused, "member selected");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lineage_core::{Role, SourceNode};
    use std::sync::Arc;

    #[test]
    fn nearest_within_prefers_closest_in_range() {
        let cursor = Vec2::new(100.0, 100.0);
        let pts = [
            (0, Vec2::new(110.0, 100.0)),
            (1, Vec2::new(103.0, 104.0)),
            (2, Vec2::new(300.0, 300.0)),
        ];
        assert_eq!(nearest_within(cursor, pts, 14.0), Some(1));
        assert_eq!(nearest_within(cursor, [(2, Vec2::new(300.0, 300.0))], 14.0), None);
        assert_eq!(nearest_within(cursor, [], 14.0), None);
    }

    #[test]
    fn selection_focuses_and_records_even_when_busy() {
        let root = Arc::new(
            SourceNode::new("A", Role::Root)
                .with_child(SourceNode::new("B", Role::Generic))
                .with_child(SourceNode::new("C", Role::Generic)),
        );
        let mut tree = TreeState::default();
        tree.set_source("test", root.clone());

        let mut app = App::new();
        app.add_event::<NodeSelected>()
            .insert_resource(tree)
            .init_resource::<CameraController>()
            .add_systems(Update, apply_selection);

        app.world_mut().send_event(NodeSelected {
            node: 1,
            source: root.children[0].clone(),
        });
        app.update();
        assert_eq!(app.world().resource::<TreeState>().selected, Some(1));
        assert!(app.world().resource::<CameraController>().is_transitioning());

        app.world_mut().send_event(NodeSelected {
            node: 2,
            source: root.children[1].clone(),
        });
        app.update();
        assert_eq!(app.world().resource::<TreeState>().selected, Some(2));
    }
}
