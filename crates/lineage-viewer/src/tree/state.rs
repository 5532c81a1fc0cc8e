use bevy::prelude::Resource;
use lineage_core::SourceNode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::tree::layout::{layout, LayoutConfig, LayoutTree};
use crate::tree::scene::{build, SceneConfig, SceneSet};
use crate::util::config::ViewerConfig;

#[derive(Resource)]
pub struct TreeState {
    pub source: Option<Arc<SourceNode>>,
    pub origin: String,
    pub layout: LayoutTree,
    pub scene: SceneSet,
    pub layout_cfg: LayoutConfig,
    pub scene_cfg: SceneConfig,

    pub search: String,
    pub max_generation: u32,

    /// Bumped on every structural rebuild; the renderer respawns when it
    /// sees a new value.
    pub scene_epoch: u64,
    pub selected: Option<usize>,
    /// Most recent dataset failure as (origin, message).
    pub last_error: Option<(String, String)>,

    pub needs_sync: AtomicBool,
}

impl Default for TreeState {
    fn default() -> Self {
        Self {
            source: None,
            origin: String::new(),
            layout: LayoutTree::default(),
            scene: SceneSet::default(),
            layout_cfg: LayoutConfig::default(),
            scene_cfg: SceneConfig::default(),
            search: String::new(),
            max_generation: 8,
            scene_epoch: 0,
            selected: None,
            last_error: None,
            needs_sync: AtomicBool::new(false),
        }
    }
}

impl TreeState {
    pub fn apply_viewer_config(&mut self, cfg: &ViewerConfig) {
        self.layout_cfg = cfg.layout;
        self.scene_cfg = cfg.scene;
        self.max_generation = cfg.max_generation;
    }

    /// Installs a new tree. Returns `false` (and keeps the current scene) when
    /// `root` is the same tree, by identity or by value.
    pub fn set_source(&mut self, origin: impl Into<String>, root: Arc<SourceNode>) -> bool {
        self.origin = origin.into();
        if self
            .last_error
            .as_ref()
            .is_some_and(|(failed, _)| *failed == self.origin)
        {
            self.last_error = None;
        }
        if let Some(current) = &self.source {
            if Arc::ptr_eq(current, &root) || **current == *root {
                return false;
            }
        }

        self.layout = layout(&root, &self.layout_cfg);
        self.scene = build(&self.layout, &self.scene_cfg);
        self.source = Some(root);
        self.selected = None;
        self.scene_epoch += 1;
        self.reapply_filters();
        true
    }

    pub fn record_error(&mut self, origin: impl Into<String>, message: impl Into<String>) {
        self.last_error = Some((origin.into(), message.into()));
    }

    pub fn set_search(&mut self, term: impl Into<String>) {
        self.search = term.into();
        self.scene.apply_search_highlight(&self.search);
        self.needs_sync.store(true, Ordering::Relaxed);
    }

    pub fn set_max_generation(&mut self, max_gen: u32) {
        self.max_generation = max_gen;
        self.scene.apply_generation_cutoff(max_gen);
        self.needs_sync.store(true, Ordering::Relaxed);
    }

    fn reapply_filters(&mut self) {
        self.scene.apply_generation_cutoff(self.max_generation);
        self.scene.apply_search_highlight(&self.search);
        self.needs_sync.store(true, Ordering::Relaxed);
    }

    pub fn member_count(&self) -> usize {
        self.layout.len()
    }

    pub fn deepest_generation(&self) -> u32 {
        self.layout.max_depth()
    }

    pub fn selected_source(&self) -> Option<&Arc<SourceNode>> {
        self.selected
            .and_then(|i| self.layout.nodes.get(i))
            .map(|n| &n.source)
    }

    /// Layout index of a member, matched by identity.
    pub fn index_of(&self, member: &Arc<SourceNode>) -> Option<usize> {
        self.layout
            .nodes
            .iter()
            .position(|n| Arc::ptr_eq(&n.source, member))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lineage_core::Role;

    fn tree(name: &str) -> Arc<SourceNode> {
        Arc::new(
            SourceNode::new(name, Role::Root)
                .with_child(SourceNode::new("B", Role::Generic).with_child(SourceNode::new("D", Role::Generic)))
                .with_child(SourceNode::new("C", Role::Generic)),
        )
    }

    #[test]
    fn rebuilds_only_when_tree_changes() {
        let mut st = TreeState::default();
        let first = tree("A");
        assert!(st.set_source("test", first.clone()));
        assert_eq!(st.scene_epoch, 1);

        assert!(!st.set_source("test", first.clone()));
        assert!(!st.set_source("test", tree("A")));
        assert_eq!(st.scene_epoch, 1);
        assert!(Arc::ptr_eq(st.source.as_ref().expect("source"), &first));

        assert!(st.set_source("test", tree("Z")));
        assert_eq!(st.scene_epoch, 2);
    }

    #[test]
    fn error_clears_only_when_same_origin_recovers() {
        let mut st = TreeState::default();
        st.record_error("family.json", "expected value");
        st.set_source("bundled sample", tree("A"));
        assert!(st.last_error.is_some());

        st.set_source("family.json", tree("B"));
        assert!(st.last_error.is_none());
    }

    #[test]
    fn filter_changes_do_not_rebuild() {
        let mut st = TreeState::default();
        st.set_source("test", tree("A"));
        st.needs_sync.store(false, Ordering::Relaxed);

        st.set_max_generation(1);
        st.set_search("c");
        assert_eq!(st.scene_epoch, 1);
        assert!(st.needs_sync.load(Ordering::Relaxed));
        assert_eq!(st.scene.visible_nodes(), 3);
        assert_eq!(st.scene.highlighted_count(), 1);
    }

    #[test]
    fn new_tree_inherits_current_filters() {
        let mut st = TreeState::default();
        st.set_max_generation(0);
        st.set_search("d");
        st.set_source("test", tree("A"));
        assert_eq!(st.scene.visible_nodes(), 1);
        assert_eq!(st.scene.highlighted_count(), 1);
    }

    #[test]
    fn selection_resolves_by_identity() {
        let mut st = TreeState::default();
        let root = tree("A");
        st.set_source("test", root.clone());
        let c = root.children[1].clone();
        let idx = st.index_of(&c).expect("indexed");
        st.selected = Some(idx);
        assert_eq!(st.selected_source().map(|s| s.name.as_str()), Some("C"));
        assert_eq!(st.member_count(), 4);
        assert_eq!(st.deepest_generation(), 2);
    }
}
