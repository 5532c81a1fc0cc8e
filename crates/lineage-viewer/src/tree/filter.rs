use crate::tree::scene::{NodeLabel, SceneSet};

impl SceneSet {
    /// Nodes deeper than `max_gen` are hidden; edges are keyed by their child.
    pub fn apply_generation_cutoff(&mut self, max_gen: u32) {
        for node in self.nodes.iter_mut() {
            node.visible = node.depth <= max_gen;
        }
        for edge in self.edges.iter_mut() {
            edge.visible = edge.child_depth <= max_gen;
        }
    }

    pub fn apply_search_highlight(&mut self, term: &str) {
        let needle = term.to_lowercase();
        for label in self.labels.iter_mut() {
            label.highlighted = label_matches(label, &needle);
        }
    }

    pub fn highlighted_count(&self) -> usize {
        self.labels.iter().filter(|l| l.highlighted).count()
    }
}

/// `needle` must already be lowercase; an empty needle never matches.
fn label_matches(label: &NodeLabel, needle: &str) -> bool {
    if needle.is_empty() {
        return false;
    }
    label.name.to_lowercase().contains(needle)
        || label
            .spouse
            .as_deref()
            .is_some_and(|s| s.to_lowercase().contains(needle))
}

#[cfg(test)]
mod tests {
    use crate::tree::layout::{layout, LayoutConfig};
    use crate::tree::scene::{build, SceneConfig, SceneSet};
    use lineage_core::{Role, SourceNode};
    use std::sync::Arc;

    fn scenario() -> SceneSet {
        let root = Arc::new(
            SourceNode::new("A", Role::Root)
                .with_child(SourceNode::new("B", Role::Generic).with_child(SourceNode::new("D", Role::Generic)))
                .with_child(SourceNode::new("C", Role::Generic)),
        );
        build(&layout(&root, &LayoutConfig::default()), &SceneConfig::default())
    }

    fn node_visible(set: &SceneSet, name: &str) -> bool {
        let label = set.labels.iter().find(|l| l.name == name).expect("label");
        set.nodes[label.node].visible
    }

    fn edge_visible(set: &SceneSet, from: &str, to: &str) -> bool {
        let idx = |name: &str| set.labels.iter().find(|l| l.name == name).expect("label").node;
        let (p, c) = (idx(from), idx(to));
        set.edges
            .iter()
            .find(|e| e.parent == p && e.child == c)
            .expect("edge")
            .visible
    }

    #[test]
    fn cutoff_zero_hides_everything_below_root() {
        let mut set = scenario();
        set.apply_generation_cutoff(0);
        assert!(node_visible(&set, "A"));
        for name in ["B", "C", "D"] {
            assert!(!node_visible(&set, name));
        }
        assert!(set.edges.iter().all(|e| !e.visible));
    }

    #[test]
    fn cutoff_one_shows_first_generation_only() {
        let mut set = scenario();
        set.apply_generation_cutoff(1);
        assert!(node_visible(&set, "B"));
        assert!(node_visible(&set, "C"));
        assert!(!node_visible(&set, "D"));
        assert!(edge_visible(&set, "A", "B"));
        assert!(edge_visible(&set, "A", "C"));
        assert!(!edge_visible(&set, "B", "D"));
    }

    #[test]
    fn cutoff_is_idempotent_and_reversible() {
        let mut set = scenario();
        set.apply_generation_cutoff(0);
        set.apply_generation_cutoff(0);
        assert_eq!(set.visible_nodes(), 1);
        set.apply_generation_cutoff(8);
        assert_eq!(set.visible_nodes(), 4);
        assert!(set.edges.iter().all(|e| e.visible));
    }

    #[test]
    fn search_matches_name_or_spouse_case_insensitively() {
        let root = Arc::new(
            SourceNode::new("Root", Role::Root)
                .with_child(SourceNode::new("Elizabeth", Role::Generic))
                .with_child(SourceNode::new("Martha", Role::Generic).with_spouse("Elias"))
                .with_child(SourceNode::new("Thomas", Role::Generic).with_spouse("Anne")),
        );
        let mut set = build(&layout(&root, &LayoutConfig::default()), &SceneConfig::default());

        set.apply_search_highlight("eli");
        let lit: Vec<_> = set
            .labels
            .iter()
            .filter(|l| l.highlighted)
            .map(|l| l.name.as_str())
            .collect();
        assert_eq!(lit, vec!["Elizabeth", "Martha"]);

        set.apply_search_highlight("THOM");
        assert_eq!(set.highlighted_count(), 1);

        set.apply_search_highlight("");
        assert_eq!(set.highlighted_count(), 0);

        set.apply_search_highlight("zzz");
        assert_eq!(set.highlighted_count(), 0);
    }
}
