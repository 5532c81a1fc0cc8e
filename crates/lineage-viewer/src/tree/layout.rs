use bevy::prelude::Vec3;
use lineage_core::SourceNode;
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub generation_gap: f32,
    pub base_radius: f32,
    pub top_height: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            generation_gap: 450.0,
            base_radius: 300.0,
            top_height: 1800.0,
        }
    }
}

impl LayoutConfig {
    pub fn radius_at(&self, depth: u32) -> f32 {
        depth as f32 * self.generation_gap + self.base_radius
    }

    pub fn height_at(&self, depth: u32) -> f32 {
        self.top_height - depth as f32 * self.generation_gap
    }
}

#[derive(Debug, Clone)]
pub struct LayoutNode {
    pub depth: u32,
    pub angle: f32,
    pub radius: f32,
    pub position: Vec3,
    pub source: Arc<SourceNode>,
    /// Index of the parent in the owning [`LayoutTree`]; lookup only.
    pub parent: Option<usize>,
    pub children: Vec<usize>,
}

/// Arena of laid-out nodes in pre-order; the root is always index 0.
#[derive(Debug, Clone, Default)]
pub struct LayoutTree {
    pub nodes: Vec<LayoutNode>,
}

impl LayoutTree {
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn root(&self) -> Option<&LayoutNode> {
        self.nodes.first()
    }

    /// `idx` followed by each of its ancestors up to the root.
    pub fn path_to_root(&self, idx: usize) -> impl Iterator<Item = usize> + '_ {
        std::iter::successors(Some(idx).filter(|i| *i < self.nodes.len()), |i| {
            self.nodes[*i].parent
        })
    }

    /// Parent/child index pairs in pre-order of the parent.
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .flat_map(|(i, n)| n.children.iter().map(move |c| (i, *c)))
    }

    pub fn max_depth(&self) -> u32 {
        self.nodes.iter().map(|n| n.depth).max().unwrap_or(0)
    }
}

/// Radial layout: every internal node splits its angular sector among its
/// children in proportion to their subtree sizes; a node sits at the middle
/// of its own sector.
pub fn layout(root: &Arc<SourceNode>, cfg: &LayoutConfig) -> LayoutTree {
    let mut nodes = Vec::new();
    let mut sizes = Vec::new();
    push_subtree(root, None, 0, &mut nodes, &mut sizes);
    place(&mut nodes, &sizes, 0, 0.0, TAU, cfg);
    LayoutTree { nodes }
}

/// Appends `node` and its descendants in pre-order and records each subtree
/// size at the same index in `sizes`. Returns the size of this subtree.
fn push_subtree(
    node: &Arc<SourceNode>,
    parent: Option<usize>,
    depth: u32,
    nodes: &mut Vec<LayoutNode>,
    sizes: &mut Vec<usize>,
) -> usize {
    let idx = nodes.len();
    nodes.push(LayoutNode {
        depth,
        angle: 0.0,
        radius: 0.0,
        position: Vec3::ZERO,
        source: node.clone(),
        parent,
        children: Vec::with_capacity(node.children.len()),
    });
    sizes.push(1);

    let mut size = 1;
    for child in &node.children {
        let child_idx = nodes.len();
        size += push_subtree(child, Some(idx), depth + 1, nodes, sizes);
        nodes[idx].children.push(child_idx);
    }
    sizes[idx] = size;
    size
}

fn place(
    nodes: &mut [LayoutNode],
    sizes: &[usize],
    idx: usize,
    start: f32,
    sector: f32,
    cfg: &LayoutConfig,
) {
    let angle = start + sector / 2.0;
    let node = &mut nodes[idx];
    let radius = cfg.radius_at(node.depth);
    node.angle = angle;
    node.radius = radius;
    node.position = Vec3::new(angle.cos() * radius, cfg.height_at(node.depth), angle.sin() * radius);

    let total: usize = nodes[idx].children.iter().map(|c| sizes[*c]).sum();
    let mut cursor = start;
    for k in 0..nodes[idx].children.len() {
        let child = nodes[idx].children[k];
        let child_sector = sector * (sizes[child] as f32 / total.max(1) as f32);
        place(nodes, sizes, child, cursor, child_sector, cfg);
        cursor += child_sector;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lineage_core::Role;

    fn sample() -> Arc<SourceNode> {
        Arc::new(
            SourceNode::new("A", Role::Root)
                .with_child(
                    SourceNode::new("B", Role::MaternalRoot)
                        .with_child(SourceNode::new("D", Role::Generic))
                        .with_child(
                            SourceNode::new("E", Role::UnionLink)
                                .with_child(SourceNode::new("G", Role::Generic)),
                        ),
                )
                .with_child(SourceNode::new("C", Role::PaternalRoot))
                .with_child(SourceNode::new("F", Role::Cluster)),
        )
    }

    #[test]
    fn depth_is_parent_depth_plus_one() {
        let tree = layout(&sample(), &LayoutConfig::default());
        assert_eq!(tree.root().map(|r| r.depth), Some(0));
        for node in tree.nodes.iter().skip(1) {
            let parent = &tree.nodes[node.parent.expect("non-root has parent")];
            assert_eq!(node.depth, parent.depth + 1);
        }
    }

    #[test]
    fn radius_never_decreases_with_depth() {
        let tree = layout(&sample(), &LayoutConfig::default());
        let mut by_depth: Vec<_> = tree.nodes.iter().map(|n| (n.depth, n.radius)).collect();
        by_depth.sort_by(|a, b| a.0.cmp(&b.0));
        for pair in by_depth.windows(2) {
            assert!(pair[1].1 >= pair[0].1);
        }
    }

    #[test]
    fn layout_is_deterministic() {
        let root = sample();
        let cfg = LayoutConfig::default();
        let a = layout(&root, &cfg);
        let b = layout(&root, &cfg);
        let pa: Vec<_> = a.nodes.iter().map(|n| n.position).collect();
        let pb: Vec<_> = b.nodes.iter().map(|n| n.position).collect();
        assert_eq!(pa, pb);
    }

    #[test]
    fn position_follows_generation_mapping() {
        let cfg = LayoutConfig::default();
        let tree = layout(&sample(), &cfg);
        for node in &tree.nodes {
            let radius = node.depth as f32 * 450.0 + 300.0;
            assert!((node.radius - radius).abs() < 1e-3);
            assert!((node.position.y - (1800.0 - node.depth as f32 * 450.0)).abs() < 1e-3);
            assert!((node.position.x - node.angle.cos() * radius).abs() < 1e-2);
            assert!((node.position.z - node.angle.sin() * radius).abs() < 1e-2);
        }
    }

    #[test]
    fn shared_subtrees_are_laid_out_once_per_occurrence() {
        let twin = Arc::new(SourceNode::new("T", Role::Generic).with_child(SourceNode::new("U", Role::Generic)));
        let mut root = SourceNode::new("R", Role::Root);
        root.children.push(twin.clone());
        root.children.push(twin);
        let tree = layout(&Arc::new(root), &LayoutConfig::default());

        assert_eq!(tree.len(), 5);
        assert_eq!(tree.nodes[0].children, vec![1, 3]);
        assert_eq!(tree.nodes[1].children, vec![2]);
        assert_eq!(tree.nodes[3].children, vec![4]);
        assert!((tree.nodes[1].angle - TAU / 4.0).abs() < 1e-5);
        assert!((tree.nodes[3].angle - 3.0 * TAU / 4.0).abs() < 1e-5);
        assert_eq!(tree.nodes[4].parent, Some(3));
    }

    #[test]
    fn siblings_split_sector_by_subtree_size() {
        let tree = layout(&sample(), &LayoutConfig::default());
        // Root children sizes are B=4, C=1, F=1 out of 6.
        let root = &tree.nodes[0];
        assert!((root.angle - std::f32::consts::PI).abs() < 1e-5);
        let kids: Vec<_> = root.children.iter().map(|i| &tree.nodes[*i]).collect();
        assert_eq!(kids[0].source.name, "B");
        assert!((kids[0].angle - TAU * 2.0 / 6.0).abs() < 1e-4);
        assert!((kids[1].angle - TAU * 4.5 / 6.0).abs() < 1e-4);
        assert!((kids[2].angle - TAU * 5.5 / 6.0).abs() < 1e-4);
    }

    #[test]
    fn path_to_root_walks_parents() {
        let tree = layout(&sample(), &LayoutConfig::default());
        let g = tree
            .nodes
            .iter()
            .position(|n| n.source.name == "G")
            .expect("G laid out");
        let names: Vec<_> = tree
            .path_to_root(g)
            .map(|i| tree.nodes[i].source.name.clone())
            .collect();
        assert_eq!(names, vec!["G", "E", "B", "A"]);
        assert_eq!(tree.edges().count(), tree.len() - 1);
        assert_eq!(tree.max_depth(), 3);
    }
}
