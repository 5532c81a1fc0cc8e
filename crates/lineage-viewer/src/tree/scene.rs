use bevy::prelude::{Color, Vec3};
use lineage_core::{Lineage, Role};
use serde::{Deserialize, Serialize};

use crate::tree::layout::LayoutTree;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeometryClass {
    Octahedron,
    Dodecahedron,
    Tetrahedron,
    TorusKnot,
    Torus,
    Icosahedron,
    Capsule,
    Cube,
}

impl GeometryClass {
    /// Shape for a member plus whether it counts as a "special" (spinning) node.
    pub fn select(role: Role, is_leaf: bool) -> (Self, bool) {
        match role {
            Role::Root => (Self::Octahedron, true),
            Role::Patriarch | Role::Matriarch => (Self::Dodecahedron, true),
            Role::MaternalRoot | Role::PaternalRoot | Role::RootAncestor => (Self::Tetrahedron, true),
            Role::MaternalGroup => (Self::TorusKnot, true),
            Role::Cluster => (Self::Torus, true),
            Role::UnionLink => (Self::Icosahedron, true),
            Role::Generic if is_leaf => (Self::Capsule, false),
            Role::Generic => (Self::Cube, true),
        }
    }

    pub const ALL: [GeometryClass; 8] = [
        Self::Octahedron,
        Self::Dodecahedron,
        Self::Tetrahedron,
        Self::TorusKnot,
        Self::Torus,
        Self::Icosahedron,
        Self::Capsule,
        Self::Cube,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tint {
    Accent,
    Highlight,
    Maternal,
    Paternal,
    Neutral,
}

impl Tint {
    pub fn rgb(self) -> [u8; 3] {
        match self {
            Self::Accent => [0xe8, 0x79, 0xf9],
            Self::Highlight => [0xfb, 0xbf, 0x24],
            Self::Maternal => [0xf4, 0x3f, 0x5e],
            Self::Paternal => [0x10, 0xb9, 0x81],
            Self::Neutral => [0x63, 0x66, 0xf1],
        }
    }

    pub fn color(self) -> Color {
        let [r, g, b] = self.rgb();
        Color::srgb_u8(r, g, b)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub edge_lift: f32,
    pub curve_samples: usize,
    pub edge_opacity: f32,
    pub union_emissive: f32,
    pub base_emissive: f32,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            edge_lift: 150.0,
            curve_samples: 30,
            edge_opacity: 0.15,
            union_emissive: 1.8,
            base_emissive: 0.45,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NodeVisual {
    pub layout: usize,
    pub geometry: GeometryClass,
    pub tint: Tint,
    pub emissive_intensity: f32,
    pub position: Vec3,
    pub depth: u32,
    pub is_union: bool,
    pub is_special: bool,
    pub label: usize,
    pub visible: bool,
}

#[derive(Debug, Clone)]
pub struct EdgeVisual {
    pub parent: usize,
    pub child: usize,
    pub points: Vec<Vec3>,
    pub tint: Tint,
    pub child_depth: u32,
    pub visible: bool,
}

#[derive(Debug, Clone)]
pub struct NodeLabel {
    pub node: usize,
    pub name: String,
    pub spouse: Option<String>,
    pub role_text: Option<String>,
    pub highlighted: bool,
}

/// Everything the renderer spawns for one tree. Node visuals share indices
/// with the layout arena they were built from.
#[derive(Debug, Clone, Default)]
pub struct SceneSet {
    pub nodes: Vec<NodeVisual>,
    pub edges: Vec<EdgeVisual>,
    pub labels: Vec<NodeLabel>,
    pub union_nodes: Vec<usize>,
    pub geometric_nodes: Vec<usize>,
}

impl SceneSet {
    pub fn visible_nodes(&self) -> usize {
        self.nodes.iter().filter(|n| n.visible).count()
    }
}

pub fn build(tree: &LayoutTree, cfg: &SceneConfig) -> SceneSet {
    let mut set = SceneSet::default();

    for (idx, node) in tree.nodes.iter().enumerate() {
        let source = &node.source;
        let (geometry, is_special) = GeometryClass::select(source.role, source.is_leaf());
        let is_union = source.role == Role::UnionLink;

        let label = set.labels.len();
        set.labels.push(NodeLabel {
            node: idx,
            name: source.name.clone(),
            spouse: source.spouse.clone(),
            role_text: source.role.display_name(),
            highlighted: false,
        });

        set.nodes.push(NodeVisual {
            layout: idx,
            geometry,
            tint: resolve_tint(tree, idx),
            emissive_intensity: if is_union {
                cfg.union_emissive
            } else {
                cfg.base_emissive
            },
            position: node.position,
            depth: node.depth,
            is_union,
            is_special,
            label,
            visible: true,
        });

        if is_union {
            set.union_nodes.push(idx);
        }
        if is_special {
            set.geometric_nodes.push(idx);
        }
    }

    for (parent, child) in tree.edges() {
        let start = tree.nodes[parent].position;
        let end = tree.nodes[child].position;
        let mut mid = start.lerp(end, 0.5);
        mid.y += cfg.edge_lift;

        set.edges.push(EdgeVisual {
            parent,
            child,
            points: catmull_rom(&[start, mid, end], cfg.curve_samples),
            tint: set.nodes[parent].tint,
            child_depth: tree.nodes[child].depth,
            visible: true,
        });
    }

    set
}

/// Union links and the root have fixed colors; everyone else takes the
/// colour of the nearest maternal/paternal role on the way up. The walk stops
/// before the parentless root.
pub fn resolve_tint(tree: &LayoutTree, idx: usize) -> Tint {
    let Some(node) = tree.nodes.get(idx) else {
        return Tint::Neutral;
    };
    match node.source.role {
        Role::UnionLink => return Tint::Accent,
        Role::Root => return Tint::Highlight,
        _ => {}
    }

    for i in tree.path_to_root(idx) {
        let current = &tree.nodes[i];
        if current.parent.is_none() {
            break;
        }
        match current.source.role.lineage() {
            Some(Lineage::Maternal) => return Tint::Maternal,
            Some(Lineage::Paternal) => return Tint::Paternal,
            None => {}
        }
    }
    Tint::Neutral
}

/// Uniform Catmull-Rom spline through `controls`, sampled at `segments + 1`
/// evenly spaced parameter values. Missing end neighbours are mirrored.
pub fn catmull_rom(controls: &[Vec3], segments: usize) -> Vec<Vec3> {
    if controls.len() < 2 || segments == 0 {
        return controls.to_vec();
    }
    let last = controls.len() - 1;

    (0..=segments)
        .map(|i| {
            let p = last as f32 * i as f32 / segments as f32;
            let mut seg = p.floor() as usize;
            let mut t = p - seg as f32;
            if seg >= last {
                seg = last - 1;
                t = 1.0;
            }
            let p1 = controls[seg];
            let p2 = controls[seg + 1];
            let p0 = if seg > 0 { controls[seg - 1] } else { 2.0 * p1 - p2 };
            let p3 = if seg + 2 <= last {
                controls[seg + 2]
            } else {
                2.0 * p2 - p1
            };
            catmull_rom_point(p0, p1, p2, p3, t)
        })
        .collect()
}

fn catmull_rom_point(p0: Vec3, p1: Vec3, p2: Vec3, p3: Vec3, t: f32) -> Vec3 {
    let t2 = t * t;
    let t3 = t2 * t;
    0.5 * (2.0 * p1
        + (p2 - p0) * t
        + (2.0 * p0 - 5.0 * p1 + 4.0 * p2 - p3) * t2
        + (3.0 * p1 - p0 - 3.0 * p2 + p3) * t3)
}
