use bevy::app::AppExit;
use bevy::log::info;
use bevy::pbr::NotShadowCaster;
use bevy::prelude::*;
use std::collections::HashMap;
use std::sync::atomic::Ordering;

use crate::camera::CameraController;
use crate::render::ambient::{DustMotes, Spin, Starfield, UnionPulse};
use crate::render::shapes;
use crate::tree::scene::NodeVisual;
use crate::tree::{GeometryClass, Tint, TreeState};

/// Parent of every node and edge; keyboard spin and reset rotate this.
#[derive(Component)]
pub struct TreeGroup;

#[derive(Component, Debug, Clone, Copy)]
pub struct NodeMarker {
    pub index: usize,
}

#[derive(Component, Debug, Clone, Copy)]
pub struct EdgeMarker {
    pub index: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct NodeMaterialKey {
    tint: Tint,
    union: bool,
    special: bool,
}

/// Every asset handle the viewer created, so teardown can release them
/// without waiting for handle drops.
#[derive(Resource, Default)]
pub struct SceneAssets {
    node_meshes: HashMap<GeometryClass, Handle<Mesh>>,
    node_materials: HashMap<NodeMaterialKey, Handle<StandardMaterial>>,
    edge_materials: HashMap<Tint, Handle<StandardMaterial>>,
    edge_meshes: Vec<Handle<Mesh>>,
    pub(crate) atmosphere_meshes: Vec<Handle<Mesh>>,
    pub(crate) atmosphere_materials: Vec<Handle<StandardMaterial>>,
    pub group: Option<Entity>,
    pub spawned_epoch: u64,
}

impl SceneAssets {
    fn node_mesh(&mut self, meshes: &mut Assets<Mesh>, class: GeometryClass) -> Handle<Mesh> {
        self.node_meshes
            .entry(class)
            .or_insert_with(|| meshes.add(shapes::node_mesh(class)))
            .clone()
    }

    fn node_material(
        &mut self,
        mats: &mut Assets<StandardMaterial>,
        node: &NodeVisual,
    ) -> Handle<StandardMaterial> {
        let key = NodeMaterialKey {
            tint: node.tint,
            union: node.is_union,
            special: node.is_special,
        };
        let intensity = node.emissive_intensity;
        self.node_materials
            .entry(key)
            .or_insert_with(|| {
                let color = key.tint.color();
                mats.add(StandardMaterial {
                    base_color: color,
                    emissive: color.to_linear() * intensity,
                    perceptual_roughness: if key.special { 0.15 } else { 0.35 },
                    reflectance: 0.8,
                    ..default()
                })
            })
            .clone()
    }

    fn edge_material(
        &mut self,
        mats: &mut Assets<StandardMaterial>,
        tint: Tint,
        opacity: f32,
    ) -> Handle<StandardMaterial> {
        self.edge_materials
            .entry(tint)
            .or_insert_with(|| {
                mats.add(StandardMaterial {
                    base_color: tint.color().with_alpha(opacity),
                    alpha_mode: AlphaMode::Blend,
                    unlit: true,
                    ..default()
                })
            })
            .clone()
    }

    fn release_edges(&mut self, meshes: &mut Assets<Mesh>) {
        for h in self.edge_meshes.drain(..) {
            meshes.remove(&h);
        }
    }

    fn release_all(&mut self, meshes: &mut Assets<Mesh>, mats: &mut Assets<StandardMaterial>) {
        self.release_edges(meshes);
        for (_, h) in self.node_meshes.drain() {
            meshes.remove(&h);
        }
        for h in self.atmosphere_meshes.drain(..) {
            meshes.remove(&h);
        }
        for (_, h) in self.node_materials.drain() {
            mats.remove(&h);
        }
        for (_, h) in self.edge_materials.drain() {
            mats.remove(&h);
        }
        for h in self.atmosphere_materials.drain(..) {
            mats.remove(&h);
        }
    }
}

fn visibility(visible: bool) -> Visibility {
    if visible {
        Visibility::Inherited
    } else {
        Visibility::Hidden
    }
}

pub fn scene_outdated(tree: Res<TreeState>, assets: Res<SceneAssets>) -> bool {
    tree.scene_epoch != assets.spawned_epoch
}

/// Replaces the spawned tree with the current scene set, then starts a reset
/// so the camera frames the new tree.
pub fn spawn_scene(
    mut commands: Commands,
    tree: Res<TreeState>,
    mut assets: ResMut<SceneAssets>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut mats: ResMut<Assets<StandardMaterial>>,
    mut cam: ResMut<CameraController>,
) {
    if let Some(old) = assets.group.take() {
        commands.entity(old).despawn_recursive();
        assets.release_edges(&mut meshes);
    }

    let scene = &tree.scene;
    let opacity = tree.scene_cfg.edge_opacity;

    let group = commands
        .spawn((
            SpatialBundle::from_transform(cam.group_transform()),
            TreeGroup,
            Name::new("tree"),
        ))
        .id();

    let mut children = Vec::with_capacity(scene.nodes.len() + scene.edges.len());
    for (index, node) in scene.nodes.iter().enumerate() {
        let mut e = commands.spawn((
            PbrBundle {
                mesh: assets.node_mesh(&mut meshes, node.geometry),
                material: assets.node_material(&mut mats, node),
                transform: Transform::from_translation(node.position),
                visibility: visibility(node.visible),
                ..default()
            },
            NodeMarker { index },
        ));
        if node.is_special {
            e.insert(Spin::default());
        }
        if node.is_union {
            e.insert(UnionPulse);
        }
        children.push(e.id());
    }

    for (index, edge) in scene.edges.iter().enumerate() {
        let mesh = meshes.add(shapes::line_strip(&edge.points));
        assets.edge_meshes.push(mesh.clone());
        let e = commands.spawn((
            PbrBundle {
                mesh,
                material: assets.edge_material(&mut mats, edge.tint, opacity),
                visibility: visibility(edge.visible),
                ..default()
            },
            EdgeMarker { index },
            NotShadowCaster,
        ));
        children.push(e.id());
    }

    commands.entity(group).push_children(&children);
    assets.group = Some(group);
    assets.spawned_epoch = tree.scene_epoch;
    tree.needs_sync.store(false, Ordering::Relaxed);

    info!(
        nodes = scene.nodes.len(),
        edges = scene.edges.len(),
        epoch = tree.scene_epoch,
        "scene spawned"
    );
    cam.reset_view();
}

/// Mirrors filter flags onto `Visibility` after a cutoff or search change.
pub fn sync_visibility(
    tree: Res<TreeState>,
    mut nodes: Query<(&NodeMarker, &mut Visibility), Without<EdgeMarker>>,
    mut edges: Query<(&EdgeMarker, &mut Visibility), Without<NodeMarker>>,
) {
    if !tree.needs_sync.swap(false, Ordering::Relaxed) {
        return;
    }
    for (m, mut vis) in nodes.iter_mut() {
        if let Some(n) = tree.scene.nodes.get(m.index) {
            *vis = visibility(n.visible);
        }
    }
    for (m, mut vis) in edges.iter_mut() {
        if let Some(e) = tree.scene.edges.get(m.index) {
            *vis = visibility(e.visible);
        }
    }
}

pub fn teardown_on_exit(
    mut exit: EventReader<AppExit>,
    mut commands: Commands,
    mut assets: ResMut<SceneAssets>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut mats: ResMut<Assets<StandardMaterial>>,
    atmosphere: Query<Entity, Or<(With<Starfield>, With<DustMotes>)>>,
) {
    if exit.read().next().is_none() {
        return;
    }
    if let Some(group) = assets.group.take() {
        commands.entity(group).despawn_recursive();
    }
    for e in atmosphere.iter() {
        commands.entity(e).despawn_recursive();
    }
    assets.release_all(&mut meshes, &mut mats);
    info!("scene released");
}
