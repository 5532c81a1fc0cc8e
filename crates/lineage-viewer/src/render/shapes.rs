use bevy::math::primitives::{Capsule3d, Cuboid, Torus};
use bevy::prelude::{Mesh, MeshBuilder, Meshable, Vec3};
use bevy::render::mesh::{Indices, PrimitiveTopology};
use bevy::render::render_asset::RenderAssetUsages;
use std::f32::consts::TAU;

use crate::tree::GeometryClass;

const PHI: f32 = 1.618_034;
const INV_PHI: f32 = 1.0 / PHI;

const OCTAHEDRON_VERTS: [[f32; 3]; 6] = [
    [1.0, 0.0, 0.0],
    [-1.0, 0.0, 0.0],
    [0.0, 1.0, 0.0],
    [0.0, -1.0, 0.0],
    [0.0, 0.0, 1.0],
    [0.0, 0.0, -1.0],
];
const OCTAHEDRON_FACES: [u32; 24] = [
    0, 2, 4, 0, 4, 3, 0, 3, 5, 0, 5, 2, 1, 2, 5, 1, 5, 3, 1, 3, 4, 1, 4, 2,
];

const TETRAHEDRON_VERTS: [[f32; 3]; 4] = [
    [1.0, 1.0, 1.0],
    [-1.0, -1.0, 1.0],
    [-1.0, 1.0, -1.0],
    [1.0, -1.0, -1.0],
];
const TETRAHEDRON_FACES: [u32; 12] = [2, 1, 0, 0, 3, 2, 1, 3, 0, 2, 3, 1];

const ICOSAHEDRON_VERTS: [[f32; 3]; 12] = [
    [-1.0, PHI, 0.0],
    [1.0, PHI, 0.0],
    [-1.0, -PHI, 0.0],
    [1.0, -PHI, 0.0],
    [0.0, -1.0, PHI],
    [0.0, 1.0, PHI],
    [0.0, -1.0, -PHI],
    [0.0, 1.0, -PHI],
    [PHI, 0.0, -1.0],
    [PHI, 0.0, 1.0],
    [-PHI, 0.0, -1.0],
    [-PHI, 0.0, 1.0],
];
const ICOSAHEDRON_FACES: [u32; 60] = [
    0, 11, 5, 0, 5, 1, 0, 1, 7, 0, 7, 10, 0, 10, 11, 1, 5, 9, 5, 11, 4, 11, 10, 2, 10, 7, 6, 7, 1,
    8, 3, 9, 4, 3, 4, 2, 3, 2, 6, 3, 6, 8, 3, 8, 9, 4, 9, 5, 2, 4, 11, 6, 2, 10, 8, 6, 7, 9, 8, 1,
];

const DODECAHEDRON_VERTS: [[f32; 3]; 20] = [
    [-1.0, -1.0, -1.0],
    [-1.0, -1.0, 1.0],
    [-1.0, 1.0, -1.0],
    [-1.0, 1.0, 1.0],
    [1.0, -1.0, -1.0],
    [1.0, -1.0, 1.0],
    [1.0, 1.0, -1.0],
    [1.0, 1.0, 1.0],
    [0.0, -INV_PHI, -PHI],
    [0.0, -INV_PHI, PHI],
    [0.0, INV_PHI, -PHI],
    [0.0, INV_PHI, PHI],
    [-INV_PHI, -PHI, 0.0],
    [-INV_PHI, PHI, 0.0],
    [INV_PHI, -PHI, 0.0],
    [INV_PHI, PHI, 0.0],
    [-PHI, 0.0, -INV_PHI],
    [PHI, 0.0, -INV_PHI],
    [-PHI, 0.0, INV_PHI],
    [PHI, 0.0, INV_PHI],
];
const DODECAHEDRON_FACES: [u32; 108] = [
    3, 11, 7, 3, 7, 15, 3, 15, 13, 7, 19, 17, 7, 17, 6, 7, 6, 15, 17, 4, 8, 17, 8, 10, 17, 10, 6,
    8, 0, 16, 8, 16, 2, 8, 2, 10, 0, 12, 1, 0, 1, 18, 0, 18, 16, 6, 10, 2, 6, 2, 13, 6, 13, 15, 2,
    16, 18, 2, 18, 3, 2, 3, 13, 18, 1, 9, 18, 9, 11, 18, 11, 3, 4, 14, 12, 4, 12, 0, 4, 0, 8, 11,
    9, 5, 11, 5, 19, 11, 19, 7, 19, 5, 14, 19, 14, 4, 19, 4, 17, 1, 12, 14, 1, 14, 5, 1, 5, 9,
];

/// Mesh for one geometry class, sized in world units.
pub fn node_mesh(class: GeometryClass) -> Mesh {
    match class {
        GeometryClass::Octahedron => polyhedron(&OCTAHEDRON_VERTS, &OCTAHEDRON_FACES, 48.0),
        GeometryClass::Dodecahedron => polyhedron(&DODECAHEDRON_VERTS, &DODECAHEDRON_FACES, 38.0),
        GeometryClass::Tetrahedron => polyhedron(&TETRAHEDRON_VERTS, &TETRAHEDRON_FACES, 42.0),
        GeometryClass::Icosahedron => polyhedron(&ICOSAHEDRON_VERTS, &ICOSAHEDRON_FACES, 32.0),
        GeometryClass::TorusKnot => torus_knot(22.0, 6.0, 128, 16, 2, 3),
        GeometryClass::Torus => Torus {
            minor_radius: 7.0,
            major_radius: 20.0,
        }
        .mesh()
        .minor_resolution(16)
        .major_resolution(100)
        .build(),
        GeometryClass::Capsule => Capsule3d::new(10.0, 15.0).mesh().rings(4).longitudes(12).build(),
        GeometryClass::Cube => Cuboid::from_length(28.0).mesh().build(),
    }
}

/// Flat-shaded convex solid; vertices are projected onto a sphere of `radius`.
fn polyhedron(verts: &[[f32; 3]], faces: &[u32], radius: f32) -> Mesh {
    let positions: Vec<[f32; 3]> = faces
        .iter()
        .map(|&i| (Vec3::from_array(verts[i as usize]).normalize() * radius).to_array())
        .collect();
    Mesh::new(PrimitiveTopology::TriangleList, RenderAssetUsages::default())
        .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, positions)
        .with_computed_flat_normals()
}

fn knot_point(u: f32, p: u32, q: u32, radius: f32) -> Vec3 {
    let qu_over_p = q as f32 / p as f32 * u;
    let cs = qu_over_p.cos();
    Vec3::new(
        radius * (2.0 + cs) * 0.5 * u.cos(),
        radius * (2.0 + cs) * 0.5 * u.sin(),
        radius * qu_over_p.sin() * 0.5,
    )
}

/// (p, q) torus knot swept with a circular tube.
pub fn torus_knot(radius: f32, tube: f32, tubular: u32, radial: u32, p: u32, q: u32) -> Mesh {
    let ring = radial + 1;
    let mut positions = Vec::with_capacity(((tubular + 1) * ring) as usize);
    let mut normals = Vec::with_capacity(positions.capacity());
    let mut uvs = Vec::with_capacity(positions.capacity());

    for i in 0..=tubular {
        let u = i as f32 / tubular as f32 * p as f32 * TAU;
        let p1 = knot_point(u, p, q, radius);
        let p2 = knot_point(u + 0.01, p, q, radius);

        let t = p2 - p1;
        let n = p2 + p1;
        let b = t.cross(n).normalize_or_zero();
        let n = b.cross(t).normalize_or_zero();

        for j in 0..=radial {
            let v = j as f32 / radial as f32 * TAU;
            let cx = -tube * v.cos();
            let cy = tube * v.sin();
            let vertex = p1 + n * cx + b * cy;
            positions.push(vertex.to_array());
            normals.push((vertex - p1).normalize_or_zero().to_array());
            uvs.push([i as f32 / tubular as f32, j as f32 / radial as f32]);
        }
    }

    let mut indices = Vec::with_capacity((tubular * radial * 6) as usize);
    for j in 1..=tubular {
        for i in 1..=radial {
            let a = ring * (j - 1) + (i - 1);
            let b = ring * j + (i - 1);
            let c = ring * j + i;
            let d = ring * (j - 1) + i;
            indices.extend_from_slice(&[a, b, d, b, c, d]);
        }
    }

    Mesh::new(PrimitiveTopology::TriangleList, RenderAssetUsages::default())
        .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, positions)
        .with_inserted_attribute(Mesh::ATTRIBUTE_NORMAL, normals)
        .with_inserted_attribute(Mesh::ATTRIBUTE_UV_0, uvs)
        .with_inserted_indices(Indices::U32(indices))
}

pub fn line_strip(points: &[Vec3]) -> Mesh {
    let positions: Vec<[f32; 3]> = points.iter().map(|p| p.to_array()).collect();
    Mesh::new(PrimitiveTopology::LineStrip, RenderAssetUsages::default())
        .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, positions)
}

pub fn point_cloud(points: Vec<[f32; 3]>) -> Mesh {
    Mesh::new(PrimitiveTopology::PointList, RenderAssetUsages::default())
        .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, points)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn positions(mesh: &Mesh) -> Vec<Vec3> {
        mesh.attribute(Mesh::ATTRIBUTE_POSITION)
            .and_then(|a| a.as_float3())
            .expect("positions")
            .iter()
            .map(|p| Vec3::from_array(*p))
            .collect()
    }

    #[test]
    fn solids_sit_on_their_radius_with_outward_faces() {
        for (class, radius, faces) in [
            (GeometryClass::Octahedron, 48.0, 8),
            (GeometryClass::Dodecahedron, 38.0, 36),
            (GeometryClass::Tetrahedron, 42.0, 4),
            (GeometryClass::Icosahedron, 32.0, 20),
        ] {
            let pos = positions(&node_mesh(class));
            assert_eq!(pos.len(), faces * 3, "{class:?}");
            for tri in pos.chunks(3) {
                for v in tri {
                    assert!((v.length() - radius).abs() < 1e-3, "{class:?}");
                }
                let normal = (tri[1] - tri[0]).cross(tri[2] - tri[0]);
                let centroid = (tri[0] + tri[1] + tri[2]) / 3.0;
                assert!(normal.dot(centroid) > 0.0, "{class:?} winds inward");
            }
        }
    }

    #[test]
    fn torus_knot_grid_is_complete() {
        let mesh = torus_knot(22.0, 6.0, 128, 16, 2, 3);
        assert_eq!(mesh.count_vertices(), 129 * 17);
        let Some(Indices::U32(idx)) = mesh.indices() else {
            panic!("expected u32 indices");
        };
        assert_eq!(idx.len(), 128 * 16 * 6);
        assert!(idx.iter().all(|i| (*i as usize) < mesh.count_vertices()));
    }

    #[test]
    fn every_class_has_a_mesh() {
        for class in GeometryClass::ALL {
            assert!(node_mesh(class).count_vertices() > 0, "{class:?}");
        }
    }

    #[test]
    fn line_strip_keeps_every_sample() {
        let pts = vec![Vec3::ZERO, Vec3::X, Vec3::Y];
        let mesh = line_strip(&pts);
        assert_eq!(mesh.primitive_topology(), PrimitiveTopology::LineStrip);
        assert_eq!(positions(&mesh), pts);
    }
}
