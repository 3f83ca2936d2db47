//! Geometry generation.
//!
//! Generators return a [`BufferGeometry`] that can be handed to
//! [`Mesh::new`](crate::scene::Mesh::new), cloned for overlays, or edited
//! before use.

pub use self::buffer_geometry::{compute_normals, unique_edges, BufferGeometry};

mod buffer_geometry;

use glamx::{Vec2, Vec3};

/// Generates an axis-aligned box centered at the origin.
///
/// # Arguments
/// * `extents` - the full dimensions of the box along each axis
pub fn cuboid(extents: Vec3) -> BufferGeometry {
    let mut cuboid = unit_cuboid();
    cuboid.scale_by(extents);
    cuboid
}

/// Generates a unit box (1x1x1) centered at the origin.
///
/// Each face has its own four vertices so normals and UVs are per-face.
pub fn unit_cuboid() -> BufferGeometry {
    // (normal, tangent, bitangent) per face; corners wind counter-clockwise
    // when looking at the face from outside.
    let faces_axes = [
        (Vec3::X, Vec3::NEG_Z, Vec3::Y),
        (Vec3::NEG_X, Vec3::Z, Vec3::Y),
        (Vec3::Y, Vec3::X, Vec3::NEG_Z),
        (Vec3::NEG_Y, Vec3::X, Vec3::Z),
        (Vec3::Z, Vec3::X, Vec3::Y),
        (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
    ];

    let mut coords = Vec::with_capacity(24);
    let mut normals = Vec::with_capacity(24);
    let mut uvs = Vec::with_capacity(24);
    let mut faces = Vec::with_capacity(12);

    for (normal, tangent, bitangent) in faces_axes {
        let base = coords.len() as u32;
        let center = normal * 0.5;

        for (u, v) in [(-0.5, -0.5), (0.5, -0.5), (0.5, 0.5), (-0.5, 0.5)] {
            coords.push(center + tangent * u + bitangent * v);
            normals.push(normal);
            uvs.push(Vec2::new(u + 0.5, 0.5 - v));
        }

        faces.push([base, base + 1, base + 2]);
        faces.push([base, base + 2, base + 3]);
    }

    BufferGeometry::new(coords, Some(normals), Some(uvs), faces)
}

/// Generates a UV sphere centered at the origin.
///
/// # Arguments
/// * `diameter` - the sphere diameter
/// * `ntheta_subdiv` - subdivisions around the equator
/// * `nphi_subdiv` - subdivisions from pole to pole
pub fn sphere(diameter: f32, ntheta_subdiv: u32, nphi_subdiv: u32) -> BufferGeometry {
    let ntheta = ntheta_subdiv.max(3);
    let nphi = nphi_subdiv.max(2);
    let radius = diameter / 2.0;

    let mut coords = Vec::new();
    let mut normals = Vec::new();
    let mut uvs = Vec::new();
    let mut faces = Vec::new();

    for i in 0..=nphi {
        let phi = std::f32::consts::PI * i as f32 / nphi as f32;
        for j in 0..=ntheta {
            let theta = 2.0 * std::f32::consts::PI * j as f32 / ntheta as f32;
            let dir = Vec3::new(
                phi.sin() * theta.cos(),
                phi.cos(),
                phi.sin() * theta.sin(),
            );
            coords.push(dir * radius);
            normals.push(dir);
            uvs.push(Vec2::new(
                j as f32 / ntheta as f32,
                i as f32 / nphi as f32,
            ));
        }
    }

    let ring = ntheta + 1;
    for i in 0..nphi {
        for j in 0..ntheta {
            let a = i * ring + j;
            let b = a + ring;
            if i != 0 {
                faces.push([a, a + 1, b]);
            }
            if i != nphi - 1 {
                faces.push([a + 1, b + 1, b]);
            }
        }
    }

    BufferGeometry::new(coords, Some(normals), Some(uvs), faces)
}

/// Generates a rectangle on the XY plane, facing +Z.
///
/// # Arguments
/// * `width` - extent along the x axis
/// * `height` - extent along the y axis
pub fn quad(width: f32, height: f32) -> BufferGeometry {
    let hw = width / 2.0;
    let hh = height / 2.0;

    let coords = vec![
        Vec3::new(-hw, -hh, 0.0),
        Vec3::new(hw, -hh, 0.0),
        Vec3::new(hw, hh, 0.0),
        Vec3::new(-hw, hh, 0.0),
    ];
    let normals = vec![Vec3::Z; 4];
    let uvs = vec![
        Vec2::new(0.0, 1.0),
        Vec2::new(1.0, 1.0),
        Vec2::new(1.0, 0.0),
        Vec2::new(0.0, 0.0),
    ];
    let faces = vec![[0, 1, 2], [0, 2, 3]];

    BufferGeometry::new(coords, Some(normals), Some(uvs), faces)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 0.0001;

    #[test]
    fn unit_cuboid_shape() {
        let cube = unit_cuboid();
        assert_eq!(cube.coords.len(), 24);
        assert_eq!(cube.faces.len(), 12);
        // Shared face diagonals collapse; boundary edges do not (per-face
        // vertices are not shared between faces): 6 faces x 5 edges.
        assert_eq!(cube.edges().len(), 30);

        // Every corner of every face is a corner of the unit box.
        for c in &cube.coords {
            for component in [c.x, c.y, c.z] {
                assert!((component.abs() - 0.5).abs() < EPSILON, "not a corner: {c:?}");
            }
        }

        // Normals are unit length and axis-aligned.
        for n in cube.normals.as_ref().unwrap() {
            assert!((n.length() - 1.0).abs() < EPSILON);
            assert!((n.x.abs() + n.y.abs() + n.z.abs() - 1.0).abs() < EPSILON);
        }
    }

    #[test]
    fn cuboid_faces_point_outward() {
        let cube = unit_cuboid();
        let normals = cube.normals.as_ref().unwrap();
        for face in &cube.faces {
            let [a, b, c] = face.map(|i| cube.coords[i as usize]);
            let winding_normal = (b - a).cross(c - a);
            let stored = normals[face[0] as usize];
            assert!(
                winding_normal.dot(stored) > 0.0,
                "face {face:?} winds against its normal"
            );
        }
    }

    #[test]
    fn cuboid_scales_to_extents() {
        let geometry = cuboid(Vec3::new(2.0, 3.0, 4.0));
        for c in &geometry.coords {
            assert!(c.x.abs() <= 1.0 + EPSILON);
            assert!(c.y.abs() <= 1.5 + EPSILON);
            assert!(c.z.abs() <= 2.0 + EPSILON);
        }
    }

    #[test]
    fn sphere_vertices_sit_on_the_radius() {
        let geometry = sphere(3.0, 16, 8);
        assert_eq!(geometry.coords.len(), (16 + 1) * (8 + 1));
        for c in &geometry.coords {
            assert!((c.length() - 1.5).abs() < EPSILON);
        }
        // Pole bands emit one triangle per segment, interior bands two.
        assert_eq!(geometry.faces.len() as u32, 2 * 16 * (8 - 1));
    }

    #[test]
    fn quad_is_two_triangles_facing_forward() {
        let geometry = quad(2.0, 1.0);
        assert_eq!(geometry.coords.len(), 4);
        assert_eq!(geometry.faces.len(), 2);
        let normals = compute_normals(&geometry.coords, &geometry.faces);
        for n in normals {
            assert!((n - Vec3::Z).length() < EPSILON);
        }
    }
}
