//! CPU-side triangle mesh data.

use glamx::{Vec2, Vec3};

/// A triangle mesh described on the CPU.
///
/// This is the type geometry generators produce and [`Mesh`](crate::scene::Mesh)
/// consumes. Cloning it yields an independent copy, which is how the demos
/// build a wireframe overlay sharing the shape of a solid mesh.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct BufferGeometry {
    /// Vertex positions.
    pub coords: Vec<Vec3>,
    /// Vertex normals. Computed from the faces when absent.
    pub normals: Option<Vec<Vec3>>,
    /// Texture coordinates. Zero when absent.
    pub uvs: Option<Vec<Vec2>>,
    /// Triangles as indices into `coords`.
    pub faces: Vec<[u32; 3]>,
}

impl BufferGeometry {
    /// Creates a geometry from its parts.
    pub fn new(
        coords: Vec<Vec3>,
        normals: Option<Vec<Vec3>>,
        uvs: Option<Vec<Vec2>>,
        faces: Vec<[u32; 3]>,
    ) -> BufferGeometry {
        BufferGeometry {
            coords,
            normals,
            uvs,
            faces,
        }
    }

    /// Whether there is nothing to draw.
    pub fn is_empty(&self) -> bool {
        self.coords.is_empty() || self.faces.is_empty()
    }

    /// Recomputes area-weighted vertex normals from the faces.
    pub fn compute_normals(&mut self) {
        self.normals = Some(compute_normals(&self.coords, &self.faces));
    }

    /// The unique, undirected edges of the mesh, for wireframe rendering.
    ///
    /// Each edge appears once even when shared by two triangles.
    pub fn edges(&self) -> Vec<[u32; 2]> {
        unique_edges(&self.faces)
    }

    /// Scales every vertex component-wise by `factor`.
    pub fn scale_by(&mut self, factor: Vec3) {
        for c in &mut self.coords {
            *c *= factor;
        }
    }
}

/// Collects the unique undirected edges of a triangle list.
pub fn unique_edges(faces: &[[u32; 3]]) -> Vec<[u32; 2]> {
    let mut seen = std::collections::HashSet::new();
    let mut edges = Vec::new();

    for face in faces {
        for (a, b) in [
            (face[0], face[1]),
            (face[1], face[2]),
            (face[2], face[0]),
        ] {
            let key = (a.min(b), a.max(b));
            if seen.insert(key) {
                edges.push([a, b]);
            }
        }
    }

    edges
}

/// Computes area-weighted vertex normals for `coords` under `faces`.
///
/// Vertices referenced by no face (or only by degenerate faces) get a zero
/// normal rather than NaN.
pub fn compute_normals(coords: &[Vec3], faces: &[[u32; 3]]) -> Vec<Vec3> {
    let mut normals = vec![Vec3::ZERO; coords.len()];
    let mut divisor = vec![0f32; coords.len()];

    for f in faces {
        let edge1 = coords[f[1] as usize] - coords[f[0] as usize];
        let edge2 = coords[f[2] as usize] - coords[f[0] as usize];
        let cross = edge1.cross(edge2);
        let normal = if cross != Vec3::ZERO {
            cross.normalize()
        } else {
            cross
        };

        for &i in f {
            normals[i as usize] += normal;
            divisor[i as usize] += 1.0;
        }
    }

    for (n, d) in normals.iter_mut().zip(divisor.iter()) {
        if *d > 0.0 {
            *n /= *d;
        }
    }

    normals
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 0.0001;

    fn vec_approx_eq(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < EPSILON
    }

    #[test]
    fn normals_of_a_ccw_triangle_face_forward() {
        let coords = vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        ];
        let normals = compute_normals(&coords, &[[0, 1, 2]]);
        for n in normals {
            assert!(vec_approx_eq(n, Vec3::Z));
        }
    }

    #[test]
    fn degenerate_faces_produce_zero_normals_not_nan() {
        let coords = vec![Vec3::ZERO, Vec3::ZERO, Vec3::ZERO, Vec3::X];
        let normals = compute_normals(&coords, &[[0, 1, 2]]);
        assert!(vec_approx_eq(normals[0], Vec3::ZERO));
        assert!(normals.iter().all(|n| n.x.is_finite() && n.y.is_finite() && n.z.is_finite()));
    }

    #[test]
    fn shared_edges_are_reported_once() {
        // Two triangles forming a quad: 5 unique edges, 6 raw half-edges.
        let geometry = BufferGeometry::new(
            vec![Vec3::ZERO, Vec3::X, Vec3::X + Vec3::Y, Vec3::Y],
            None,
            None,
            vec![[0, 1, 2], [0, 2, 3]],
        );
        assert_eq!(geometry.edges().len(), 5);
    }

    #[test]
    fn scale_by_stretches_coords() {
        let mut geometry = BufferGeometry::new(
            vec![Vec3::new(1.0, 1.0, 1.0)],
            None,
            None,
            vec![],
        );
        geometry.scale_by(Vec3::new(2.0, 3.0, 4.0));
        assert!(vec_approx_eq(geometry.coords[0], Vec3::new(2.0, 3.0, 4.0)));
    }
}
