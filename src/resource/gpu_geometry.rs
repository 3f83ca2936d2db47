//! The GPU-side counterpart of [`BufferGeometry`].

use glamx::{Vec2, Vec3};

use crate::context::Context;
use crate::geometry::{compute_normals, BufferGeometry};
use crate::resource::GpuBuffer;

/// A triangle mesh with its vertex data mirrored in GPU buffers.
///
/// Buffers are uploaded lazily before the first frame that draws them. The
/// edge index buffer, used for wireframe rendering, is derived from the faces
/// on first request.
pub struct GpuGeometry {
    coords: GpuBuffer<Vec3>,
    normals: GpuBuffer<Vec3>,
    uvs: GpuBuffer<Vec2>,
    faces: GpuBuffer<[u32; 3]>,
    edges: Option<GpuBuffer<[u32; 2]>>,
}

impl GpuGeometry {
    /// Creates a GPU geometry from CPU mesh data.
    ///
    /// Missing normals are computed from the faces; missing UVs default to
    /// the origin.
    pub fn new(geometry: BufferGeometry) -> GpuGeometry {
        let BufferGeometry {
            coords,
            normals,
            uvs,
            faces,
        } = geometry;

        let normals = normals.unwrap_or_else(|| compute_normals(&coords, &faces));
        let uvs = uvs.unwrap_or_else(|| vec![Vec2::ZERO; coords.len()]);

        GpuGeometry {
            coords: GpuBuffer::new(coords, wgpu::BufferUsages::VERTEX),
            normals: GpuBuffer::new(normals, wgpu::BufferUsages::VERTEX),
            uvs: GpuBuffer::new(uvs, wgpu::BufferUsages::VERTEX),
            faces: GpuBuffer::new(faces, wgpu::BufferUsages::INDEX),
            edges: None,
        }
    }

    /// A CPU copy of the mesh data.
    pub fn to_buffer_geometry(&self) -> BufferGeometry {
        BufferGeometry {
            coords: self.coords.data().to_vec(),
            normals: Some(self.normals.data().to_vec()),
            uvs: Some(self.uvs.data().to_vec()),
            faces: self.faces.data().to_vec(),
        }
    }

    /// Whether there is nothing to draw.
    pub fn is_empty(&self) -> bool {
        self.coords.is_empty() || self.faces.is_empty()
    }

    /// Uploads the vertex and face buffers if they are missing or stale.
    pub fn upload(&mut self, ctxt: &Context) {
        self.coords.upload(ctxt);
        self.normals.upload(ctxt);
        self.uvs.upload(ctxt);
        self.faces.upload(ctxt);
    }

    /// Derives the unique edge list from the faces, if not done yet.
    pub fn ensure_edges(&mut self) {
        if self.edges.is_none() {
            self.edges = Some(GpuBuffer::new(
                crate::geometry::unique_edges(self.faces.data()),
                wgpu::BufferUsages::INDEX,
            ));
        }
    }

    /// Derives and uploads the edge index buffer.
    pub fn ensure_edges_uploaded(&mut self, ctxt: &Context) {
        self.ensure_edges();
        if let Some(edges) = &mut self.edges {
            edges.upload(ctxt);
        }
    }

    /// The vertex position buffer, if uploaded.
    pub fn coords_buffer(&self) -> Option<&wgpu::Buffer> {
        self.coords.buffer()
    }

    /// The vertex normal buffer, if uploaded.
    pub fn normals_buffer(&self) -> Option<&wgpu::Buffer> {
        self.normals.buffer()
    }

    /// The texture coordinate buffer, if uploaded.
    pub fn uvs_buffer(&self) -> Option<&wgpu::Buffer> {
        self.uvs.buffer()
    }

    /// The triangle index buffer, if uploaded.
    pub fn faces_buffer(&self) -> Option<&wgpu::Buffer> {
        self.faces.buffer()
    }

    /// The edge index buffer, if derived and uploaded.
    pub fn edges_buffer(&self) -> Option<&wgpu::Buffer> {
        self.edges.as_ref().and_then(|e| e.buffer())
    }

    /// The number of triangle indices.
    pub fn num_face_indices(&self) -> u32 {
        (self.faces.len() * 3) as u32
    }

    /// The number of edge indices.
    pub fn num_edge_indices(&self) -> u32 {
        self.edges.as_ref().map(|e| (e.len() * 2) as u32).unwrap_or(0)
    }
}

impl From<BufferGeometry> for GpuGeometry {
    fn from(value: BufferGeometry) -> Self {
        GpuGeometry::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry;

    #[test]
    fn missing_attributes_are_filled_in() {
        let quad = BufferGeometry::new(
            vec![Vec3::ZERO, Vec3::X, Vec3::X + Vec3::Y, Vec3::Y],
            None,
            None,
            vec![[0, 1, 2], [0, 2, 3]],
        );
        let gpu = GpuGeometry::new(quad);
        let round_trip = gpu.to_buffer_geometry();
        assert_eq!(round_trip.normals.as_ref().unwrap().len(), 4);
        assert_eq!(round_trip.uvs.as_ref().unwrap().len(), 4);
        assert_eq!(gpu.num_face_indices(), 6);
    }

    #[test]
    fn edges_are_derived_once_and_counted() {
        let mut gpu = GpuGeometry::new(geometry::unit_cuboid());
        assert_eq!(gpu.num_edge_indices(), 0);
        gpu.ensure_edges();
        assert_eq!(gpu.num_edge_indices(), 30 * 2);
        gpu.ensure_edges();
        assert_eq!(gpu.num_edge_indices(), 30 * 2);
    }
}
