//! A CPU-backed buffer lazily mirrored to the GPU.

use crate::context::Context;
use bytemuck::{Pod, Zeroable};

/// A vector of elements kept on the CPU and uploaded to a wgpu buffer on demand.
///
/// Mutating the data through [`data_mut`](Self::data_mut) marks the buffer
/// dirty; the next [`upload`](Self::upload) either rewrites the existing GPU
/// buffer in place or reallocates it when the data grew past its capacity.
pub struct GpuBuffer<T: Pod + Zeroable> {
    data: Vec<T>,
    usage: wgpu::BufferUsages,
    buffer: Option<wgpu::Buffer>,
    dirty: bool,
}

impl<T: Pod + Zeroable> GpuBuffer<T> {
    /// Creates a buffer that is not yet uploaded to the GPU.
    pub fn new(data: Vec<T>, usage: wgpu::BufferUsages) -> GpuBuffer<T> {
        GpuBuffer {
            data,
            usage,
            buffer: None,
            dirty: true,
        }
    }

    /// The number of elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the buffer holds no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The CPU-side contents.
    #[inline]
    pub fn data(&self) -> &[T] {
        &self.data
    }

    /// Mutable access to the CPU-side contents. Marks the buffer dirty.
    #[inline]
    pub fn data_mut(&mut self) -> &mut Vec<T> {
        self.dirty = true;
        &mut self.data
    }

    /// Whether the CPU and GPU copies are out of sync.
    #[inline]
    pub fn dirty(&self) -> bool {
        self.dirty
    }

    /// The GPU buffer, if it has been uploaded.
    #[inline]
    pub fn buffer(&self) -> Option<&wgpu::Buffer> {
        self.buffer.as_ref()
    }

    /// Uploads the CPU contents to the GPU if needed.
    ///
    /// Empty buffers are never uploaded; drawing code treats a missing GPU
    /// buffer as "nothing to draw".
    pub fn upload(&mut self, ctxt: &Context) {
        if self.data.is_empty() {
            self.dirty = false;
            return;
        }

        let bytes: &[u8] = bytemuck::cast_slice(&self.data);

        match &self.buffer {
            None => {
                self.buffer = Some(ctxt.create_buffer_init(
                    Some("tre3d buffer"),
                    bytes,
                    self.usage | wgpu::BufferUsages::COPY_DST,
                ));
            }
            Some(buffer) if self.dirty => {
                if bytes.len() as u64 <= buffer.size() {
                    ctxt.write_buffer(buffer, 0, bytes);
                } else {
                    self.buffer = Some(ctxt.create_buffer_init(
                        Some("tre3d buffer"),
                        bytes,
                        self.usage | wgpu::BufferUsages::COPY_DST,
                    ));
                }
            }
            Some(_) => {}
        }

        self.dirty = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mutation_marks_dirty() {
        let mut buf = GpuBuffer::new(vec![[0.0f32; 3]; 4], wgpu::BufferUsages::VERTEX);
        assert!(buf.dirty());
        buf.dirty = false;
        assert_eq!(buf.data().len(), 4);
        buf.data_mut().push([1.0; 3]);
        assert!(buf.dirty());
        assert_eq!(buf.len(), 5);
    }
}
