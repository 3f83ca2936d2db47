//! GPU-side resources: buffers, geometry and textures.

pub use self::gpu_buffer::GpuBuffer;
pub use self::gpu_geometry::GpuGeometry;
pub use self::texture::{Texture, TextureWrapping};

mod gpu_buffer;
mod gpu_geometry;
mod texture;
