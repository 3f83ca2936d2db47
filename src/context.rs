//! The shared wgpu rendering context.

use std::cell::RefCell;
use std::sync::Arc;

// The context is created by the first `Canvas::open` and shared by every GPU
// resource afterwards. It lives in thread-local storage because the event
// loop (and thus the whole engine) is single-threaded.
thread_local! {
    static CONTEXT_SINGLETON: RefCell<Option<Context>> = const { RefCell::new(None) };
}

/// The wgpu context holding the GPU handles every resource needs.
///
/// Cheap to clone: all handles are reference-counted.
#[derive(Clone)]
pub struct Context {
    /// The wgpu instance used to create surfaces.
    pub instance: Arc<wgpu::Instance>,
    /// The selected adapter.
    pub adapter: Arc<wgpu::Adapter>,
    /// The device used to create GPU resources.
    pub device: Arc<wgpu::Device>,
    /// The queue used to submit work.
    pub queue: Arc<wgpu::Queue>,
    /// The texture format of the canvas surface.
    pub surface_format: wgpu::TextureFormat,
}

impl Context {
    /// Installs the global context. Called by [`Canvas::open`](crate::window::Canvas::open).
    pub(crate) fn init(
        instance: wgpu::Instance,
        adapter: wgpu::Adapter,
        device: wgpu::Device,
        queue: wgpu::Queue,
        surface_format: wgpu::TextureFormat,
    ) {
        CONTEXT_SINGLETON.with(|cell| {
            *cell.borrow_mut() = Some(Context {
                instance: Arc::new(instance),
                adapter: Arc::new(adapter),
                device: Arc::new(device),
                queue: Arc::new(queue),
                surface_format,
            });
        });
    }

    /// Returns a clone of the global context.
    ///
    /// # Panics
    /// Panics if no canvas has been opened yet.
    pub fn get() -> Context {
        Context::try_get().expect("no wgpu context: open a Canvas first")
    }

    /// Returns a clone of the global context if one exists.
    pub fn try_get() -> Option<Context> {
        CONTEXT_SINGLETON.with(|cell| cell.borrow().clone())
    }

    /// Whether the global context has been initialized.
    pub fn is_initialized() -> bool {
        CONTEXT_SINGLETON.with(|cell| cell.borrow().is_some())
    }

    /// The texture format used for depth attachments.
    pub fn depth_format() -> wgpu::TextureFormat {
        wgpu::TextureFormat::Depth32Float
    }

    /// Creates a buffer initialized with `contents`.
    pub fn create_buffer_init(
        &self,
        label: Option<&str>,
        contents: &[u8],
        usage: wgpu::BufferUsages,
    ) -> wgpu::Buffer {
        use wgpu::util::DeviceExt;
        self.device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label,
                contents,
                usage,
            })
    }

    /// Creates an uninitialized buffer of `size` bytes.
    pub fn create_buffer(
        &self,
        label: Option<&str>,
        size: u64,
        usage: wgpu::BufferUsages,
    ) -> wgpu::Buffer {
        self.device.create_buffer(&wgpu::BufferDescriptor {
            label,
            size,
            usage,
            mapped_at_creation: false,
        })
    }

    /// Writes `data` into `buffer` at `offset`.
    pub fn write_buffer(&self, buffer: &wgpu::Buffer, offset: u64, data: &[u8]) {
        self.queue.write_buffer(buffer, offset, data);
    }

    /// Creates a shader module from WGSL source.
    pub fn create_shader_module(&self, label: Option<&str>, source: &str) -> wgpu::ShaderModule {
        self.device
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label,
                source: wgpu::ShaderSource::Wgsl(source.into()),
            })
    }

    /// Creates a command encoder.
    pub fn create_command_encoder(&self, label: Option<&str>) -> wgpu::CommandEncoder {
        self.device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor { label })
    }

    /// Submits command buffers to the queue.
    pub fn submit<I: IntoIterator<Item = wgpu::CommandBuffer>>(&self, command_buffers: I) {
        self.queue.submit(command_buffers);
    }
}
