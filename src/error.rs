//! Error type shared by the whole crate.

/// Convenience alias for results produced by this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong while opening a canvas or rendering a frame.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The winit event loop could not be created.
    #[error("failed to create the event loop: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    /// The native window could not be created.
    #[error("failed to open the window: {0}")]
    Window(#[from] winit::error::OsError),

    /// The rendering surface could not be created for the window.
    #[error("failed to create the rendering surface: {0}")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),

    /// No suitable GPU adapter was found.
    #[error("failed to find a suitable graphics adapter: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),

    /// The GPU device could not be acquired from the adapter.
    #[error("failed to acquire the graphics device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),

    /// The surface frame could not be acquired and the situation is not
    /// recoverable by reconfiguring (e.g. out of memory).
    #[error("failed to acquire the next frame: {0}")]
    Surface(#[from] wgpu::SurfaceError),

    /// A texture image could not be decoded.
    #[error("failed to decode image: {0}")]
    Image(#[from] image::ImageError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn surface_errors_convert_and_display() {
        let err: Error = wgpu::SurfaceError::Timeout.into();
        assert!(matches!(err, Error::Surface(_)));
        assert!(err.to_string().starts_with("failed to acquire the next frame"));
    }
}
