//! The window and its rendering surface.

pub use self::canvas::{Canvas, CanvasSetup};

mod canvas;
