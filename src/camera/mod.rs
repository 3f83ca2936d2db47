//! Cameras and camera controls.

pub use self::orbit::OrbitControls;
pub use self::perspective::PerspectiveCamera;

mod orbit;
mod perspective;

use glamx::{Mat4, Pose3, Vec3};

use crate::window::Canvas;

/// Trait implemented by cameras the renderer can draw from.
pub trait Camera {
    /// Updates per-frame state, e.g. the aspect ratio from the canvas size.
    fn update(&mut self, canvas: &Canvas);

    /// The view transformation (world to camera space).
    fn view_transform(&self) -> Pose3;

    /// The projection matrix (camera space to clip space).
    fn projection(&self) -> Mat4;

    /// The camera position in world space.
    fn eye(&self) -> Vec3;

    /// The near and far clipping plane distances.
    fn clip_planes(&self) -> (f32, f32);

    /// The combined projection-view transformation.
    fn transformation(&self) -> Mat4 {
        self.projection() * self.view_transform().to_mat4()
    }
}
