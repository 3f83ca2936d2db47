//! The perspective projection camera.

use glamx::{Mat4, Pose3, Vec3};

use crate::camera::Camera;
use crate::window::Canvas;

/// A camera with perspective projection.
///
/// The position is a public field so it can be placed directly, as in the
/// classic demo setup:
///
/// ```
/// use tre3d::camera::PerspectiveCamera;
///
/// let mut camera = PerspectiveCamera::new();
/// camera.position.z = 5.0;
/// ```
///
/// The camera looks at a target point (the origin by default); use
/// [`look_at`](Self::look_at) to aim it elsewhere.
#[derive(Clone, Debug, PartialEq)]
pub struct PerspectiveCamera {
    /// The camera position in world space.
    pub position: Vec3,
    target: Vec3,
    up: Vec3,
    fov: f32,
    aspect: f32,
    znear: f32,
    zfar: f32,
}

impl Default for PerspectiveCamera {
    fn default() -> Self {
        Self::new()
    }
}

impl PerspectiveCamera {
    /// Creates a camera at the origin looking down the -Z axis.
    ///
    /// Default frustum: 45 degree field of view, near plane at 0.1, far
    /// plane at 1024.
    pub fn new() -> PerspectiveCamera {
        PerspectiveCamera::with_frustum(45.0f32.to_radians(), 0.1, 1024.0)
    }

    /// Creates a camera with custom frustum parameters.
    ///
    /// # Arguments
    /// * `fov` - vertical field of view, in radians
    /// * `znear` - near clipping plane distance
    /// * `zfar` - far clipping plane distance
    pub fn with_frustum(fov: f32, znear: f32, zfar: f32) -> PerspectiveCamera {
        PerspectiveCamera {
            position: Vec3::ZERO,
            target: Vec3::ZERO,
            up: Vec3::Y,
            fov,
            aspect: 800.0 / 600.0,
            znear,
            zfar,
        }
    }

    /// Aims the camera at `target`.
    pub fn look_at(&mut self, target: Vec3) {
        self.target = target;
    }

    /// The point the camera is aimed at.
    pub fn target(&self) -> Vec3 {
        self.target
    }

    /// The camera up direction.
    pub fn up(&self) -> Vec3 {
        self.up
    }

    /// Sets the camera up direction.
    pub fn set_up(&mut self, up: Vec3) {
        self.up = up.normalize_or(Vec3::Y);
    }

    /// The vertical field of view, in radians.
    pub fn fov(&self) -> f32 {
        self.fov
    }

    /// Sets the vertical field of view, in radians.
    pub fn set_fov(&mut self, fov: f32) {
        self.fov = fov;
    }

    /// Sets the width / height aspect ratio.
    ///
    /// The renderer keeps this in sync with the canvas automatically.
    pub fn set_aspect(&mut self, aspect: f32) {
        if aspect.is_finite() && aspect > 0.0 {
            self.aspect = aspect;
        }
    }

    // Falls back to -Z when the target collapses onto the eye.
    fn look_target(&self) -> Vec3 {
        if (self.target - self.position).length_squared() < 1.0e-10 {
            self.position + Vec3::NEG_Z
        } else {
            self.target
        }
    }
}

impl Camera for PerspectiveCamera {
    fn update(&mut self, canvas: &Canvas) {
        let (w, h) = canvas.size();
        if h > 0 {
            self.set_aspect(w as f32 / h as f32);
        }
    }

    fn view_transform(&self) -> Pose3 {
        Pose3::look_at_rh(self.position, self.look_target(), self.up)
    }

    fn projection(&self) -> Mat4 {
        Mat4::perspective_rh_gl(self.fov, self.aspect, self.znear, self.zfar)
    }

    fn eye(&self) -> Vec3 {
        self.position
    }

    fn clip_planes(&self) -> (f32, f32) {
        (self.znear, self.zfar)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glamx::{Vec4, Vec4Swizzles};

    const EPSILON: f32 = 0.0001;

    fn view_point(camera: &PerspectiveCamera, p: Vec3) -> Vec3 {
        let h = camera.view_transform().to_mat4() * p.extend(1.0);
        h.xyz()
    }

    #[test]
    fn the_target_sits_on_the_negative_z_axis_in_view_space() {
        let mut camera = PerspectiveCamera::new();
        camera.position = Vec3::new(0.0, 0.0, 5.0);
        camera.look_at(Vec3::ZERO);

        let v = view_point(&camera, Vec3::ZERO);
        assert!(v.x.abs() < EPSILON && v.y.abs() < EPSILON);
        assert!((v.z + 5.0).abs() < EPSILON);
    }

    #[test]
    fn the_eye_maps_to_the_view_origin() {
        let mut camera = PerspectiveCamera::new();
        camera.position = Vec3::new(3.0, -2.0, 7.0);
        camera.look_at(Vec3::new(0.0, 1.0, 0.0));

        let v = view_point(&camera, camera.position);
        assert!(v.length() < EPSILON);
    }

    #[test]
    fn degenerate_target_falls_back_to_minus_z() {
        let camera = PerspectiveCamera::new();
        // position == target == origin; must not produce NaNs.
        let v = camera.view_transform().to_mat4() * Vec4::new(0.0, 0.0, -1.0, 1.0);
        assert!(v.x.is_finite() && v.y.is_finite() && v.z.is_finite());
        assert!((v.xyz().z + 1.0).abs() < EPSILON);
    }

    #[test]
    fn projection_scales_with_aspect() {
        let mut camera = PerspectiveCamera::new();
        camera.set_aspect(2.0);
        let wide = camera.projection();
        camera.set_aspect(1.0);
        let square = camera.projection();
        // Horizontal focal term shrinks as the viewport widens.
        assert!(wide.col(0).x < square.col(0).x);

        // Invalid aspect ratios are ignored.
        camera.set_aspect(0.0);
        assert_eq!(camera.projection(), square);
    }
}
