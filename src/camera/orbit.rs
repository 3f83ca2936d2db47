//! Orbit controls: mouse input orbits a camera around a target point.

use glamx::{Vec2, Vec3};

use crate::camera::PerspectiveCamera;
use crate::event::{Action, MouseButton, WindowEvent};
use crate::window::Canvas;

// Keeps the orbit away from the poles where yaw becomes undefined.
const PITCH_LIMIT: f32 = 0.01;

/// Maps pointer input to orbit motion of a [`PerspectiveCamera`].
///
/// Call [`update`](Self::update) once per frame after
/// [`Canvas::poll_events`]; it consumes the events buffered by the last poll
/// and rewrites the camera position and look-at target:
///
/// * left drag orbits around the target,
/// * right drag pans the target in the view plane,
/// * scrolling dollies towards or away from the target.
pub struct OrbitControls {
    /// The point the camera orbits around.
    pub target: Vec3,
    enabled: bool,
    min_distance: f32,
    max_distance: f32,
    rotate_speed: f32,
    pan_speed: f32,
    zoom_speed: f32,
    rotate_button: Option<MouseButton>,
    pan_button: Option<MouseButton>,
    last_cursor: Option<Vec2>,
}

impl OrbitControls {
    /// Creates controls orbiting the camera's current look-at target.
    ///
    /// The distance limits default to the camera's clip planes.
    pub fn new(camera: &PerspectiveCamera) -> OrbitControls {
        let (znear, zfar) = crate::camera::Camera::clip_planes(camera);
        OrbitControls {
            target: camera.target(),
            enabled: true,
            min_distance: znear * 2.0,
            max_distance: zfar,
            rotate_speed: 0.005,
            pan_speed: 0.001,
            zoom_speed: 0.01,
            rotate_button: Some(MouseButton::Left),
            pan_button: Some(MouseButton::Right),
            last_cursor: None,
        }
    }

    /// Enables or disables all input handling.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Sets the closest and farthest allowed orbit distances.
    pub fn set_distance_limits(&mut self, min: f32, max: f32) {
        self.min_distance = min.max(1.0e-4);
        self.max_distance = max.max(self.min_distance);
    }

    /// Sets the orbit increment per pixel of drag, in radians.
    pub fn set_rotate_speed(&mut self, speed: f32) {
        self.rotate_speed = speed;
    }

    /// Sets the pan increment per pixel of drag, as a fraction of the orbit
    /// distance.
    pub fn set_pan_speed(&mut self, speed: f32) {
        self.pan_speed = speed;
    }

    /// Sets the dolly factor per scroll step.
    pub fn set_zoom_speed(&mut self, speed: f32) {
        self.zoom_speed = speed;
    }

    /// Rebinds the orbit button. `None` disables orbiting.
    pub fn rebind_rotate_button(&mut self, button: Option<MouseButton>) {
        self.rotate_button = button;
    }

    /// Rebinds the pan button. `None` disables panning.
    pub fn rebind_pan_button(&mut self, button: Option<MouseButton>) {
        self.pan_button = button;
    }

    /// Applies the input gathered by the last [`Canvas::poll_events`] to the
    /// camera.
    pub fn update(&mut self, canvas: &Canvas, camera: &mut PerspectiveCamera) {
        if !self.enabled {
            self.last_cursor = canvas.cursor_pos().map(|(x, y)| Vec2::new(x as f32, y as f32));
            return;
        }

        let offset = camera.position - self.target;
        let mut radius = offset.length().clamp(self.min_distance, self.max_distance);
        let (mut yaw, mut pitch) = if offset.length() > 1.0e-6 {
            spherical_angles(offset)
        } else {
            (0.0, std::f32::consts::FRAC_PI_2)
        };

        for event in canvas.events() {
            match *event {
                WindowEvent::CursorPos(x, y, _) => {
                    let cursor = Vec2::new(x as f32, y as f32);
                    if let Some(last) = self.last_cursor {
                        let delta = cursor - last;

                        if self.button_pressed(canvas, self.rotate_button) {
                            yaw -= delta.x * self.rotate_speed;
                            pitch -= delta.y * self.rotate_speed;
                            pitch = pitch.clamp(
                                PITCH_LIMIT,
                                std::f32::consts::PI - PITCH_LIMIT,
                            );
                        }

                        if self.button_pressed(canvas, self.pan_button) {
                            self.pan(camera, radius, delta);
                        }
                    }
                    self.last_cursor = Some(cursor);
                }
                WindowEvent::Scroll(_, dy, _) => {
                    radius *= (1.0 + self.zoom_speed).powf(-dy as f32);
                    radius = radius.clamp(self.min_distance, self.max_distance);
                }
                _ => {}
            }
        }

        camera.position = self.target + from_spherical(radius, yaw, pitch);
        camera.look_at(self.target);
    }

    fn button_pressed(&self, canvas: &Canvas, button: Option<MouseButton>) -> bool {
        button.is_some_and(|b| canvas.get_mouse_button(b) == Action::Press)
    }

    fn pan(&mut self, camera: &PerspectiveCamera, radius: f32, delta: Vec2) {
        let forward = (self.target - camera.position).normalize_or(Vec3::NEG_Z);
        let right = forward.cross(camera.up()).normalize_or(Vec3::X);
        let up = right.cross(forward);

        let step = self.pan_speed * radius;
        self.target += right * (-delta.x * step) + up * (delta.y * step);
    }
}

/// Decomposes `offset` into (yaw, pitch) with pitch measured from +Y.
fn spherical_angles(offset: Vec3) -> (f32, f32) {
    let radius = offset.length();
    let yaw = offset.x.atan2(offset.z);
    let pitch = (offset.y / radius).clamp(-1.0, 1.0).acos();
    (yaw, pitch)
}

/// Rebuilds an offset vector from spherical coordinates.
fn from_spherical(radius: f32, yaw: f32, pitch: f32) -> Vec3 {
    Vec3::new(
        radius * pitch.sin() * yaw.sin(),
        radius * pitch.cos(),
        radius * pitch.sin() * yaw.cos(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 0.0001;

    #[test]
    fn spherical_round_trip() {
        for offset in [
            Vec3::new(0.0, 0.0, 5.0),
            Vec3::new(1.0, 2.0, 3.0),
            Vec3::new(-4.0, 0.5, -1.0),
        ] {
            let (yaw, pitch) = spherical_angles(offset);
            let rebuilt = from_spherical(offset.length(), yaw, pitch);
            assert!(
                (rebuilt - offset).length() < EPSILON,
                "{offset:?} -> {rebuilt:?}"
            );
        }
    }

    #[test]
    fn pitch_stays_between_the_poles() {
        let (_, pitch) = spherical_angles(Vec3::new(0.0, 1.0, 0.0));
        assert!((pitch - 0.0).abs() < EPSILON);
        let clamped = pitch.clamp(PITCH_LIMIT, std::f32::consts::PI - PITCH_LIMIT);
        assert!(clamped >= PITCH_LIMIT);
    }

    #[test]
    fn pan_moves_the_target_in_the_view_plane() {
        let mut camera = PerspectiveCamera::new();
        camera.position = Vec3::new(0.0, 0.0, 5.0);
        camera.look_at(Vec3::ZERO);

        let mut controls = OrbitControls::new(&camera);
        controls.pan(&camera, 5.0, Vec2::new(10.0, 0.0));

        // Dragging right slides the target along the camera's right axis.
        assert!(controls.target.x.abs() > 0.0);
        assert!(controls.target.z.abs() < EPSILON);
        assert!(controls.target.y.abs() < EPSILON);
    }

    #[test]
    fn distance_limits_clamp_the_radius() {
        let mut controls = OrbitControls::new(&PerspectiveCamera::new());
        controls.set_distance_limits(2.0, 10.0);
        assert!((5.0f32).clamp(controls.min_distance, controls.max_distance) == 5.0);
        assert!((0.5f32).clamp(controls.min_distance, controls.max_distance) == 2.0);
        assert!((50.0f32).clamp(controls.min_distance, controls.max_distance) == 10.0);
    }
}
