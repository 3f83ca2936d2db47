//! Light sources.
//!
//! A [`Light`] describes the emission; attaching one to the scene is done
//! through the node wrappers in [`crate::scene`] ([`AmbientLight`],
//! [`DirectionalLight`], [`PointLight`]). Positional and directional lights
//! inherit their world transform from the node they live on.
//!
//! [`AmbientLight`]: crate::scene::AmbientLight
//! [`DirectionalLight`]: crate::scene::DirectionalLight
//! [`PointLight`]: crate::scene::PointLight

use glamx::Vec3;

use crate::color::{Color, WHITE};

/// Maximum number of positional/directional lights rendered per frame.
///
/// Ambient lights are accumulated separately and do not count against this.
pub const MAX_LIGHTS: usize = 8;

/// The kind of light source.
#[derive(Clone, Debug, PartialEq)]
pub enum LightKind {
    /// Uniform light from every direction. Position is irrelevant.
    Ambient,

    /// Parallel rays along the given direction (like the sun).
    ///
    /// The direction is rotated by the owning node's world transform.
    Directional(Vec3),

    /// A point light radiating equally in all directions.
    Point {
        /// Distance beyond which the light contributes nothing.
        radius: f32,
    },
}

impl Default for LightKind {
    fn default() -> Self {
        LightKind::Point { radius: 100.0 }
    }
}

/// A light source attachable to a scene node.
#[derive(Clone, Debug, PartialEq)]
pub struct Light {
    /// The kind of light.
    pub kind: LightKind,
    /// The light color.
    pub color: Color,
    /// Intensity multiplier.
    pub intensity: f32,
    /// Disabled lights are skipped during collection.
    pub enabled: bool,
}

impl Default for Light {
    fn default() -> Self {
        Self {
            kind: LightKind::default(),
            color: WHITE,
            intensity: 1.0,
            enabled: true,
        }
    }
}

impl Light {
    /// Creates an ambient light.
    pub fn ambient() -> Self {
        Self {
            kind: LightKind::Ambient,
            ..Default::default()
        }
    }

    /// Creates a directional light along `dir`.
    pub fn directional(dir: Vec3) -> Self {
        Self {
            kind: LightKind::Directional(dir),
            ..Default::default()
        }
    }

    /// Creates a point light with the given attenuation radius.
    pub fn point(radius: f32) -> Self {
        Self {
            kind: LightKind::Point { radius },
            ..Default::default()
        }
    }

    /// Sets the light color.
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    /// Sets the intensity multiplier.
    pub fn with_intensity(mut self, intensity: f32) -> Self {
        self.intensity = intensity;
        self
    }

    /// Sets whether the light is enabled.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

/// A non-ambient light collected from the scene with its world transform.
#[derive(Clone, Debug)]
pub struct CollectedLight {
    /// The kind of light.
    pub kind: LightKind,
    /// Color premultiplied by nothing; intensity is kept separate.
    pub color: Vec3,
    /// Intensity multiplier.
    pub intensity: f32,
    /// World-space position of the owning node.
    pub position: Vec3,
    /// World-space direction (directional lights only; -Z otherwise).
    pub direction: Vec3,
}

/// The lights gathered from the scene for one frame.
#[derive(Clone, Debug, Default)]
pub struct LightCollection {
    /// Collected positional/directional lights, at most [`MAX_LIGHTS`].
    pub lights: Vec<CollectedLight>,
    /// Accumulated ambient term (color x intensity summed over ambient lights).
    pub ambient: Vec3,
}

impl LightCollection {
    /// Creates an empty collection.
    pub fn new() -> Self {
        Self {
            lights: Vec::with_capacity(MAX_LIGHTS),
            ambient: Vec3::ZERO,
        }
    }

    /// Adds a collected light. Returns `false` when the collection is full.
    pub fn add(&mut self, light: CollectedLight) -> bool {
        if self.lights.len() < MAX_LIGHTS {
            self.lights.push(light);
            true
        } else {
            false
        }
    }

    /// Accumulates an ambient contribution.
    pub fn add_ambient(&mut self, color: Color, intensity: f32) {
        self.ambient += Vec3::new(color.r, color.g, color.b) * intensity;
    }

    /// The number of collected non-ambient lights.
    pub fn len(&self) -> usize {
        self.lights.len()
    }

    /// Whether no non-ambient light was collected.
    pub fn is_empty(&self) -> bool {
        self.lights.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color;

    fn dummy(kind: LightKind) -> CollectedLight {
        CollectedLight {
            kind,
            color: Vec3::ONE,
            intensity: 1.0,
            position: Vec3::ZERO,
            direction: Vec3::NEG_Z,
        }
    }

    #[test]
    fn collection_caps_at_max_lights() {
        let mut lights = LightCollection::new();
        for _ in 0..MAX_LIGHTS {
            assert!(lights.add(dummy(LightKind::default())));
        }
        assert!(!lights.add(dummy(LightKind::default())));
        assert_eq!(lights.len(), MAX_LIGHTS);
    }

    #[test]
    fn ambient_accumulates_color_times_intensity() {
        let mut lights = LightCollection::new();
        lights.add_ambient(color::WHITE, 0.25);
        lights.add_ambient(color::RED, 0.5);
        let expected = Vec3::new(0.75, 0.25, 0.25);
        assert!((lights.ambient - expected).length() < 1e-6);
        assert!(lights.is_empty());
    }

    #[test]
    fn builders_set_fields() {
        let light = Light::directional(Vec3::NEG_Y)
            .with_color(color::GREEN)
            .with_intensity(2.0)
            .with_enabled(false);
        assert_eq!(light.kind, LightKind::Directional(Vec3::NEG_Y));
        assert_eq!(light.intensity, 2.0);
        assert!(!light.enabled);
    }
}
