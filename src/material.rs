//! Materials deciding how meshes are shaded.

use std::sync::Arc;

use crate::color::{Color, ColorExt, BLACK, WHITE};
use crate::resource::Texture;

/// An unlit material: the surface shows its color (times the color map)
/// regardless of lighting.
///
/// With `wireframe` set, the mesh draws its unique edges as lines instead of
/// filled triangles.
#[derive(Clone)]
pub struct BasicMaterial {
    /// Surface color.
    pub color: Color,
    /// Optional color map, multiplied with `color`.
    pub map: Option<Arc<Texture>>,
    /// Draw edges instead of filled triangles.
    pub wireframe: bool,
    /// Disable backface culling.
    pub double_sided: bool,
}

impl Default for BasicMaterial {
    fn default() -> Self {
        Self {
            color: WHITE,
            map: None,
            wireframe: false,
            double_sided: false,
        }
    }
}

impl BasicMaterial {
    /// Creates an unlit material with the given color.
    pub fn new(color: Color) -> Self {
        Self {
            color,
            ..Default::default()
        }
    }
}

/// A Blinn-Phong lit material.
#[derive(Clone)]
pub struct PhongMaterial {
    /// Diffuse color.
    pub color: Color,
    /// Specular highlight color.
    pub specular: Color,
    /// Specular exponent.
    pub shininess: f32,
    /// Emitted color, independent of lighting.
    pub emissive: Color,
    /// Optional color map, multiplied with `color`.
    pub map: Option<Arc<Texture>>,
    /// Draw edges instead of filled triangles.
    pub wireframe: bool,
    /// Disable backface culling.
    pub double_sided: bool,
}

impl Default for PhongMaterial {
    fn default() -> Self {
        Self {
            color: WHITE,
            specular: Color::from_hex(0x111111),
            shininess: 30.0,
            emissive: BLACK,
            map: None,
            wireframe: false,
            double_sided: false,
        }
    }
}

impl PhongMaterial {
    /// Creates a lit material with the given diffuse color.
    pub fn new(color: Color) -> Self {
        Self {
            color,
            ..Default::default()
        }
    }
}

/// Any material a mesh can carry.
#[derive(Clone)]
pub enum Material {
    /// Unlit.
    Basic(BasicMaterial),
    /// Blinn-Phong lit.
    Phong(PhongMaterial),
}

/// The shading family of a material; selects the shader pipeline.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum MaterialKind {
    /// Unlit shading.
    Basic,
    /// Blinn-Phong shading.
    Phong,
}

impl Material {
    /// The shading family.
    pub fn kind(&self) -> MaterialKind {
        match self {
            Material::Basic(_) => MaterialKind::Basic,
            Material::Phong(_) => MaterialKind::Phong,
        }
    }

    /// The surface color.
    pub fn color(&self) -> Color {
        match self {
            Material::Basic(m) => m.color,
            Material::Phong(m) => m.color,
        }
    }

    /// Sets the surface color.
    pub fn set_color(&mut self, color: Color) {
        match self {
            Material::Basic(m) => m.color = color,
            Material::Phong(m) => m.color = color,
        }
    }

    /// Whether the mesh draws as a wireframe.
    pub fn wireframe(&self) -> bool {
        match self {
            Material::Basic(m) => m.wireframe,
            Material::Phong(m) => m.wireframe,
        }
    }

    /// Toggles wireframe drawing.
    pub fn set_wireframe(&mut self, wireframe: bool) {
        match self {
            Material::Basic(m) => m.wireframe = wireframe,
            Material::Phong(m) => m.wireframe = wireframe,
        }
    }

    /// The color map, if any.
    pub fn map(&self) -> Option<&Arc<Texture>> {
        match self {
            Material::Basic(m) => m.map.as_ref(),
            Material::Phong(m) => m.map.as_ref(),
        }
    }

    /// Sets or clears the color map.
    pub fn set_map(&mut self, map: Option<Arc<Texture>>) {
        match self {
            Material::Basic(m) => m.map = map,
            Material::Phong(m) => m.map = map,
        }
    }

    /// Whether backface culling is disabled.
    pub fn double_sided(&self) -> bool {
        match self {
            Material::Basic(m) => m.double_sided,
            Material::Phong(m) => m.double_sided,
        }
    }
}

impl From<BasicMaterial> for Material {
    fn from(value: BasicMaterial) -> Self {
        Material::Basic(value)
    }
}

impl From<PhongMaterial> for Material {
    fn from(value: PhongMaterial) -> Self {
        Material::Phong(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color;

    #[test]
    fn defaults_match_the_usual_conventions() {
        let basic = BasicMaterial::default();
        assert_eq!(basic.color, color::WHITE);
        assert!(!basic.wireframe);

        let phong = PhongMaterial::default();
        assert_eq!(phong.shininess, 30.0);
        assert_eq!(phong.specular.to_hex(), 0x111111);
        assert_eq!(phong.emissive, color::BLACK);
    }

    #[test]
    fn enum_accessors_reach_both_variants() {
        let mut m: Material = BasicMaterial::new(color::RED).into();
        assert_eq!(m.kind(), MaterialKind::Basic);
        m.set_wireframe(true);
        assert!(m.wireframe());

        let mut m: Material = PhongMaterial::new(color::BLUE).into();
        assert_eq!(m.kind(), MaterialKind::Phong);
        m.set_color(color::GREEN);
        assert_eq!(m.color(), color::GREEN);
        assert!(!m.double_sided());
    }
}
