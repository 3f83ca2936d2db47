//! The objects that populate a scene: meshes, groups and lights.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use glamx::{Rot3, Vec3};

use crate::color::Color;
use crate::geometry::BufferGeometry;
use crate::light::Light;
use crate::material::Material;
use crate::resource::{GpuGeometry, Texture};
use crate::scene::node::Drawable;
use crate::scene::SceneNode;

/// Anything that lives in a scene as a node.
///
/// The trait provides the usual transform conveniences so `Mesh`, lights and
/// plain nodes share one interface.
pub trait Object3d {
    /// The scene node backing this object.
    fn node(&self) -> &SceneNode;

    /// Sets the position relative to the parent node.
    fn set_position(&self, position: Vec3) {
        self.node().set_position(position);
    }

    /// The position relative to the parent node.
    fn position(&self) -> Vec3 {
        self.node().position()
    }

    /// Sets the orientation relative to the parent node.
    fn set_rotation(&self, rotation: Rot3) {
        self.node().set_rotation(rotation);
    }

    /// Applies a rotation in the object's local frame.
    fn rotate(&self, rotation: Rot3) {
        self.node().rotate(rotation);
    }

    /// Sets the per-axis scale.
    fn set_scale(&self, scale: Vec3) {
        self.node().set_scale(scale);
    }

    /// Shows or hides the object and its subtree.
    fn set_visible(&self, visible: bool) {
        self.node().set_visible(visible);
    }
}

impl Object3d for SceneNode {
    fn node(&self) -> &SceneNode {
        self
    }
}

/// A geometry paired with a material, placed in a scene.
///
/// ```no_run
/// use tre3d::prelude::*;
///
/// let geometry = tre3d::geometry::cuboid(Vec3::ONE);
/// let cube = Mesh::new(geometry, PhongMaterial::new(ROYAL_BLUE));
/// cube.set_position(Vec3::new(0.0, 1.0, 0.0));
/// ```
#[derive(Clone)]
pub struct Mesh {
    node: SceneNode,
}

impl Mesh {
    /// Creates a mesh from CPU geometry and a material.
    pub fn new(geometry: BufferGeometry, material: impl Into<Material>) -> Mesh {
        let drawable = Drawable {
            geometry: Rc::new(RefCell::new(GpuGeometry::new(geometry))),
            material: Rc::new(RefCell::new(material.into())),
        };
        Mesh {
            node: SceneNode::with_drawable(drawable),
        }
    }

    /// A CPU copy of the mesh geometry.
    pub fn geometry(&self) -> BufferGeometry {
        self.node
            .drawable()
            .map(|d| d.geometry.borrow().to_buffer_geometry())
            .unwrap_or_default()
    }

    /// Replaces the whole material.
    pub fn set_material(&self, material: impl Into<Material>) {
        if let Some(drawable) = self.node.drawable() {
            *drawable.material.borrow_mut() = material.into();
        }
    }

    /// Edits the material in place.
    pub fn edit_material(&self, f: impl FnOnce(&mut Material)) {
        if let Some(drawable) = self.node.drawable() {
            f(&mut drawable.material.borrow_mut());
        }
    }

    /// Sets the material color.
    pub fn set_color(&self, color: Color) {
        self.edit_material(|m| m.set_color(color));
    }

    /// Toggles wireframe drawing.
    pub fn set_wireframe(&self, wireframe: bool) {
        self.edit_material(|m| m.set_wireframe(wireframe));
    }

    /// Sets or clears the material color map.
    pub fn set_map(&self, map: Option<Arc<Texture>>) {
        self.edit_material(|m| m.set_map(map));
    }
}

impl Object3d for Mesh {
    fn node(&self) -> &SceneNode {
        &self.node
    }
}

/// An empty node used to group other objects.
#[derive(Clone, Default)]
pub struct Group {
    node: SceneNode,
}

impl Group {
    /// Creates an empty group.
    pub fn new() -> Group {
        Group {
            node: SceneNode::empty(),
        }
    }

    /// Attaches a child object to this group.
    pub fn add(&self, object: &impl Object3d) {
        self.node.add(object.node());
    }
}

impl Object3d for Group {
    fn node(&self) -> &SceneNode {
        &self.node
    }
}

/// Uniform light from every direction.
#[derive(Clone)]
pub struct AmbientLight {
    node: SceneNode,
}

impl Default for AmbientLight {
    fn default() -> Self {
        Self::new()
    }
}

impl AmbientLight {
    /// Creates a white ambient light with intensity 1.
    pub fn new() -> AmbientLight {
        AmbientLight {
            node: SceneNode::with_light(Light::ambient()),
        }
    }

    /// Sets the light color.
    pub fn set_color(&self, color: Color) {
        self.node.edit_light(|l| l.color = color);
    }

    /// Sets the intensity multiplier.
    pub fn set_intensity(&self, intensity: f32) {
        self.node.edit_light(|l| l.intensity = intensity);
    }
}

impl Object3d for AmbientLight {
    fn node(&self) -> &SceneNode {
        &self.node
    }
}

/// A sun-like light with parallel rays.
///
/// The direction rotates with the node it is attached to.
#[derive(Clone)]
pub struct DirectionalLight {
    node: SceneNode,
}

impl DirectionalLight {
    /// Creates a white directional light along `dir`.
    pub fn new(dir: Vec3) -> DirectionalLight {
        DirectionalLight {
            node: SceneNode::with_light(Light::directional(dir)),
        }
    }

    /// Sets the light color.
    pub fn set_color(&self, color: Color) {
        self.node.edit_light(|l| l.color = color);
    }

    /// Sets the intensity multiplier.
    pub fn set_intensity(&self, intensity: f32) {
        self.node.edit_light(|l| l.intensity = intensity);
    }
}

impl Object3d for DirectionalLight {
    fn node(&self) -> &SceneNode {
        &self.node
    }
}

/// A point light radiating in all directions from the node position.
#[derive(Clone)]
pub struct PointLight {
    node: SceneNode,
}

impl PointLight {
    /// Creates a white point light with the given attenuation radius.
    pub fn new(radius: f32) -> PointLight {
        PointLight {
            node: SceneNode::with_light(Light::point(radius)),
        }
    }

    /// Sets the light color.
    pub fn set_color(&self, color: Color) {
        self.node.edit_light(|l| l.color = color);
    }

    /// Sets the intensity multiplier.
    pub fn set_intensity(&self, intensity: f32) {
        self.node.edit_light(|l| l.intensity = intensity);
    }
}

impl Object3d for PointLight {
    fn node(&self) -> &SceneNode {
        &self.node
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color;
    use crate::geometry;
    use crate::material::{BasicMaterial, PhongMaterial};

    #[test]
    fn mesh_geometry_is_an_independent_copy() {
        let mesh = Mesh::new(
            geometry::unit_cuboid(),
            PhongMaterial::new(color::ROYAL_BLUE),
        );
        let mut copy = mesh.geometry();
        copy.coords.clear();
        assert_eq!(mesh.geometry().coords.len(), 24);
    }

    #[test]
    fn material_edits_are_visible_through_the_handle() {
        let mesh = Mesh::new(geometry::unit_cuboid(), BasicMaterial::default());
        mesh.set_color(color::BLACK);
        mesh.set_wireframe(true);
        mesh.edit_material(|m| {
            assert_eq!(m.color(), color::BLACK);
            assert!(m.wireframe());
        });
    }

    #[test]
    fn cloned_handles_address_the_same_node() {
        let mesh = Mesh::new(geometry::unit_cuboid(), BasicMaterial::default());
        let alias = mesh.clone();
        alias.set_position(Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(mesh.position(), Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(mesh.node().id(), alias.node().id());
    }
}
