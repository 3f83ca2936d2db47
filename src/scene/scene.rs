//! The scene container.

use crate::color::Color;
use crate::light::LightCollection;
use crate::material::Material;
use crate::scene::node::DrawItem;
use crate::scene::{Object3d, SceneNode};

/// Linear fog: surfaces fade to `color` between `near` and `far`.
#[derive(Clone, Debug, PartialEq)]
pub struct Fog {
    /// The fog color, usually matching the background.
    pub color: Color,
    /// Distance at which fog starts.
    pub near: f32,
    /// Distance at which surfaces are fully fogged.
    pub far: f32,
}

impl Fog {
    /// Creates a linear fog.
    pub fn new(color: Color, near: f32, far: f32) -> Fog {
        Fog { color, near, far }
    }
}

/// The root container of renderable objects and lights.
///
/// ```no_run
/// use tre3d::prelude::*;
///
/// let mut scene = Scene::new();
/// let cube = Mesh::new(tre3d::geometry::cuboid(Vec3::ONE), PhongMaterial::default());
/// scene.add(&cube);
/// scene.add(&AmbientLight::new());
/// ```
pub struct Scene {
    root: SceneNode,
    /// Clear color of the frame. Black when `None`.
    pub background: Option<Color>,
    /// Optional linear fog applied to every material.
    pub fog: Option<Fog>,
    /// When set, every mesh renders with this material instead of its own.
    pub override_material: Option<Material>,
    /// When false, the renderer skips world-transform propagation and uses
    /// the transforms from the last update.
    pub auto_update: bool,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    /// Creates an empty scene.
    pub fn new() -> Scene {
        Scene {
            root: SceneNode::empty(),
            background: None,
            fog: None,
            override_material: None,
            auto_update: true,
        }
    }

    /// The root node of the scene graph.
    pub fn root(&self) -> &SceneNode {
        &self.root
    }

    /// Adds an object to the scene root.
    pub fn add(&mut self, object: &impl Object3d) {
        self.root.add(object.node());
    }

    /// Removes an object previously added to the scene root.
    pub fn remove(&mut self, object: &impl Object3d) {
        self.root.remove(object.node());
    }

    /// Sets the background clear color.
    pub fn set_background(&mut self, color: Color) {
        self.background = Some(color);
    }

    pub(crate) fn update_world_transforms(&self) {
        if self.auto_update {
            self.root.propagate_transforms();
        }
    }

    pub(crate) fn collect_lights(&self) -> LightCollection {
        let mut lights = LightCollection::new();
        self.root.collect_lights(&mut lights);
        lights
    }

    pub(crate) fn collect_draws(&self) -> Vec<DrawItem> {
        let mut draws = Vec::new();
        self.root.collect_draws(&mut draws);
        draws
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color;
    use crate::geometry;
    use crate::material::{BasicMaterial, PhongMaterial};
    use crate::scene::{AmbientLight, Mesh, PointLight};
    use glamx::Vec3;

    #[test]
    fn added_meshes_show_up_in_the_draw_list() {
        let mut scene = Scene::new();
        let cube = Mesh::new(geometry::unit_cuboid(), PhongMaterial::default());
        let overlay = Mesh::new(geometry::unit_cuboid(), BasicMaterial::default());

        scene.add(&cube);
        scene.add(&overlay);
        assert_eq!(scene.collect_draws().len(), 2);

        scene.remove(&overlay);
        assert_eq!(scene.collect_draws().len(), 1);
    }

    #[test]
    fn draw_items_carry_propagated_transforms() {
        let mut scene = Scene::new();
        let cube = Mesh::new(geometry::unit_cuboid(), PhongMaterial::default());
        cube.set_position(Vec3::new(0.0, 0.0, 5.0));
        scene.add(&cube);

        scene.update_world_transforms();
        let draws = scene.collect_draws();
        assert_eq!(draws.len(), 1);
        assert_eq!(draws[0].transform.translation, Vec3::new(0.0, 0.0, 5.0));
    }

    #[test]
    fn auto_update_gates_propagation() {
        let mut scene = Scene::new();
        scene.auto_update = false;
        let cube = Mesh::new(geometry::unit_cuboid(), PhongMaterial::default());
        cube.set_position(Vec3::new(1.0, 0.0, 0.0));
        scene.add(&cube);

        scene.update_world_transforms();
        assert_eq!(
            scene.collect_draws()[0].transform.translation,
            Vec3::ZERO
        );

        scene.auto_update = true;
        scene.update_world_transforms();
        assert_eq!(
            scene.collect_draws()[0].transform.translation,
            Vec3::new(1.0, 0.0, 0.0)
        );
    }

    #[test]
    fn lights_are_collected_from_the_scene() {
        let mut scene = Scene::new();
        scene.add(&AmbientLight::new());
        let point = PointLight::new(50.0);
        point.set_position(Vec3::new(0.0, 2.0, 0.0));
        scene.add(&point);

        scene.update_world_transforms();
        let lights = scene.collect_lights();
        assert_eq!(lights.len(), 1);
        assert!(lights.ambient.length() > 0.0);
        assert_eq!(lights.lights[0].position, Vec3::new(0.0, 2.0, 0.0));
    }

    #[test]
    fn scene_supplements_default_off() {
        let scene = Scene::new();
        assert!(scene.background.is_none());
        assert!(scene.fog.is_none());
        assert!(scene.override_material.is_none());
        assert!(scene.auto_update);
    }

    #[test]
    fn set_background_stores_the_color() {
        let mut scene = Scene::new();
        scene.set_background(color::CORNFLOWER_BLUE);
        assert_eq!(scene.background, Some(color::CORNFLOWER_BLUE));
    }
}
