//! Scene graph nodes.

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

use glamx::{Pose3, Rot3, Vec3};

use crate::light::{CollectedLight, Light, LightCollection, LightKind};
use crate::material::Material;
use crate::resource::GpuGeometry;

static NODE_ID: AtomicU64 = AtomicU64::new(1);

/// The renderable payload of a node: a geometry paired with a material.
#[derive(Clone)]
pub(crate) struct Drawable {
    pub geometry: Rc<RefCell<GpuGeometry>>,
    pub material: Rc<RefCell<Material>>,
}

/// One mesh to draw, flattened out of the scene graph for a frame.
pub(crate) struct DrawItem {
    pub node_id: u64,
    pub transform: Pose3,
    pub scale: Vec3,
    pub geometry: Rc<RefCell<GpuGeometry>>,
    pub material: Rc<RefCell<Material>>,
}

/// The data contained by a [`SceneNode`].
struct NodeData {
    id: u64,
    local_transform: Pose3,
    local_scale: Vec3,
    world_transform: Pose3,
    world_scale: Vec3,
    visible: bool,
    drawable: Option<Drawable>,
    light: Option<Light>,
    children: Vec<SceneNode>,
    parent: Option<Weak<RefCell<NodeData>>>,
}

/// A node of the scene graph.
///
/// `SceneNode` is a cheap handle: cloning it yields another handle to the
/// same node, which is how meshes stay addressable after being added to a
/// scene. A node may group children and/or carry a drawable or a light.
#[derive(Clone)]
pub struct SceneNode {
    data: Rc<RefCell<NodeData>>,
}

impl Default for SceneNode {
    fn default() -> Self {
        SceneNode::empty()
    }
}

impl SceneNode {
    fn with_parts(drawable: Option<Drawable>, light: Option<Light>) -> SceneNode {
        SceneNode {
            data: Rc::new(RefCell::new(NodeData {
                id: NODE_ID.fetch_add(1, Ordering::Relaxed),
                local_transform: Pose3::IDENTITY,
                local_scale: Vec3::ONE,
                world_transform: Pose3::IDENTITY,
                world_scale: Vec3::ONE,
                visible: true,
                drawable,
                light,
                children: Vec::new(),
                parent: None,
            })),
        }
    }

    /// Creates an empty node with identity transform.
    pub fn empty() -> SceneNode {
        SceneNode::with_parts(None, None)
    }

    pub(crate) fn with_drawable(drawable: Drawable) -> SceneNode {
        SceneNode::with_parts(Some(drawable), None)
    }

    pub(crate) fn with_light(light: Light) -> SceneNode {
        SceneNode::with_parts(None, Some(light))
    }

    /// A process-unique identifier for this node.
    pub fn id(&self) -> u64 {
        self.data.borrow().id
    }

    /// Whether this node has no parent.
    pub fn is_root(&self) -> bool {
        self.data.borrow().parent.is_none()
    }

    /// The number of direct children.
    pub fn num_children(&self) -> usize {
        self.data.borrow().children.len()
    }

    /// Attaches `child` to this node.
    ///
    /// The child is detached from its previous parent first.
    pub fn add(&self, child: &SceneNode) {
        child.remove_from_parent();
        child.data.borrow_mut().parent = Some(Rc::downgrade(&self.data));
        self.data.borrow_mut().children.push(child.clone());
    }

    /// Detaches `child` from this node, if it is one of its children.
    pub fn remove(&self, child: &SceneNode) {
        let mut data = self.data.borrow_mut();
        if let Some(i) = data
            .children
            .iter()
            .rposition(|c| Rc::ptr_eq(&c.data, &child.data))
        {
            let removed = data.children.swap_remove(i);
            removed.data.borrow_mut().parent = None;
        }
    }

    /// Detaches this node from its parent, if any.
    pub fn remove_from_parent(&self) {
        let parent = self.data.borrow().parent.as_ref().and_then(Weak::upgrade);
        if let Some(parent) = parent {
            SceneNode { data: parent }.remove(self);
        }
    }

    /// Sets the node position relative to its parent.
    pub fn set_position(&self, position: Vec3) {
        self.data.borrow_mut().local_transform.translation = position;
    }

    /// The node position relative to its parent.
    pub fn position(&self) -> Vec3 {
        self.data.borrow().local_transform.translation
    }

    /// Sets the node orientation relative to its parent.
    pub fn set_rotation(&self, rotation: Rot3) {
        self.data.borrow_mut().local_transform.rotation = rotation;
    }

    /// The node orientation relative to its parent.
    pub fn rotation(&self) -> Rot3 {
        self.data.borrow().local_transform.rotation
    }

    /// Applies `rotation` in the node's local frame.
    pub fn rotate(&self, rotation: Rot3) {
        let mut data = self.data.borrow_mut();
        data.local_transform.rotation *= rotation;
    }

    /// Sets the per-axis scale.
    pub fn set_scale(&self, scale: Vec3) {
        self.data.borrow_mut().local_scale = scale;
    }

    /// The per-axis scale.
    pub fn scale(&self) -> Vec3 {
        self.data.borrow().local_scale
    }

    /// Shows or hides this node and its whole subtree.
    pub fn set_visible(&self, visible: bool) {
        self.data.borrow_mut().visible = visible;
    }

    /// Whether this node is visible.
    pub fn is_visible(&self) -> bool {
        self.data.borrow().visible
    }

    /// The world transform computed by the last propagation.
    pub fn world_transform(&self) -> Pose3 {
        self.data.borrow().world_transform
    }

    /// The world scale computed by the last propagation.
    pub fn world_scale(&self) -> Vec3 {
        self.data.borrow().world_scale
    }

    pub(crate) fn drawable(&self) -> Option<Drawable> {
        self.data.borrow().drawable.clone()
    }

    pub(crate) fn edit_light(&self, f: impl FnOnce(&mut Light)) {
        if let Some(light) = self.data.borrow_mut().light.as_mut() {
            f(light);
        }
    }

    /// Recomputes world transforms for this node and its subtree, treating
    /// this node as the root.
    pub fn propagate_transforms(&self) {
        self.data
            .borrow_mut()
            .propagate(Pose3::IDENTITY, Vec3::ONE);
    }

    pub(crate) fn collect_lights(&self, lights: &mut LightCollection) {
        let data = self.data.borrow();
        if data.visible {
            data.collect_lights(lights);
        }
    }

    pub(crate) fn collect_draws(&self, draws: &mut Vec<DrawItem>) {
        let data = self.data.borrow();
        if data.visible {
            data.collect_draws(draws);
        }
    }
}

impl NodeData {
    fn propagate(&mut self, transform: Pose3, scale: Vec3) {
        self.world_transform = transform * self.local_transform;
        self.world_scale = scale * self.local_scale;

        for child in &self.children {
            child
                .data
                .borrow_mut()
                .propagate(self.world_transform, self.world_scale);
        }
    }

    fn collect_lights(&self, lights: &mut LightCollection) {
        if let Some(light) = &self.light {
            if light.enabled {
                match light.kind {
                    LightKind::Ambient => lights.add_ambient(light.color, light.intensity),
                    _ => {
                        let local_direction = match light.kind {
                            LightKind::Directional(dir) => dir.normalize_or(Vec3::NEG_Z),
                            _ => Vec3::NEG_Z,
                        };
                        let _ = lights.add(CollectedLight {
                            kind: light.kind.clone(),
                            color: Vec3::new(light.color.r, light.color.g, light.color.b),
                            intensity: light.intensity,
                            position: self.world_transform.translation,
                            direction: self.world_transform.rotation * local_direction,
                        });
                    }
                }
            }
        }

        for child in &self.children {
            let data = child.data.borrow();
            if data.visible {
                data.collect_lights(lights);
            }
        }
    }

    fn collect_draws(&self, draws: &mut Vec<DrawItem>) {
        if let Some(drawable) = &self.drawable {
            draws.push(DrawItem {
                node_id: self.id,
                transform: self.world_transform,
                scale: self.world_scale,
                geometry: drawable.geometry.clone(),
                material: drawable.material.clone(),
            });
        }

        for child in &self.children {
            let data = child.data.borrow();
            if data.visible {
                data.collect_draws(draws);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color;

    const EPSILON: f32 = 0.0001;

    fn vec_approx_eq(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < EPSILON
    }

    #[test]
    fn world_transforms_compose_through_parents() {
        let root = SceneNode::empty();
        let parent = SceneNode::empty();
        let child = SceneNode::empty();

        root.add(&parent);
        parent.add(&child);

        parent.set_position(Vec3::new(1.0, 0.0, 0.0));
        parent.set_scale(Vec3::splat(2.0));
        child.set_position(Vec3::new(0.0, 3.0, 0.0));

        root.propagate_transforms();

        assert!(vec_approx_eq(
            child.world_transform().translation,
            Vec3::new(1.0, 3.0, 0.0)
        ));
        assert!(vec_approx_eq(child.world_scale(), Vec3::splat(2.0)));
    }

    #[test]
    fn handles_stay_usable_after_removal_and_readding() {
        let root = SceneNode::empty();
        let node = SceneNode::empty();

        root.add(&node);
        assert_eq!(root.num_children(), 1);
        assert!(!node.is_root());

        root.remove(&node);
        assert_eq!(root.num_children(), 0);
        assert!(node.is_root());

        root.add(&node);
        assert_eq!(root.num_children(), 1);
    }

    #[test]
    fn reparenting_detaches_from_the_old_parent() {
        let a = SceneNode::empty();
        let b = SceneNode::empty();
        let node = SceneNode::empty();

        a.add(&node);
        b.add(&node);

        assert_eq!(a.num_children(), 0);
        assert_eq!(b.num_children(), 1);
    }

    #[test]
    fn invisible_subtrees_are_skipped_by_light_collection() {
        let root = SceneNode::empty();
        let group = SceneNode::empty();
        let light = SceneNode::with_light(Light::ambient().with_intensity(1.0));

        root.add(&group);
        group.add(&light);

        let mut lights = LightCollection::new();
        root.collect_lights(&mut lights);
        assert!(lights.ambient.length() > 0.0);

        group.set_visible(false);
        let mut lights = LightCollection::new();
        root.collect_lights(&mut lights);
        assert_eq!(lights.ambient, Vec3::ZERO);
    }

    #[test]
    fn directional_lights_rotate_with_their_node() {
        let root = SceneNode::empty();
        let light = SceneNode::with_light(
            Light::directional(Vec3::NEG_Z).with_color(color::WHITE),
        );
        root.add(&light);
        light.set_rotation(Rot3::from_rotation_arc(Vec3::NEG_Z, Vec3::NEG_Y));

        root.propagate_transforms();
        let mut lights = LightCollection::new();
        root.collect_lights(&mut lights);

        assert_eq!(lights.len(), 1);
        assert!(vec_approx_eq(lights.lights[0].direction, Vec3::NEG_Y));
    }

    #[test]
    fn node_ids_are_unique() {
        let a = SceneNode::empty();
        let b = SceneNode::empty();
        assert_ne!(a.id(), b.id());
    }
}
