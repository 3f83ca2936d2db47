//! The scene graph: a mutable tree of meshes, lights and groups.

pub use self::node::SceneNode;
pub use self::objects::{
    AmbientLight, DirectionalLight, Group, Mesh, Object3d, PointLight,
};
pub use self::scene::{Fog, Scene};

pub(crate) mod node;
mod objects;
#[allow(clippy::module_inception)]
mod scene;
