/*!
# tre3d

A small, three.js-flavored scene graph and renderer for Rust, built on
[wgpu](https://docs.rs/wgpu) and [winit](https://docs.rs/winit).

**tre3d** is not a game engine. It is for the program that wants a window, a
couple of shapes, a light and a camera without first assembling a render
graph: build a [`Scene`](scene::Scene), add meshes and lights, and loop.

```no_run
use tre3d::prelude::*;

fn main() -> tre3d::Result<()> {
    let mut canvas = Canvas::open("tre3d: cube")?;

    let mut scene = Scene::new();
    let mut camera = PerspectiveCamera::new();
    camera.position.z = 5.0;
    let mut renderer = Renderer::new(&canvas);

    let cube = Mesh::new(tre3d::geometry::cuboid(Vec3::ONE), PhongMaterial::new(ROYAL_BLUE));
    scene.add(&cube);
    scene.add(&AmbientLight::new());

    let mut controls = OrbitControls::new(&camera);

    while !canvas.should_close() {
        renderer.render(&scene, &mut camera, &mut canvas)?;
        canvas.poll_events();
        controls.update(&canvas, &mut camera);
        canvas.swap_buffers();
    }
    Ok(())
}
```

The heavy lifting stays where it belongs: windowing and input come from
winit, rasterization from wgpu. This crate only adds the scene tree, the
materials and the frame loop glue, with one-liner defaults wherever
possible.
*/
#![allow(clippy::too_many_arguments)]

pub use glamx;

pub use crate::error::{Error, Result};

pub mod camera;
pub mod color;
pub mod context;
pub mod error;
pub mod event;
pub mod geometry;
pub mod light;
pub mod material;
pub mod renderer;
pub mod resource;
pub mod scene;
pub mod window;

pub mod prelude {
    //! The usual imports for a tre3d program.
    pub use crate::camera::{Camera, OrbitControls, PerspectiveCamera};
    pub use crate::color::*;
    pub use crate::error::{Error, Result};
    pub use crate::event::{Action, Key, Modifiers, MouseButton, WindowEvent};
    pub use crate::geometry::BufferGeometry;
    pub use crate::light::Light;
    pub use crate::material::{BasicMaterial, Material, PhongMaterial};
    pub use crate::renderer::Renderer;
    pub use crate::resource::{Texture, TextureWrapping};
    pub use crate::scene::{
        AmbientLight, DirectionalLight, Fog, Group, Mesh, Object3d, PointLight, Scene, SceneNode,
    };
    pub use crate::window::{Canvas, CanvasSetup};
    pub use glamx::{Mat3, Mat4, Pose3, Quat, Rot3, Vec2, Vec3};
}
