//! The classic starter scene: a royal-blue cube with a black wireframe
//! overlay, an ambient light and orbit controls.

use tre3d::prelude::*;

fn main() -> tre3d::Result<()> {
    env_logger::init();

    let mut canvas = Canvas::open("tre3d: cube")?;

    let mut scene = Scene::new();
    let mut camera = PerspectiveCamera::new();
    camera.position.z = 5.0;

    let mut renderer = Renderer::new(&canvas);

    let box_geometry = tre3d::geometry::cuboid(Vec3::ONE);

    let cube = Mesh::new(box_geometry.clone(), PhongMaterial::new(ROYAL_BLUE));
    scene.add(&cube);

    let mut wireframe_material = BasicMaterial::new(Color::from_hex(0x000000));
    wireframe_material.wireframe = true;
    let wireframe = Mesh::new(box_geometry, wireframe_material);
    scene.add(&wireframe);

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
