//! Scene extras: background color, linear fog, several lights, and an
//! override material toggled with the space bar.

use tre3d::prelude::*;

fn main() -> tre3d::Result<()> {
    env_logger::init();

    let mut canvas = Canvas::open("tre3d: fog")?;

    let mut scene = Scene::new();
    scene.set_background(Color::from_hex(0x10141c));
    scene.fog = Some(Fog::new(Color::from_hex(0x10141c), 4.0, 14.0));

    let mut camera = PerspectiveCamera::new();
    camera.position = Vec3::new(0.0, 2.0, 7.0);

    let mut renderer = Renderer::new(&canvas);

    let ground = Mesh::new(
        tre3d::geometry::cuboid(Vec3::new(12.0, 0.2, 12.0)),
        PhongMaterial::new(GRAY),
    );
    ground.set_position(Vec3::new(0.0, -1.0, 0.0));
    scene.add(&ground);

    // A row of spheres marching into the fog.
    for i in 0..6 {
        let sphere = Mesh::new(
            tre3d::geometry::sphere(1.0, 24, 12),
            PhongMaterial::new(CORNFLOWER_BLUE),
        );
        sphere.set_position(Vec3::new(0.0, 0.0, -2.0 * i as f32));
        scene.add(&sphere);
    }

    let ambient = AmbientLight::new();
    ambient.set_intensity(0.15);
    scene.add(&ambient);

    let sun = DirectionalLight::new(Vec3::new(-1.0, -1.0, -0.5));
    sun.set_intensity(0.8);
    scene.add(&sun);

    let lamp = PointLight::new(20.0);
    lamp.set_color(ORANGE);
    lamp.set_intensity(2.0);
    lamp.set_position(Vec3::new(2.0, 2.0, 2.0));
    scene.add(&lamp);

    let mut controls = OrbitControls::new(&camera);
    let mut flat = false;

    while !canvas.should_close() {
        renderer.render(&scene, &mut camera, &mut canvas)?;

        canvas.poll_events();
        for event in canvas.events() {
            if let WindowEvent::Key(Key::Space, Action::Release, _) = event {
                flat = !flat;
                scene.override_material = if flat {
                    let mut m = BasicMaterial::new(WHITE);
                    m.wireframe = true;
                    Some(m.into())
                } else {
                    None
                };
            }
        }
        controls.update(&canvas, &mut camera);
        canvas.swap_buffers();
    }

    Ok(())
}
