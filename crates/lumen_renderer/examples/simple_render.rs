//! Simple ray tracer example.
//!
//! Renders a mirror floor with a few cubes and saves `output.png`.

use lumen_core::{Camera, Light, Material, Mesh, Scene, SceneResult, Transform};
use lumen_renderer::{Color, RayTracer, RenderConfig, Vec3};

fn build_scene() -> SceneResult<Scene> {
    let mut scene = Scene::new("simple").with_background(Color::new(0.5, 0.7, 1.0)).with_camera(
        Camera::new()
            .with_position(Vec3::new(6.0, 4.0, 8.0), Vec3::new(0.0, 0.5, 0.0), Vec3::Y)
            .with_fov(40.0),
    );

    let floor = scene.add_mesh(Mesh::plane(30.0, 1))?;
    let cube = scene.add_mesh(Mesh::cube(1.0))?;

    let mirror = scene.add_material(Material::metal("mirror", Color::splat(0.9), 0.05));
    let red = scene.add_material(Material::new("red", Color::new(0.8, 0.1, 0.1)).with_roughness(0.4));
    let gold = scene.add_material(Material::metal("gold", Color::new(1.0, 0.78, 0.34), 0.3));

    scene.add_model(floor, mirror, Transform::default())?;
    scene.add_model(cube, red, Transform::from_translation(Vec3::new(-1.0, 0.5, 0.0)))?;
    scene.add_model(cube, gold, Transform::from_translation(Vec3::new(1.0, 0.75, -1.0)).with_scale(Vec3::splat(1.5)))?;

    scene.add_light(Light::directional(Color::ONE, 2.0, Vec3::new(-1.0, -2.0, -1.0)));
    scene.add_light(Light::point(Color::new(1.0, 0.9, 0.8), 20.0, Vec3::new(2.0, 4.0, 3.0)).with_attenuation(1.0, 0.0, 0.1));

    scene.rebuild_bvhs(&Default::default())?;
    Ok(scene)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let scene = build_scene()?;
    let tracer = RayTracer::new(RenderConfig::default().with_samples(4));
    let image = tracer.render(&scene);

    image.save(std::path::Path::new("output.png"))?;
    println!("Saved to output.png");
    Ok(())
}
