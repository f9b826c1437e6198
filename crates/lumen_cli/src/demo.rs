//! Procedural demo scene.

use lumen_core::{Camera, Light, Material, Mesh, Scene, SceneResult, Transform};
use lumen_math::{Color, Quat, Vec3};

/// A ground plane with a ring of cubes, one mirror cube in the middle, a sun
/// and a warm point light.
///
/// `rings` controls how many cubes surround the center (at least one).
pub fn demo_scene(rings: u32) -> SceneResult<Scene> {
    let mut scene = Scene::new("demo").with_background(Color::new(0.55, 0.7, 0.9)).with_camera(
        Camera::new()
            .with_position(Vec3::new(0.0, 5.0, 12.0), Vec3::new(0.0, 0.5, 0.0), Vec3::Y)
            .with_fov(40.0),
    );

    let ground = scene.add_mesh(Mesh::plane(40.0, 8))?;
    let cube = scene.add_mesh(Mesh::cube(1.0))?;

    let floor = scene.add_material(Material::new("floor", Color::splat(0.6)).with_roughness(0.9));
    let chrome = scene.add_material(Material::metal("chrome", Color::splat(0.95), 0.05));
    let palette = [
        Color::new(0.8, 0.2, 0.15),
        Color::new(0.2, 0.6, 0.25),
        Color::new(0.2, 0.3, 0.8),
        Color::new(0.9, 0.75, 0.2),
    ];
    let paints: Vec<usize> = palette
        .iter()
        .enumerate()
        .map(|(i, &albedo)| scene.add_material(Material::new(format!("paint{}", i), albedo).with_roughness(0.35)))
        .collect();

    scene.add_model(ground, floor, Transform::default())?;
    scene.add_model(
        cube,
        chrome,
        Transform::from_translation(Vec3::new(0.0, 1.0, 0.0)).with_scale(Vec3::splat(2.0)),
    )?;

    let count = rings.max(1) * 6;
    for i in 0..count {
        let angle = i as f32 / count as f32 * std::f32::consts::TAU;
        let radius = 3.5 + (i / 6) as f32 * 1.5;
        let position = Vec3::new(angle.cos() * radius, 0.5, angle.sin() * radius);
        let transform = Transform::from_translation(position).with_rotation(Quat::from_rotation_y(angle));
        scene.add_model(cube, paints[i as usize % paints.len()], transform)?;
    }

    scene.add_light(Light::directional(Color::new(1.0, 0.97, 0.9), 2.5, Vec3::new(-0.5, -1.0, -0.3)));
    scene.add_light(
        Light::point(Color::new(1.0, 0.7, 0.4), 30.0, Vec3::new(3.0, 4.0, 4.0)).with_attenuation(1.0, 0.1, 0.05),
    );

    Ok(scene)
}
