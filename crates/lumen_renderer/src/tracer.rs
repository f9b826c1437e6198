//! Whitted-style ray tracer over a [`Scene`].
//!
//! One primary ray per sample, direct lighting from every light with optional
//! shadow rays, and a single mirror bounce for non-rough materials. Pixels
//! are traced in parallel with rayon; the scene is only read during a frame.

use std::time::Instant;

use lumen_accel::{bvh_intersection_with_stats, linear_intersection, Hit, TraversalStats};
use lumen_core::{Light, Material, Mesh, Scene};
use lumen_math::{Color, Mat3, Mat4, Mat4Ext, Ray, UVec3, Vec2, Vec3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::brdf::{CookTorrance, RadianceEvaluator};
use crate::color::{background_to_linear, post_process};
use crate::output::ImageBuffer;

/// Offset along the normal for secondary ray origins.
pub const SURFACE_BIAS: f32 = 0.001;

/// How rays are intersected with each mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraversalMode {
    /// Through the mesh BVH (falls back to linear for meshes without one)
    #[default]
    Bvh,
    /// Test every triangle of every mesh
    Linear,
}

/// Render configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub width: u32,
    pub height: u32,
    /// 1 traces through the pixel center; more averages jittered samples
    pub samples_per_pixel: u32,
    pub traversal: TraversalMode,
    /// Seed for jittered sampling
    pub seed: u64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 450,
            samples_per_pixel: 1,
            traversal: TraversalMode::Bvh,
            seed: 0,
        }
    }
}

impl RenderConfig {
    /// Set image resolution.
    pub fn with_resolution(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Set samples per pixel (at least one).
    pub fn with_samples(mut self, samples_per_pixel: u32) -> Self {
        self.samples_per_pixel = samples_per_pixel.max(1);
        self
    }

    pub fn with_traversal(mut self, traversal: TraversalMode) -> Self {
        self.traversal = traversal;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// Per-model matrices, computed once per frame.
struct ModelSpace {
    matrix: Mat4,
    inverse: Mat4,
    normal_matrix: Mat3,
}

/// A shaded point in world space.
struct Surface<'a> {
    position: Vec3,
    normal: Vec3,
    material: &'a Material,
}

/// Everything shared by the pixels of one frame.
struct Frame<'a, E> {
    scene: &'a Scene,
    evaluator: &'a E,
    traversal: TraversalMode,
    spaces: Vec<ModelSpace>,
    eye: Vec3,
    background: Color,
}

impl<'a, E: RadianceEvaluator> Frame<'a, E> {
    fn new(scene: &'a Scene, evaluator: &'a E, traversal: TraversalMode) -> Self {
        let spaces = scene
            .models
            .iter()
            .map(|model| {
                let matrix = model.model_matrix();
                ModelSpace {
                    matrix,
                    inverse: matrix.inverse(),
                    normal_matrix: matrix.normal_matrix(),
                }
            })
            .collect();

        Self {
            scene,
            evaluator,
            traversal,
            spaces,
            eye: scene.camera.eye(),
            background: background_to_linear(scene.background, &scene.image_parameters),
        }
    }

    fn warn_missing_bvhs(&self) {
        if self.traversal != TraversalMode::Bvh {
            return;
        }
        for (i, mesh) in self.scene.meshes.iter().enumerate() {
            if mesh.bvh().is_none() {
                log::warn!("Mesh {} has no BVH, falling back to linear traversal", i);
            }
        }
    }

    /// Nearest hit over all models. `t` is the world ray parameter; position
    /// and normal are in the hit model's local space.
    fn intersect(&self, ray: &Ray, stats: &mut TraversalStats) -> Hit {
        let mut hit = Hit::new();

        for (index, (model, space)) in self.scene.models.iter().zip(&self.spaces).enumerate() {
            let mesh = self.scene.model_mesh(model);
            let local = ray.transformed(&space.inverse);

            let improved = match (self.traversal, mesh.bvh()) {
                (TraversalMode::Bvh, Some(bvh)) => {
                    bvh_intersection_with_stats(&local, bvh, &mesh.positions, &mut hit, stats)
                }
                _ => {
                    stats.triangle_tests += mesh.triangle_count();
                    linear_intersection(&local, &mesh.positions, &mesh.triangles, &mut hit)
                }
            };

            if improved {
                hit.mesh_index = index;
            }
        }

        hit
    }

    /// Vertex indices of the triangle a hit refers to.
    fn hit_triangle(&self, mesh: &Mesh, triangle_index: usize) -> UVec3 {
        match (self.traversal, mesh.bvh()) {
            (TraversalMode::Bvh, Some(bvh)) => bvh.triangle(triangle_index),
            _ => mesh.triangles[triangle_index],
        }
    }

    /// Move a local-space hit to world space with its shading normal.
    fn surface(&self, hit: &Hit) -> Surface<'a> {
        let model = &self.scene.models[hit.mesh_index];
        let space = &self.spaces[hit.mesh_index];
        let mesh = self.scene.model_mesh(model);

        let triangle = self.hit_triangle(mesh, hit.triangle_index);
        let local_normal = mesh.interpolated_normal(triangle, hit.position);

        Surface {
            position: space.matrix.transform_point3(hit.position),
            normal: (space.normal_matrix * local_normal).normalize_or_zero(),
            material: self.scene.model_material(model),
        }
    }

    /// Whether something blocks the path from `surface` to `light`.
    fn occluded(&self, surface: &Surface, light: &Light, stats: &mut TraversalStats) -> bool {
        let direction = light.wi(surface.position);

        // Light below the surface: the cosine term already zeroes it
        if direction.dot(surface.normal) <= 0.0 {
            return false;
        }

        let shadow_ray = Ray::new(surface.position + surface.normal * SURFACE_BIAS, direction);
        let shadow_hit = self.intersect(&shadow_ray, stats);
        shadow_hit.hit && shadow_hit.t < light.distance(surface.position)
    }

    /// Direct lighting at a surface seen from direction `wo`.
    fn direct_lighting(&self, surface: &Surface, wo: Vec3, stats: &mut TraversalStats) -> Color {
        let shadows = self.scene.image_parameters.raytraced_shadows;
        let mut color = Color::ZERO;

        for light in &self.scene.lights {
            if shadows && self.occluded(surface, light, stats) {
                continue;
            }
            color += self
                .evaluator
                .radiance(surface.material, light, surface.normal, wo, surface.position);
        }

        color
    }

    /// Linear radiance along a primary ray.
    fn shade(&self, ray: &Ray, stats: &mut TraversalStats) -> Color {
        let hit = self.intersect(ray, stats);
        if !hit.hit {
            return self.background;
        }

        let surface = self.surface(&hit);
        let wo = (self.eye - surface.position).normalize_or_zero();
        let mut color = self.direct_lighting(&surface, wo, stats);

        if self.scene.image_parameters.raytraced_reflections && surface.material.is_reflective() {
            color += self.reflection(ray, &surface, stats);
        }

        color
    }

    /// Single mirror bounce, shaded with direct lighting only.
    fn reflection(&self, ray: &Ray, surface: &Surface, stats: &mut TraversalStats) -> Color {
        let d = ray.direction();
        let n = surface.normal;
        let reflected_dir = d - 2.0 * d.dot(n) * n;
        let reflected_ray = Ray::new(surface.position + n * SURFACE_BIAS, reflected_dir);

        let reflected_hit = self.intersect(&reflected_ray, stats);
        let reflected_color = if reflected_hit.hit {
            let reflected = self.surface(&reflected_hit);
            let wo = (surface.position - reflected.position).normalize_or_zero();
            self.direct_lighting(&reflected, wo, stats)
        } else {
            self.background
        };

        reflected_color * self.evaluator.reflectance(surface.material, reflected_dir, -d, n)
    }
}

/// Seed of a pixel's sample generator (SplitMix64 of seed and index).
fn pixel_seed(seed: u64, index: usize) -> u64 {
    let mut z = seed ^ (index as u64).wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// The ray tracer: a render configuration plus a radiance evaluator.
#[derive(Debug, Clone)]
pub struct RayTracer<E = CookTorrance> {
    config: RenderConfig,
    evaluator: E,
}

impl RayTracer<CookTorrance> {
    /// Ray tracer shading with the Cook-Torrance BRDF.
    pub fn new(config: RenderConfig) -> Self {
        Self::with_evaluator(config, CookTorrance)
    }
}

impl<E: RadianceEvaluator> RayTracer<E> {
    /// Ray tracer with a custom radiance evaluator.
    pub fn with_evaluator(config: RenderConfig, evaluator: E) -> Self {
        Self { config, evaluator }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Render the scene to a post-processed image.
    pub fn render(&self, scene: &Scene) -> ImageBuffer {
        self.render_with_stats(scene).0
    }

    /// Render the scene and report the intersection work done.
    pub fn render_with_stats(&self, scene: &Scene) -> (ImageBuffer, TraversalStats) {
        let width = self.config.width;
        let height = self.config.height;
        log::info!(
            "Start ray tracing at {}x{} resolution ({} spp, {:?} traversal)...",
            width,
            height,
            self.config.samples_per_pixel,
            self.config.traversal
        );
        let start = Instant::now();

        let mut camera = scene.camera.clone();
        camera.initialize(width, height);
        let frame = Frame::new(scene, &self.evaluator, self.config.traversal);
        frame.warn_missing_bvhs();

        let mut image = ImageBuffer::new(width, height);
        let row = width.max(1) as usize;

        let stats = image
            .pixels
            .par_iter_mut()
            .enumerate()
            .map(|(i, pixel)| {
                let x = (i % row) as u32;
                let y = (i / row) as u32;
                let mut stats = TraversalStats::default();

                let color = if self.config.samples_per_pixel <= 1 {
                    frame.shade(&camera.ray_at(x, y, Vec2::splat(0.5)), &mut stats)
                } else {
                    let mut rng = StdRng::seed_from_u64(pixel_seed(self.config.seed, i));
                    let mut sum = Color::ZERO;
                    for _ in 0..self.config.samples_per_pixel {
                        let offset = Vec2::new(rng.gen(), rng.gen());
                        sum += frame.shade(&camera.ray_at(x, y, offset), &mut stats);
                    }
                    sum / self.config.samples_per_pixel as f32
                };

                *pixel = post_process(color, &scene.image_parameters);
                stats
            })
            .reduce(TraversalStats::default, |a, b| a + b);

        log::info!("Ray tracing executed in {:.2?}", start.elapsed());
        log::debug!(
            "Traversal: {} nodes visited, {} box tests, {} triangle tests",
            stats.nodes_visited,
            stats.aabb_tests,
            stats.triangle_tests
        );

        (image, stats)
    }

    /// Nearest hit of a world-space ray, for picking and debugging.
    ///
    /// Position and normal of the returned hit are in world space (the
    /// normal is the shading normal); `t` is the world ray parameter.
    /// Prefer [`RayTracer::trace_rays`] for more than a handful of rays.
    pub fn trace_ray(&self, scene: &Scene, ray: &Ray) -> Hit {
        let frame = Frame::new(scene, &self.evaluator, self.config.traversal);
        Self::world_hit(&frame, ray)
    }

    /// [`RayTracer::trace_ray`] for a batch of rays, sharing the per-model
    /// matrices across the batch.
    pub fn trace_rays(&self, scene: &Scene, rays: &[Ray]) -> Vec<Hit> {
        let frame = Frame::new(scene, &self.evaluator, self.config.traversal);
        frame.warn_missing_bvhs();
        rays.iter().map(|ray| Self::world_hit(&frame, ray)).collect()
    }

    fn world_hit(frame: &Frame<'_, E>, ray: &Ray) -> Hit {
        let mut stats = TraversalStats::default();
        let mut hit = frame.intersect(ray, &mut stats);

        if hit.hit {
            let surface = frame.surface(&hit);
            hit.position = surface.position;
            hit.normal = surface.normal;
        }
        hit
    }
}
