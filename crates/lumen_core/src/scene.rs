//! Scene description: the single owner of everything a frame needs.
//!
//! Models refer to meshes and materials by index, so meshes (and their
//! BVHs) are shared between models without reference counting.

use lumen_accel::BuildConfig;
use lumen_math::{Aabb, Color, Mat4, Mat4Ext, Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::camera::Camera;
use crate::error::{SceneError, SceneResult};
use crate::light::Light;
use crate::material::Material;
use crate::mesh::Mesh;

/// Transform components that can be composed into a matrix.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Transform {
    /// Translation
    pub translation: Vec3,

    /// Rotation (as quaternion)
    pub rotation: Quat,

    /// Scale
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    /// Create a new transform with only translation.
    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Default::default()
        }
    }

    /// Create a new transform from a 4x4 matrix.
    ///
    /// Decomposes the matrix into translation, rotation, and scale.
    pub fn from_matrix(matrix: Mat4) -> Self {
        let (scale, rotation, translation) = matrix.to_scale_rotation_translation();
        Self {
            translation,
            rotation,
            scale,
        }
    }

    /// Set the rotation.
    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    /// Set the scale.
    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    /// Convert to a 4x4 transformation matrix.
    ///
    /// Order: Scale -> Rotate -> Translate (SRT)
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }
}

/// A placed mesh: mesh index, material index and transform.
#[derive(Clone, Debug, PartialEq)]
pub struct Model {
    /// Index into `Scene::meshes`
    pub mesh: usize,
    /// Index into `Scene::materials`
    pub material: usize,
    pub transform: Transform,
}

impl Model {
    /// Get the 4x4 model matrix (local to world).
    pub fn model_matrix(&self) -> Mat4 {
        self.transform.to_matrix()
    }
}

/// Per-image switches for secondary rays and color correction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageParameters {
    /// Trace shadow rays towards every light
    pub raytraced_shadows: bool,
    /// Trace one mirror bounce for materials with roughness < 1
    pub raytraced_reflections: bool,
    /// Master switch for the three corrections below
    pub color_correct: bool,
    pub use_exposure: bool,
    pub exposure: f32,
    /// ACES filmic tone mapping
    pub use_tone_mapping: bool,
    /// Encode output as sRGB (and decode the background from sRGB)
    pub use_srgb: bool,
}

impl Default for ImageParameters {
    fn default() -> Self {
        Self {
            raytraced_shadows: true,
            raytraced_reflections: true,
            color_correct: true,
            use_exposure: true,
            exposure: 1.0,
            use_tone_mapping: true,
            use_srgb: true,
        }
    }
}

/// A complete scene: geometry, materials, lights, camera and image settings.
#[derive(Clone, Debug, Default)]
pub struct Scene {
    /// Scene name
    pub name: String,

    /// Mesh geometry, shared by models
    pub meshes: Vec<Mesh>,

    /// Materials used in the scene
    pub materials: Vec<Material>,

    /// Placed meshes
    pub models: Vec<Model>,

    pub lights: Vec<Light>,

    pub camera: Camera,

    /// Color of rays that escape the scene (sRGB when `use_srgb` is on)
    pub background: Color,

    pub image_parameters: ImageParameters,
}

impl Scene {
    /// Create an empty scene.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Add a mesh to the scene and return its index.
    ///
    /// The mesh is validated first; its BVH is built by `rebuild_bvhs`.
    pub fn add_mesh(&mut self, mesh: Mesh) -> SceneResult<usize> {
        mesh.validate()?;
        let id = self.meshes.len();
        self.meshes.push(mesh);
        Ok(id)
    }

    /// Add a material to the scene and return its index.
    pub fn add_material(&mut self, material: Material) -> usize {
        let id = self.materials.len();
        self.materials.push(material);
        id
    }

    /// Place a mesh with a material and return the model index.
    pub fn add_model(&mut self, mesh: usize, material: usize, transform: Transform) -> SceneResult<usize> {
        if mesh >= self.meshes.len() {
            return Err(SceneError::InvalidMesh(mesh));
        }
        if material >= self.materials.len() {
            return Err(SceneError::InvalidMaterial(material));
        }

        let id = self.models.len();
        self.models.push(Model {
            mesh,
            material,
            transform,
        });
        Ok(id)
    }

    /// Add a light source.
    pub fn add_light(&mut self, light: Light) {
        self.lights.push(light);
    }

    /// Set the camera.
    pub fn with_camera(mut self, camera: Camera) -> Self {
        self.camera = camera;
        self
    }

    /// Set the background color.
    pub fn with_background(mut self, color: Color) -> Self {
        self.background = color;
        self
    }

    /// Mesh of a model.
    pub fn model_mesh(&self, model: &Model) -> &Mesh {
        &self.meshes[model.mesh]
    }

    /// Material of a model.
    pub fn model_material(&self, model: &Model) -> &Material {
        &self.materials[model.material]
    }

    /// Build every mesh's BVH from scratch with `config`.
    pub fn rebuild_bvhs(&mut self, config: &BuildConfig) -> SceneResult<()> {
        for mesh in &mut self.meshes {
            mesh.rebuild_bvh(config)?;
        }
        log::info!(
            "Rebuilt {} BVHs ({} triangles across {} models)",
            self.meshes.len(),
            self.total_triangle_count(),
            self.models.len()
        );
        Ok(())
    }

    /// Get total triangle count across all models.
    pub fn total_triangle_count(&self) -> usize {
        self.models
            .iter()
            .filter_map(|model| self.meshes.get(model.mesh))
            .map(Mesh::triangle_count)
            .sum()
    }

    pub fn model_count(&self) -> usize {
        self.models.len()
    }

    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    /// Compute the world-space bounding box of all models.
    pub fn world_bounds(&self) -> Aabb {
        let mut bounds = Aabb::empty();
        for model in &self.models {
            if let Some(mesh) = self.meshes.get(model.mesh) {
                let world = model.model_matrix().transform_aabb(&mesh.bounds);
                bounds = Aabb::surrounding(&bounds, &world);
            }
        }
        bounds
    }
}
