//! Lumen Core - Scene description for the Lumen ray tracer.
//!
//! This crate provides:
//!
//! - **Geometry**: `Mesh` with validation, normals and an owned BVH
//! - **Shading inputs**: `Material`, `Light` (directional and point)
//! - **Scene**: `Scene` owning meshes, materials, models, lights and camera
//!
//! # Example
//!
//! ```ignore
//! use lumen_core::{Material, Mesh, Scene, Transform};
//!
//! let mut scene = Scene::new("demo");
//! let cube = scene.add_mesh(Mesh::cube(1.0))?;
//! let grey = scene.add_material(Material::default());
//! scene.add_model(cube, grey, Transform::default())?;
//! scene.rebuild_bvhs(&Default::default())?;
//! ```

pub mod camera;
pub mod error;
pub mod light;
pub mod material;
pub mod mesh;
pub mod scene;

// Re-export commonly used types
pub use camera::Camera;
pub use error::{MeshError, SceneError, SceneResult};
pub use light::{Light, LightKind};
pub use material::Material;
pub use mesh::Mesh;
pub use scene::{ImageParameters, Model, Scene, Transform};
