//! Surface material parameters for physically based shading.

use lumen_math::Vec3;
use serde::{Deserialize, Serialize};

/// Metal/roughness material.
///
/// `f0` is the reflectance at normal incidence used by the Fresnel term;
/// dielectrics sit around 0.04, metals take their base color.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Material {
    /// Material name
    pub name: String,

    /// Diffuse/base color (linear RGB, 0-1)
    pub albedo: Vec3,

    /// Roughness factor (0=mirror, 1=fully rough)
    pub roughness: f32,

    /// Metallic factor (0=dielectric, 1=metal)
    pub metalness: f32,

    /// Fresnel reflectance at normal incidence
    pub f0: Vec3,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            name: String::new(),
            albedo: Vec3::splat(0.5), // Grey default
            roughness: 0.5,
            metalness: 0.0,
            f0: Vec3::splat(0.04),
        }
    }
}

impl Material {
    /// Create a dielectric material with a name and albedo.
    pub fn new(name: impl Into<String>, albedo: Vec3) -> Self {
        Self {
            name: name.into(),
            albedo,
            ..Default::default()
        }
    }

    /// Create a metal: `f0` takes the base color.
    pub fn metal(name: impl Into<String>, color: Vec3, roughness: f32) -> Self {
        Self {
            name: name.into(),
            albedo: color,
            roughness,
            metalness: 1.0,
            f0: color,
        }
    }

    /// Set the roughness (clamped to [0, 1]).
    pub fn with_roughness(mut self, roughness: f32) -> Self {
        self.roughness = roughness.clamp(0.0, 1.0);
        self
    }

    /// Set the metalness (clamped to [0, 1]).
    pub fn with_metalness(mut self, metalness: f32) -> Self {
        self.metalness = metalness.clamp(0.0, 1.0);
        self
    }

    /// Set the normal-incidence Fresnel reflectance.
    pub fn with_f0(mut self, f0: Vec3) -> Self {
        self.f0 = f0;
        self
    }

    /// Whether mirror reflections are traced for this material.
    pub fn is_reflective(&self) -> bool {
        self.roughness < 1.0
    }
}
