//! Radiance evaluation: the tracer's only view of surface shading.

use std::f32::consts::PI;

use lumen_core::{Light, Material};
use lumen_math::{Color, Vec3};

/// Computes how much light a surface sends towards the viewer.
///
/// The tracer decides visibility (shadows, reflections); the evaluator only
/// answers local shading questions. All vectors are world space and unit
/// length, pointing away from the surface.
pub trait RadianceEvaluator: Send + Sync {
    /// Radiance leaving `point` towards `wo` due to `light`, ignoring
    /// occlusion.
    fn radiance(&self, material: &Material, light: &Light, normal: Vec3, wo: Vec3, point: Vec3) -> Color;

    /// Cosine-weighted BRDF for light arriving from `wi`, used to weight
    /// the color seen along a mirror reflection.
    fn reflectance(&self, material: &Material, wi: Vec3, wo: Vec3, normal: Vec3) -> Color;
}

/// Lower bound on the GGX `alpha`; a perfect mirror has a zero-width lobe.
const MIN_ALPHA: f32 = 1e-3;

/// Cook-Torrance microfacet BRDF with a Lambert diffuse lobe.
///
/// GGX (Trowbridge-Reitz) distribution, Schlick Fresnel and Schlick-GGX
/// geometry with `alpha = roughness^2` (floored at `MIN_ALPHA`). The diffuse
/// lobe is scaled by `1 - metalness`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CookTorrance;

impl CookTorrance {
    /// Trowbridge-Reitz normal distribution.
    fn distribution(n: Vec3, wh: Vec3, alpha: f32) -> f32 {
        let a2 = alpha * alpha;
        let n_dot_h = n.dot(wh);
        let denom = 1.0 + (a2 - 1.0) * n_dot_h * n_dot_h;
        a2 / (PI * denom * denom)
    }

    /// Schlick approximation of the Fresnel term.
    fn fresnel(wi: Vec3, wh: Vec3, f0: Color) -> Color {
        f0 + (Color::ONE - f0) * (1.0 - wi.dot(wh).max(0.0)).powi(5)
    }

    fn geometry_schlick(n: Vec3, w: Vec3, alpha: f32) -> f32 {
        let k = alpha * (2.0 / PI).sqrt();
        let n_dot_w = n.dot(w);
        n_dot_w / (n_dot_w * (1.0 - k) + k)
    }

    fn geometry(n: Vec3, wi: Vec3, wo: Vec3, alpha: f32) -> f32 {
        Self::geometry_schlick(n, wi, alpha) * Self::geometry_schlick(n, wo, alpha)
    }

    /// BRDF times the cosine term.
    ///
    /// Zero when either direction is below the surface: the specular
    /// denominator would otherwise vanish or flip sign.
    pub fn evaluate(&self, material: &Material, wi: Vec3, wo: Vec3, n: Vec3) -> Color {
        let n_dot_wi = n.dot(wi);
        let n_dot_wo = n.dot(wo);
        if n_dot_wi <= 0.0 || n_dot_wo <= 0.0 {
            return Color::ZERO;
        }

        let fd = material.albedo / PI;

        let wh = (wi + wo).normalize_or_zero();
        let alpha = (material.roughness * material.roughness).max(MIN_ALPHA);

        let d = Self::distribution(n, wh, alpha);
        let f = Self::fresnel(wi, wh, material.f0);
        let g = Self::geometry(n, wi, wo, alpha);

        let fs = f * (d * g / (4.0 * n_dot_wi * n_dot_wo));

        (fd * (1.0 - material.metalness) + fs) * n_dot_wi
    }
}

impl RadianceEvaluator for CookTorrance {
    fn radiance(&self, material: &Material, light: &Light, normal: Vec3, wo: Vec3, point: Vec3) -> Color {
        let wi = light.wi(point);
        self.evaluate(material, wi, wo, normal) * light.intensity(point) * light.color
    }

    fn reflectance(&self, material: &Material, wi: Vec3, wo: Vec3, normal: Vec3) -> Color {
        self.evaluate(material, wi, wo, normal)
    }
}
