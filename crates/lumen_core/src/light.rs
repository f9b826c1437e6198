//! Light sources.

use lumen_math::{Color, Vec3};
use serde::{Deserialize, Serialize};

use crate::scene::Transform;

/// Kind-specific light parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LightKind {
    /// Infinitely distant light shining along `direction`.
    Directional { direction: Vec3 },
    /// Light at the transform's translation, attenuated by
    /// `1 / (constant + linear * d + quadratic * d^2)`.
    Point {
        attenuation_constant: f32,
        attenuation_linear: f32,
        attenuation_quadratic: f32,
    },
}

/// A light source: shared color/intensity/transform plus its kind.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Light {
    pub color: Color,
    /// Base intensity before attenuation
    pub intensity: f32,
    #[serde(default)]
    pub transform: Transform,
    pub kind: LightKind,
}

impl Light {
    /// Directional light; `direction` is normalised.
    pub fn directional(color: Color, intensity: f32, direction: Vec3) -> Self {
        Self {
            color,
            intensity,
            transform: Transform::default(),
            kind: LightKind::Directional {
                direction: direction.normalize_or_zero(),
            },
        }
    }

    /// Point light at `position` with constant attenuation of 1.
    pub fn point(color: Color, intensity: f32, position: Vec3) -> Self {
        Self {
            color,
            intensity,
            transform: Transform::from_translation(position),
            kind: LightKind::Point {
                attenuation_constant: 1.0,
                attenuation_linear: 0.0,
                attenuation_quadratic: 0.0,
            },
        }
    }

    /// Set the attenuation coefficients (point lights only).
    pub fn with_attenuation(mut self, constant: f32, linear: f32, quadratic: f32) -> Self {
        match &mut self.kind {
            LightKind::Point {
                attenuation_constant,
                attenuation_linear,
                attenuation_quadratic,
            } => {
                *attenuation_constant = constant;
                *attenuation_linear = linear;
                *attenuation_quadratic = quadratic;
            }
            LightKind::Directional { .. } => {
                log::warn!("Ignoring attenuation on a directional light");
            }
        }
        self
    }

    /// World position of the light (the transform's translation).
    pub fn position(&self) -> Vec3 {
        self.transform.translation
    }

    /// Unit direction from `point` towards the light.
    ///
    /// Directional lights read from a settings file may carry a non-unit
    /// direction, so it is normalised here as well.
    pub fn wi(&self, point: Vec3) -> Vec3 {
        match &self.kind {
            LightKind::Directional { direction } => -direction.normalize_or_zero(),
            LightKind::Point { .. } => (self.position() - point).normalize_or_zero(),
        }
    }

    /// Distance from `point` to the light (infinite for directional lights).
    pub fn distance(&self, point: Vec3) -> f32 {
        match &self.kind {
            LightKind::Directional { .. } => f32::INFINITY,
            LightKind::Point { .. } => self.position().distance(point),
        }
    }

    /// Intensity arriving at `point`.
    pub fn intensity(&self, point: Vec3) -> f32 {
        match &self.kind {
            LightKind::Directional { .. } => self.intensity,
            LightKind::Point {
                attenuation_constant,
                attenuation_linear,
                attenuation_quadratic,
            } => {
                let d = self.distance(point);
                self.intensity / (attenuation_constant + attenuation_linear * d + attenuation_quadratic * d * d)
            }
        }
    }
}
