//! Lumen Renderer - CPU ray tracing of Lumen scenes.
//!
//! Traces one primary ray per sample through every pixel, intersecting each
//! model through its mesh BVH, and shades hits with direct lighting, optional
//! shadow rays and a single mirror bounce.
//!
//! Shading goes through the [`RadianceEvaluator`] trait; [`CookTorrance`] is
//! the default implementation.

mod brdf;
mod color;
mod output;
mod tracer;

pub use brdf::{CookTorrance, RadianceEvaluator};
pub use color::{aces_film, background_to_linear, color_to_rgb8, linear_to_srgb, post_process, srgb_to_linear, to_byte};
pub use output::{backend_for_path, ImageBackend, ImageBuffer, OutputError, PngBackend, PpmBackend};
pub use tracer::{RayTracer, RenderConfig, TraversalMode, SURFACE_BIAS};

/// Re-export common math types from lumen_math
pub use lumen_math::{Color, Ray, Vec3};
