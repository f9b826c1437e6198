//! Lumen command-line renderer.
//!
//! Renders the procedural demo scene to an image file. Settings come from an
//! optional JSON file; command-line flags override it.

mod demo;
mod settings;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use lumen_accel::SplitStrategy;
use lumen_renderer::{RayTracer, TraversalMode};

use crate::settings::Settings;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Strategy {
    Median,
    Sah,
}

impl From<Strategy> for SplitStrategy {
    fn from(strategy: Strategy) -> Self {
        match strategy {
            Strategy::Median => SplitStrategy::Median,
            Strategy::Sah => SplitStrategy::Sah,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Traversal {
    Bvh,
    Linear,
}

impl From<Traversal> for TraversalMode {
    fn from(traversal: Traversal) -> Self {
        match traversal {
            Traversal::Bvh => TraversalMode::Bvh,
            Traversal::Linear => TraversalMode::Linear,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "lumen")]
#[command(about = "Lumen - BVH accelerated CPU ray tracer", long_about = None)]
struct Cli {
    /// Output image (.png or .ppm)
    #[arg(short, long, value_name = "FILE", default_value = "lumen.png")]
    output: PathBuf,

    /// JSON settings file
    #[arg(short, long, value_name = "FILE")]
    settings: Option<PathBuf>,

    /// Image width in pixels
    #[arg(long)]
    width: Option<u32>,

    /// Image height in pixels
    #[arg(long)]
    height: Option<u32>,

    /// Samples per pixel
    #[arg(long)]
    spp: Option<u32>,

    /// Seed for jittered sampling
    #[arg(long)]
    seed: Option<u64>,

    /// BVH split strategy
    #[arg(long, value_enum)]
    strategy: Option<Strategy>,

    /// SAH split candidates per axis
    #[arg(long)]
    sah_candidates: Option<usize>,

    /// Ray/mesh intersection mode
    #[arg(long, value_enum)]
    traversal: Option<Traversal>,

    /// Rings of cubes around the center of the demo scene
    #[arg(long, default_value_t = 2)]
    rings: u32,

    /// Disable shadow rays
    #[arg(long)]
    no_shadows: bool,

    /// Disable mirror reflections
    #[arg(long)]
    no_reflections: bool,

    /// Exposure multiplier
    #[arg(long)]
    exposure: Option<f32>,
}

impl Cli {
    /// Apply command-line overrides on top of file settings.
    fn apply(&self, settings: &mut Settings) {
        let render = &mut settings.render;
        if let Some(width) = self.width {
            render.width = width;
        }
        if let Some(height) = self.height {
            render.height = height;
        }
        if let Some(spp) = self.spp {
            render.samples_per_pixel = spp.max(1);
        }
        if let Some(seed) = self.seed {
            render.seed = seed;
        }
        if let Some(traversal) = self.traversal {
            render.traversal = traversal.into();
        }

        if let Some(strategy) = self.strategy {
            settings.build.strategy = strategy.into();
        }
        if let Some(candidates) = self.sah_candidates {
            settings.build.sah_candidates = candidates;
        }

        let params = &mut settings.image_parameters;
        if self.no_shadows {
            params.raytraced_shadows = false;
        }
        if self.no_reflections {
            params.raytraced_reflections = false;
        }
        if let Some(exposure) = self.exposure {
            params.use_exposure = true;
            params.exposure = exposure;
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let cli = Cli::parse();

    let mut settings = match &cli.settings {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    cli.apply(&mut settings);

    let mut scene = demo::demo_scene(cli.rings).context("Failed to build demo scene")?;
    if let Some(camera) = settings.camera.take() {
        scene.camera = camera;
    }
    if let Some(lights) = settings.lights.take() {
        scene.lights = lights;
    }
    if let Some(background) = settings.background {
        scene.background = background;
    }
    scene.image_parameters = settings.image_parameters.clone();

    log::info!(
        "Scene '{}': {} models, {} triangles, {} lights",
        scene.name,
        scene.model_count(),
        scene.total_triangle_count(),
        scene.lights.len()
    );
    scene.rebuild_bvhs(&settings.build).context("Failed to build BVHs")?;

    let tracer = RayTracer::new(settings.render.clone());
    let image = tracer.render(&scene);

    image
        .save(&cli.output)
        .with_context(|| format!("Failed to save {}", cli.output.display()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["lumen"]);
        assert_eq!(cli.output, PathBuf::from("lumen.png"));
        assert_eq!(cli.rings, 2);

        let mut settings = Settings::default();
        cli.apply(&mut settings);
        assert_eq!(settings.render, Default::default());
        assert!(settings.image_parameters.raytraced_shadows);
    }

    #[test]
    fn test_cli_overrides_settings() {
        let cli = Cli::parse_from([
            "lumen",
            "--width",
            "320",
            "--spp",
            "0",
            "--strategy",
            "median",
            "--traversal",
            "linear",
            "--no-shadows",
            "--exposure",
            "1.5",
            "-o",
            "out.ppm",
        ]);

        let mut settings = Settings::default();
        settings.render.height = 100;
        cli.apply(&mut settings);

        assert_eq!(settings.render.width, 320);
        assert_eq!(settings.render.height, 100);
        assert_eq!(settings.render.samples_per_pixel, 1);
        assert_eq!(settings.render.traversal, TraversalMode::Linear);
        assert_eq!(settings.build.strategy, SplitStrategy::Median);
        assert!(!settings.image_parameters.raytraced_shadows);
        assert!(settings.image_parameters.raytraced_reflections);
        assert_eq!(settings.image_parameters.exposure, 1.5);
        assert_eq!(cli.output, PathBuf::from("out.ppm"));
    }

    #[test]
    fn test_cli_rejects_unknown_strategy() {
        assert!(Cli::try_parse_from(["lumen", "--strategy", "octree"]).is_err());
    }

    #[test]
    fn test_render_demo_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("demo.ppm");

        let mut scene = demo::demo_scene(1).unwrap();
        scene.rebuild_bvhs(&Default::default()).unwrap();
        let config = lumen_renderer::RenderConfig::default().with_resolution(32, 18);
        RayTracer::new(config).render(&scene).save(&output).unwrap();

        assert!(std::fs::metadata(&output).unwrap().len() > 32 * 18 * 3);
    }
}
