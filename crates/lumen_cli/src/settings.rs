//! JSON render settings.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use lumen_accel::BuildConfig;
use lumen_core::{Camera, ImageParameters, Light};
use lumen_math::Color;
use lumen_renderer::RenderConfig;
use serde::{Deserialize, Serialize};

/// Everything the `lumen` binary can read from a settings file.
///
/// Every field is optional in the file; missing ones keep their defaults and
/// the demo scene's camera, lights and background.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub render: RenderConfig,
    pub build: BuildConfig,
    pub image_parameters: ImageParameters,
    pub camera: Option<Camera>,
    pub lights: Option<Vec<Light>>,
    pub background: Option<Color>,
}

impl Settings {
    /// Load settings from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file {}", path.display()))?;
        let settings = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse settings file {}", path.display()))?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_accel::SplitStrategy;
    use lumen_core::LightKind;
    use lumen_renderer::TraversalMode;
    use std::io::Write;

    #[test]
    fn test_empty_settings_are_default() {
        let settings: Settings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings.render, RenderConfig::default());
        assert_eq!(settings.build, BuildConfig::default());
        assert!(settings.camera.is_none());
        assert!(settings.lights.is_none());
    }

    #[test]
    fn test_load_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "render": {{ "width": 64, "samples_per_pixel": 8, "traversal": "linear" }},
                "build": {{ "strategy": "median" }},
                "image_parameters": {{ "exposure": 0.5 }},
                "lights": [
                    {{ "color": [1.0, 1.0, 1.0], "intensity": 3.0,
                       "kind": {{ "type": "directional", "direction": [0.0, -1.0, 0.0] }} }}
                ],
                "background": [0.1, 0.2, 0.3]
            }}"#
        )
        .unwrap();

        let settings = Settings::load(file.path()).unwrap();
        assert_eq!(settings.render.width, 64);
        assert_eq!(settings.render.height, 450);
        assert_eq!(settings.render.samples_per_pixel, 8);
        assert_eq!(settings.render.traversal, TraversalMode::Linear);
        assert_eq!(settings.build.strategy, SplitStrategy::Median);
        assert_eq!(settings.image_parameters.exposure, 0.5);
        assert!(settings.image_parameters.raytraced_shadows);

        let lights = settings.lights.unwrap();
        assert_eq!(lights.len(), 1);
        assert!(matches!(lights[0].kind, LightKind::Directional { .. }));
        assert_eq!(settings.background, Some(Color::new(0.1, 0.2, 0.3)));
    }

    #[test]
    fn test_load_errors() {
        assert!(Settings::load(Path::new("/nonexistent/lumen.json")).is_err());

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        let err = Settings::load(file.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse"));
    }
}
