//! Render settings: built-in defaults, an optional JSON file, then
//! command-line overrides.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use prism_math::Vec3;
use prism_renderer::{BvhOptions, RenderConfig};
use serde::{Deserialize, Serialize};

use crate::options::CliOptions;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub width: u32,
    pub height: u32,
    /// Horizontal field of view in degrees
    pub fov: f32,
    pub output: PathBuf,
    /// OBJ mesh added to the scene through a BVH, if any
    pub mesh: Option<PathBuf>,
    pub mesh_scale: Vec3,
    pub mesh_offset: Vec3,
    pub render: RenderConfig,
    pub bvh: BvhOptions,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            width: 512,
            height: 384,
            fov: 90.0,
            output: PathBuf::from("result.ppm"),
            mesh: Some(PathBuf::from("models/bunny.obj")),
            // Negative z mirrors the model to face the camera
            mesh_scale: Vec3::new(25.0, 25.0, -25.0),
            mesh_offset: Vec3::new(0.0, 0.0, 5.0),
            render: RenderConfig::default(),
            bvh: BvhOptions::default(),
        }
    }
}

impl Settings {
    /// Read settings from a JSON file. Missing fields keep their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file {}", path.display()))?;
        let settings = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse settings file {}", path.display()))?;

        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Settings file named by `--config` (or defaults), with flags applied on top.
    pub fn resolve(options: &CliOptions) -> Result<Self> {
        let mut settings = match &options.config {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        settings.apply(options);
        Ok(settings)
    }

    pub fn apply(&mut self, options: &CliOptions) {
        if let Some(width) = options.width {
            self.width = width;
        }
        if let Some(height) = options.height {
            self.height = height;
        }
        if let Some(fov) = options.fov {
            self.fov = fov;
        }
        if let Some(output) = &options.output {
            self.output = output.clone();
        }
        if let Some(mesh) = &options.mesh {
            self.mesh = Some(mesh.clone());
        }
        if let Some(threads) = options.threads {
            self.render.threads = Some(threads);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let settings: Settings =
            serde_json::from_str(r#"{"width": 64, "render": {"max_depth": 2}, "mesh": null}"#).unwrap();

        assert_eq!(settings.width, 64);
        assert_eq!(settings.height, 384);
        assert_eq!(settings.render.max_depth, 2);
        assert_eq!(settings.render.shadow_bias, 0.01);
        assert_eq!(settings.mesh, None);
        assert_eq!(settings.bvh, BvhOptions::default());
    }

    #[test]
    fn test_flags_override_file_values() {
        let mut settings = Settings {
            width: 64,
            ..Default::default()
        };
        settings.apply(&CliOptions {
            width: Some(128),
            threads: Some(3),
            output: Some(PathBuf::from("frame.ppm")),
            ..Default::default()
        });

        assert_eq!(settings.width, 128);
        assert_eq!(settings.render.threads, Some(3));
        assert_eq!(settings.output, PathBuf::from("frame.ppm"));
        assert_eq!(settings.fov, 90.0);
    }

    #[test]
    fn test_load_from_file() {
        let dir = std::env::temp_dir().join(format!("prism_settings_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("prism.json");
        std::fs::write(&path, r#"{"fov": 45.0, "bvh": {"max_leaf_size": 6}}"#).unwrap();

        let settings = Settings::resolve(&CliOptions {
            config: Some(path),
            height: Some(10),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(settings.fov, 45.0);
        assert_eq!(settings.bvh.max_leaf_size, 6);
        assert_eq!(settings.height, 10);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(Settings::load(Path::new("/nonexistent/prism.json")).is_err());
    }
}
