//! Configuration loading and validation for the pipeline.
//!
//! Values come from three layers: built-in defaults, an optional TOML file,
//! and command-line overrides applied by `cli`. Validation runs once on the
//! merged result, before the optimizer is started.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::PipelineError;

/// Smallest accepted raster edge; below this the legend and title overlap the plot.
pub const MIN_IMAGE_SIZE: u32 = 64;
/// Largest accepted raster edge; a square RGBA buffer of this size is 1 GiB.
pub const MAX_IMAGE_SIZE: u32 = 16384;

/// Rendering parameters for the coverage map.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct RenderConfig {
    /// Radius of the coverage disk drawn around each router.
    pub coverage_radius: f64,
    /// Maximum router-to-router distance for a direct link.
    pub comm_radius: f64,
    /// Edge length of the square deployment area, in world units.
    pub area_size: f64,
    /// Destination PNG.
    pub output_file: PathBuf,
    /// Edge length of the square raster, in pixels.
    pub image_size: u32,
    pub title: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            coverage_radius: 4.5,
            comm_radius: 4.5,
            area_size: 32.0,
            output_file: PathBuf::from("firefly_plot.png"),
            image_size: 1800,
            title: "Best Mesh Network Solution".to_string(),
        }
    }
}

/// How to launch the external placement optimizer.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct OptimizerConfig {
    /// Program followed by its arguments.
    pub command: Vec<String>,
    pub working_dir: Option<PathBuf>,
    /// Kill the optimizer if it runs longer than this.
    pub timeout_secs: Option<u64>,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            command: vec!["cargo".to_string(), "run".to_string()],
            working_dir: None,
            timeout_secs: None,
        }
    }
}

/// Complete configuration for one pipeline run.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// JSON document written by the optimizer.
    pub result_file: PathBuf,
    pub optimizer: OptimizerConfig,
    pub render: RenderConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            result_file: PathBuf::from("firefly_results.json"),
            optimizer: OptimizerConfig::default(),
            render: RenderConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Load configuration from a TOML file.
    ///
    /// Keys that are absent keep their defaults. Unknown keys are rejected so
    /// typos do not silently fall back to a default.
    pub fn load(config_path: &Path) -> Result<Self, PipelineError> {
        let content = std::fs::read_to_string(config_path)
            .map_err(|e| PipelineError::Configuration(format!("Failed to read config file {}: {}", config_path.display(), e)))?;

        Self::from_toml(&content)
            .map_err(|e| PipelineError::Configuration(format!("Failed to parse config file {}: {}", config_path.display(), e)))
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Validate the merged configuration.
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.result_file.as_os_str().is_empty() {
            return Err(PipelineError::Configuration("result-file must not be empty".to_string()));
        }
        self.optimizer.validate()?;
        self.render.validate()
    }
}

impl OptimizerConfig {
    pub fn validate(&self) -> Result<(), PipelineError> {
        match self.command.first() {
            None => return Err(PipelineError::Configuration("optimizer command must not be empty".to_string())),
            Some(program) if program.trim().is_empty() => {
                return Err(PipelineError::Configuration("optimizer program name must not be blank".to_string()));
            }
            Some(_) => {}
        }
        if self.timeout_secs == Some(0) {
            return Err(PipelineError::Configuration("optimizer timeout-secs must be positive".to_string()));
        }
        Ok(())
    }
}

impl RenderConfig {
    pub fn validate(&self) -> Result<(), PipelineError> {
        positive("coverage-radius", self.coverage_radius)?;
        positive("comm-radius", self.comm_radius)?;
        positive("area-size", self.area_size)?;

        if !(MIN_IMAGE_SIZE..=MAX_IMAGE_SIZE).contains(&self.image_size) {
            return Err(PipelineError::Configuration(format!(
                "image-size {} must be between {} and {} pixels",
                self.image_size, MIN_IMAGE_SIZE, MAX_IMAGE_SIZE
            )));
        }

        let is_png = self
            .output_file
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("png"));
        if !is_png {
            return Err(PipelineError::Configuration(format!(
                "output-file {} must have a .png extension",
                self.output_file.display()
            )));
        }
        Ok(())
    }
}

fn positive(name: &str, value: f64) -> Result<(), PipelineError> {
    // NaN fails the comparison as well
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(PipelineError::Configuration(format!("{} must be a positive number, got {}", name, value)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_reference_plot() {
        let config = PipelineConfig::default();
        assert_eq!(config.render.coverage_radius, 4.5);
        assert_eq!(config.render.comm_radius, 4.5);
        assert_eq!(config.render.area_size, 32.0);
        assert_eq!(config.render.output_file, PathBuf::from("firefly_plot.png"));
        assert_eq!(config.result_file, PathBuf::from("firefly_results.json"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = PipelineConfig::from_toml(
            r#"
            result-file = "out/results.json"

            [optimizer]
            command = ["./optimizer", "--iterations", "200"]
            timeout-secs = 60

            [render]
            comm-radius = 6.0
            "#,
        )
        .unwrap();
        assert_eq!(config.result_file, PathBuf::from("out/results.json"));
        assert_eq!(config.optimizer.command, vec!["./optimizer", "--iterations", "200"]);
        assert_eq!(config.optimizer.timeout_secs, Some(60));
        assert_eq!(config.render.comm_radius, 6.0);
        assert_eq!(config.render.coverage_radius, 4.5);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(PipelineConfig::from_toml("[render]\ncoverage-radios = 3.0\n").is_err());
    }

    #[test]
    fn non_positive_values_are_configuration_errors() {
        for (coverage, comm, area) in [(0.0, 4.5, 32.0), (4.5, -1.0, 32.0), (4.5, 4.5, 0.0), (f64::NAN, 4.5, 32.0)] {
            let render = RenderConfig {
                coverage_radius: coverage,
                comm_radius: comm,
                area_size: area,
                ..RenderConfig::default()
            };
            assert!(matches!(render.validate(), Err(PipelineError::Configuration(_))));
        }
    }

    #[test]
    fn output_must_be_png() {
        let render = RenderConfig {
            output_file: PathBuf::from("plot.jpg"),
            ..RenderConfig::default()
        };
        assert!(matches!(render.validate(), Err(PipelineError::Configuration(_))));

        let render = RenderConfig {
            output_file: PathBuf::from("PLOT.PNG"),
            ..RenderConfig::default()
        };
        assert!(render.validate().is_ok());
    }

    #[test]
    fn image_size_is_bounded() {
        for (size, ok) in [(MIN_IMAGE_SIZE - 1, false), (MIN_IMAGE_SIZE, true), (MAX_IMAGE_SIZE, true), (MAX_IMAGE_SIZE + 1, false), (u32::MAX, false)] {
            let render = RenderConfig {
                image_size: size,
                ..RenderConfig::default()
            };
            match render.validate() {
                Ok(()) => assert!(ok, "size {} accepted", size),
                Err(e) => {
                    assert!(!ok, "size {} rejected", size);
                    assert!(matches!(e, PipelineError::Configuration(_)));
                }
            }
        }
    }

    #[test]
    fn empty_command_and_zero_timeout_are_rejected() {
        let optimizer = OptimizerConfig {
            command: Vec::new(),
            ..OptimizerConfig::default()
        };
        assert!(optimizer.validate().is_err());

        let optimizer = OptimizerConfig {
            timeout_secs: Some(0),
            ..OptimizerConfig::default()
        };
        assert!(optimizer.validate().is_err());

        let optimizer = OptimizerConfig {
            timeout_secs: Some(u64::MAX),
            ..OptimizerConfig::default()
        };
        assert!(optimizer.validate().is_ok());
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = PipelineConfig::load(&dir.path().join("config.toml")).unwrap_err();
        assert!(matches!(err, PipelineError::Configuration(_)));
    }
}
