//! Command-line interface and configuration layering.

use clap::Parser;
use std::path::PathBuf;

use crate::common::PipelineConfig;
use crate::error::PipelineError;

/// Run a mesh-network placement optimizer and render its best solution.
#[derive(Parser, Debug)]
#[command(name = "wmn-viz", version, about)]
pub struct Cli {
    /// TOML configuration file.
    #[arg(short, long, env = "WMN_VIZ_CONFIG")]
    pub config: Option<PathBuf>,

    /// Result JSON written by the optimizer.
    #[arg(long)]
    pub result_file: Option<PathBuf>,

    /// Output PNG path.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Coverage disk radius drawn around each router.
    #[arg(long)]
    pub coverage_radius: Option<f64>,

    /// Maximum distance for a router-to-router link.
    #[arg(long)]
    pub comm_radius: Option<f64>,

    /// Edge length of the square deployment area.
    #[arg(long)]
    pub area_size: Option<f64>,

    /// Edge length of the output image in pixels.
    #[arg(long)]
    pub image_size: Option<u32>,

    /// Plot title.
    #[arg(long)]
    pub title: Option<String>,

    /// Render an existing result file without running the optimizer.
    #[arg(long)]
    pub skip_optimizer: bool,
}

impl Cli {
    /// Merge defaults, the optional config file and command-line overrides.
    ///
    /// The merged configuration is not validated here; the pipeline does
    /// that before its first stage.
    pub fn to_config(&self) -> Result<PipelineConfig, PipelineError> {
        let mut config = match &self.config {
            Some(path) => {
                log::debug!("Loading configuration from {}", path.display());
                PipelineConfig::load(path)?
            }
            None => PipelineConfig::default(),
        };

        if let Some(path) = &self.result_file {
            config.result_file = path.clone();
        }
        let render = &mut config.render;
        if let Some(path) = &self.output {
            render.output_file = path.clone();
        }
        if let Some(radius) = self.coverage_radius {
            render.coverage_radius = radius;
        }
        if let Some(radius) = self.comm_radius {
            render.comm_radius = radius;
        }
        if let Some(size) = self.area_size {
            render.area_size = size;
        }
        if let Some(size) = self.image_size {
            render.image_size = size;
        }
        if let Some(title) = &self.title {
            render.title = title.clone();
        }
        Ok(config)
    }
}
