//! Coverage renderer.
//!
//! - `text`: embedded font for titles, legend and tick labels
//! - `map`: layout and layer order of the coverage map
//!
//! The image is rasterized completely in memory and written in one step at
//! the end, so a failure earlier in the pipeline never leaves a file behind.

pub mod map;
pub mod text;

use image::ImageFormat;

use crate::common::{OptimizationResult, RenderConfig};
use crate::error::PipelineError;
use crate::topology::ConnectivityGraph;

/// Render the placement and write it as PNG to `config.output_file`.
pub fn render(result: &OptimizationResult, graph: &ConnectivityGraph, config: &RenderConfig) -> Result<(), PipelineError> {
    let image = map::draw(result, graph, config);

    image.save_with_format(&config.output_file, ImageFormat::Png).map_err(|e| {
        PipelineError::RenderWrite(format!("{}: {}", config.output_file.display(), e))
    })?;

    log::info!(
        "Coverage map written to {} ({}x{} px)",
        config.output_file.display(),
        image.width(),
        image.height()
    );
    Ok(())
}
