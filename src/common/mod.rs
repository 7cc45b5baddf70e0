//! Data model and configuration shared by every pipeline stage.

pub mod config;
pub mod result;

pub use config::{OptimizerConfig, PipelineConfig, RenderConfig};
pub use result::{OptimizationResult, Point2D};
