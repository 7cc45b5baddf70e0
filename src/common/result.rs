//! Optimizer result loading, parsing, and validation logic.
//!
//! The optimizer writes a single JSON document describing the best placement
//! it found. This module turns that document into an [`OptimizationResult`]
//! and rejects anything that does not match the schema exactly: there is no
//! default-filling, a missing key is always an error.

use anyhow::Context;
use serde::{Deserialize, Deserializer};
use std::fs;
use std::path::Path;

use crate::error::PipelineError;

/// Value reported for NCMCpR when the placement has no routers.
pub const NCMCPR_NO_ROUTERS: f64 = 0.0;

/// Simple 2D point in world units.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(from = "[f64; 2]")]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<[f64; 2]> for Point2D {
    fn from(p: [f64; 2]) -> Self {
        Point2D { x: p[0], y: p[1] }
    }
}

/// Best placement found by one optimizer run, read-only after loading.
#[derive(Debug, Clone, PartialEq)]
pub struct OptimizationResult {
    pub routers: Vec<Point2D>,
    pub clients: Vec<Point2D>,
    pub best_fitness: f64,
    /// Size of the giant component among routers.
    pub sgc: usize,
    /// Number of covered mesh clients.
    pub ncmc: usize,
    /// Covered clients per router, [`NCMCPR_NO_ROUTERS`] when there are none.
    pub ncmcpr: f64,
}

/// On-disk layout written by the optimizer.
#[derive(Deserialize)]
struct ResultDocument {
    mesh_routers: Vec<Point2D>,
    mesh_clients: Vec<Point2D>,
    best_fitness: f64,
    sgc: usize,
    ncmc: usize,
    /// The producer serializes 0/0 as `null`. `deserialize_with` keeps the
    /// key mandatory even though the value is nullable.
    #[serde(deserialize_with = "nullable_f64")]
    ncmcpr: Option<f64>,
}

fn nullable_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<f64>::deserialize(deserializer)
}

/// Load and parse an optimizer result from a file.
///
/// # Parameters
///
/// * `path` - Path to the result JSON file
///
/// # Returns
///
/// The validated result, or `PipelineError::MalformedResult` if the file
/// cannot be read, is not valid JSON, or violates the schema.
pub fn load_result(path: &Path) -> Result<OptimizationResult, PipelineError> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))
        .map_err(|e| PipelineError::MalformedResult(format!("{:#}", e)))?;

    parse_result(&data).map_err(|e| match e {
        PipelineError::MalformedResult(msg) => PipelineError::MalformedResult(format!("{}: {}", path.display(), msg)),
        other => other,
    })
}

/// Parse and validate a result document held in memory.
pub fn parse_result(data: &str) -> Result<OptimizationResult, PipelineError> {
    let document: ResultDocument = serde_json::from_str(data)
        .context("Invalid result document")
        .map_err(|e| PipelineError::MalformedResult(format!("{:#}", e)))?;

    validate_result(document).map_err(PipelineError::MalformedResult)
}

/// Check the invariants serde cannot express and build the result model.
fn validate_result(document: ResultDocument) -> Result<OptimizationResult, String> {
    for (idx, router) in document.mesh_routers.iter().enumerate() {
        if !router.is_finite() {
            return Err(format!("mesh_routers[{}] has a non-finite coordinate", idx));
        }
    }
    for (idx, client) in document.mesh_clients.iter().enumerate() {
        if !client.is_finite() {
            return Err(format!("mesh_clients[{}] has a non-finite coordinate", idx));
        }
    }

    if !document.best_fitness.is_finite() {
        return Err("best_fitness must be finite".to_string());
    }

    if document.sgc > document.mesh_routers.len() {
        return Err(format!(
            "sgc {} exceeds the number of mesh routers ({})",
            document.sgc,
            document.mesh_routers.len()
        ));
    }
    if document.ncmc > document.mesh_clients.len() {
        return Err(format!(
            "ncmc {} exceeds the number of mesh clients ({})",
            document.ncmc,
            document.mesh_clients.len()
        ));
    }

    let ncmcpr = match document.ncmcpr {
        Some(value) if value.is_finite() => value,
        Some(value) => return Err(format!("ncmcpr {} is not finite", value)),
        None if document.mesh_routers.is_empty() => NCMCPR_NO_ROUTERS,
        None => return Err("ncmcpr is null although mesh routers are present".to_string()),
    };

    Ok(OptimizationResult {
        routers: document.mesh_routers,
        clients: document.mesh_clients,
        best_fitness: document.best_fitness,
        sgc: document.sgc,
        ncmc: document.ncmc,
        ncmcpr,
    })
}
