//! Ordered pipeline: validate, invoke, load, analyze, report, render.
//!
//! Each stage takes immutable input from the previous one. The first error
//! stops the run; nothing downstream of a failed stage executes. Metrics are
//! reported before the image is written, so a `RenderWrite` failure happens
//! after the metric lines are already on the output stream.

use std::io::Write;

use crate::common::{PipelineConfig, result};
use crate::error::PipelineError;
use crate::optimizer::{self, Optimizer};
use crate::render;
use crate::report;
use crate::topology::{ConnectivityGraph, DerivedMetrics, coverage};

/// What a successful run produced, for logging by the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub routers: usize,
    pub clients: usize,
    pub links: usize,
    pub derived: DerivedMetrics,
    /// Reported metrics that disagree with the placement geometry.
    pub discrepancies: usize,
}

/// Run the full pipeline once.
///
/// # Parameters
///
/// * `config` - Merged configuration; validated here before anything runs
/// * `optimizer` - Optimizer to invoke, or `None` to use an existing result file
/// * `out` - Destination for the metric lines
pub fn run<W: Write>(config: &PipelineConfig, optimizer: Option<&dyn Optimizer>, out: &mut W) -> Result<RunSummary, PipelineError> {
    config.validate()?;

    match optimizer {
        Some(optimizer) => optimizer::invoke(optimizer)?,
        None => log::info!("Skipping optimizer, using existing {}", config.result_file.display()),
    }

    let result = result::load_result(&config.result_file)?;
    log::info!(
        "Loaded {} routers and {} clients from {}",
        result.routers.len(),
        result.clients.len(),
        config.result_file.display()
    );

    let graph = ConnectivityGraph::build(&result.routers, config.render.comm_radius);
    let derived = DerivedMetrics::compute(&result, &graph, config.render.coverage_radius);
    let discrepancies = coverage::audit(&result, &derived).len();
    let isolated = (0..graph.node_count()).filter(|&i| graph.degree(i) == 0).count();
    log::debug!("{} links, {} isolated routers", graph.edges().len(), isolated);

    report::write_metrics(&result, out)?;
    render::render(&result, &graph, &config.render)?;

    Ok(RunSummary {
        routers: graph.node_count(),
        clients: result.clients.len(),
        links: graph.edges().len(),
        derived,
        discrepancies,
    })
}
