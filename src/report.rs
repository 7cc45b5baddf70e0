//! Metrics reporter: prints the optimizer's scalar metrics, one per line.

use std::io::Write;

use crate::common::OptimizationResult;
use crate::error::PipelineError;

/// Write best fitness, SGC, NCMC and NCMCpR to `out`, in that order.
///
/// Values use their default text conversion; nothing is rounded.
pub fn write_metrics<W: Write>(result: &OptimizationResult, out: &mut W) -> Result<(), PipelineError> {
    write_lines(result, out)
        .and_then(|_| out.flush())
        .map_err(|e| PipelineError::ReportWrite(e.to_string()))
}

fn write_lines<W: Write>(result: &OptimizationResult, out: &mut W) -> std::io::Result<()> {
    writeln!(out, "Best Fitness Score: {}", result.best_fitness)?;
    writeln!(out, "Size of Giant Component (SGC): {}", result.sgc)?;
    writeln!(out, "Number of Covered Mesh Clients (NCMC): {}", result.ncmc)?;
    writeln!(out, "Number of Covered Mesh Clients per Router (NCMCpR): {}", result.ncmcpr)
}
