//! Client coverage and cross-checking of the optimizer's reported metrics.
//!
//! The optimizer reports SGC, NCMC and NCMCpR alongside the placement. All
//! three can be recomputed from the coordinates, so after loading we derive
//! them again and warn when the file disagrees. The check is advisory only.

use super::connectivity::ConnectivityGraph;
use super::geometry::within_radius;
use crate::common::result::NCMCPR_NO_ROUTERS;
use crate::common::{OptimizationResult, Point2D};

/// Relative tolerance when comparing the reported and derived NCMCpR.
const NCMCPR_TOLERANCE: f64 = 1e-9;

/// Number of clients within `coverage_radius` of at least one router.
pub fn covered_clients(routers: &[Point2D], clients: &[Point2D], coverage_radius: f64) -> usize {
    clients
        .iter()
        .filter(|client| routers.iter().any(|router| within_radius(router, client, coverage_radius)))
        .count()
}

/// Covered clients per router, with the no-router sentinel.
pub fn clients_per_router(ncmc: usize, router_count: usize) -> f64 {
    if router_count == 0 {
        NCMCPR_NO_ROUTERS
    } else {
        ncmc as f64 / router_count as f64
    }
}

/// Topology metrics derived from geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DerivedMetrics {
    pub sgc: usize,
    pub ncmc: usize,
    pub ncmcpr: f64,
}

impl DerivedMetrics {
    pub fn compute(result: &OptimizationResult, graph: &ConnectivityGraph, coverage_radius: f64) -> Self {
        let ncmc = covered_clients(&result.routers, &result.clients, coverage_radius);
        Self {
            sgc: graph.giant_component_size(),
            ncmc,
            ncmcpr: clients_per_router(ncmc, result.routers.len()),
        }
    }
}

/// One metric whose reported value differs from the derived one.
#[derive(Debug, Clone, PartialEq)]
pub struct Discrepancy {
    pub metric: &'static str,
    pub reported: String,
    pub derived: String,
}

/// Compare reported metrics against `derived`, logging each mismatch.
pub fn audit(result: &OptimizationResult, derived: &DerivedMetrics) -> Vec<Discrepancy> {
    let mut discrepancies = Vec::new();

    if result.sgc != derived.sgc {
        discrepancies.push(Discrepancy {
            metric: "sgc",
            reported: result.sgc.to_string(),
            derived: derived.sgc.to_string(),
        });
    }
    if result.ncmc != derived.ncmc {
        discrepancies.push(Discrepancy {
            metric: "ncmc",
            reported: result.ncmc.to_string(),
            derived: derived.ncmc.to_string(),
        });
    }
    let scale = result.ncmcpr.abs().max(derived.ncmcpr.abs()).max(1.0);
    if (result.ncmcpr - derived.ncmcpr).abs() > NCMCPR_TOLERANCE * scale {
        discrepancies.push(Discrepancy {
            metric: "ncmcpr",
            reported: result.ncmcpr.to_string(),
            derived: derived.ncmcpr.to_string(),
        });
    }

    for d in &discrepancies {
        log::warn!("Reported {} = {} but the placement yields {}", d.metric, d.reported, d.derived);
    }
    if discrepancies.is_empty() {
        log::debug!("Reported metrics agree with the placement geometry");
    }
    discrepancies
}
