//! Placement topology: distances, router connectivity and client coverage.

pub mod connectivity;
pub mod coverage;
pub mod geometry;

pub use connectivity::ConnectivityGraph;
pub use coverage::DerivedMetrics;
