//! Optimizer invocation stage.
//!
//! The placement search is an external program. The pipeline only needs one
//! capability from it: run to completion and report how it exited. That
//! capability is the [`Optimizer`] trait, so tests can substitute a fake that
//! never spawns a process.

pub mod runner;

use std::time::Duration;

use crate::error::PipelineError;

pub use runner::ProcessOptimizer;

/// How an optimizer run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    /// The process exited with this code.
    Exited(i32),
    /// The process was terminated by a signal and has no exit code.
    Terminated,
    /// The process was killed after exceeding the configured timeout.
    TimedOut(Duration),
}

impl ExitStatus {
    pub fn success(&self) -> bool {
        matches!(self, ExitStatus::Exited(0))
    }
}

impl From<std::process::ExitStatus> for ExitStatus {
    fn from(status: std::process::ExitStatus) -> Self {
        match status.code() {
            Some(code) => ExitStatus::Exited(code),
            None => ExitStatus::Terminated,
        }
    }
}

impl std::fmt::Display for ExitStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExitStatus::Exited(code) => write!(f, "exit code {}", code),
            ExitStatus::Terminated => write!(f, "terminated by signal"),
            ExitStatus::TimedOut(timeout) => write!(f, "timed out after {:?}", timeout),
        }
    }
}

/// External placement search, run once per pipeline execution.
pub trait Optimizer {
    /// Short description for log lines, usually the command line.
    fn describe(&self) -> String;

    /// Block until the optimizer finishes.
    ///
    /// `Err` means the optimizer could not be started at all.
    fn run(&self) -> std::io::Result<ExitStatus>;
}

/// Run the optimizer once and turn anything but a clean exit into an error.
///
/// There is no retry: a failed run aborts the pipeline before the result
/// file is touched.
pub fn invoke(optimizer: &dyn Optimizer) -> Result<(), PipelineError> {
    let description = optimizer.describe();
    log::info!("Running optimizer: {}", description);

    let status = optimizer
        .run()
        .map_err(|e| PipelineError::OptimizerExecution(format!("failed to start `{}`: {}", description, e)))?;

    if !status.success() {
        return Err(PipelineError::OptimizerExecution(format!("`{}` finished with {}", description, status)));
    }

    log::info!("Optimizer finished successfully");
    Ok(())
}


#[cfg(test)]
mod tests {
    use super::fake::FakeOptimizer;
    use super::*;

    #[test]
    fn zero_exit_is_success() {
        let optimizer = FakeOptimizer::exiting(0);
        assert!(invoke(&optimizer).is_ok());
        assert_eq!(optimizer.calls.get(), 1);
    }

    #[test]
    fn non_zero_exit_is_fatal_and_not_retried() {
        let optimizer = FakeOptimizer::exiting(1);
        let err = invoke(&optimizer).unwrap_err();
        assert!(matches!(err, PipelineError::OptimizerExecution(ref msg) if msg.contains("exit code 1")));
        assert_eq!(optimizer.calls.get(), 1);
    }

    #[test]
    fn launch_failure_is_fatal() {
        let err = invoke(&FakeOptimizer::failing_to_launch()).unwrap_err();
        assert!(matches!(err, PipelineError::OptimizerExecution(ref msg) if msg.contains("failed to start")));
    }

    #[test]
    fn signal_and_timeout_are_failures() {
        assert!(invoke(&FakeOptimizer::with_status(ExitStatus::Terminated)).is_err());
        assert!(invoke(&FakeOptimizer::with_status(ExitStatus::TimedOut(Duration::from_secs(1)))).is_err());
    }
}
