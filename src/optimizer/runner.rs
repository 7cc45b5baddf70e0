//! Process-backed optimizer runner.
//!
//! Launches the configured command, inherits stdio so the optimizer's own
//! progress output stays visible, and blocks until the child exits. With a
//! timeout configured the child is polled and killed once the budget is spent.

use std::path::PathBuf;
use std::process::{Child, Command};
use std::thread;
use std::time::{Duration, Instant};

use super::{ExitStatus, Optimizer};
use crate::common::OptimizerConfig;

/// Poll interval while waiting on a child that has a timeout.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Runs the optimizer as an external process.
#[derive(Debug, Clone)]
pub struct ProcessOptimizer {
    program: String,
    args: Vec<String>,
    working_dir: Option<PathBuf>,
    timeout: Option<Duration>,
}

impl ProcessOptimizer {
    /// Build a runner from a validated optimizer configuration.
    ///
    /// An empty command yields an empty program name, which fails at launch.
    pub fn new(config: &OptimizerConfig) -> Self {
        let mut parts = config.command.iter().cloned();
        let program = parts.next().unwrap_or_default();
        let runner = Self {
            program,
            args: parts.collect(),
            working_dir: config.working_dir.clone(),
            timeout: None,
        };
        match config.timeout_secs {
            Some(secs) => runner.with_timeout(Duration::from_secs(secs)),
            None => runner,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Human-readable command line for logs.
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn wait_with_timeout(child: &mut Child, timeout: Duration) -> std::io::Result<ExitStatus> {
        // A budget too large to represent is the same as no budget
        let Some(deadline) = Instant::now().checked_add(timeout) else {
            log::debug!("Timeout {:?} is out of range, waiting without a deadline", timeout);
            return Ok(child.wait()?.into());
        };
        loop {
            if let Some(status) = child.try_wait()? {
                return Ok(status.into());
            }
            if Instant::now() >= deadline {
                log::warn!("Optimizer exceeded its {:?} budget, killing pid {}", timeout, child.id());
                // The child may have exited between try_wait and kill
                if let Err(e) = child.kill() {
                    log::debug!("Kill failed: {}", e);
                }
                child.wait()?;
                return Ok(ExitStatus::TimedOut(timeout));
            }
            thread::sleep(POLL_INTERVAL);
        }
    }
}

impl Optimizer for ProcessOptimizer {
    fn describe(&self) -> String {
        self.command_line()
    }

    fn run(&self) -> std::io::Result<ExitStatus> {
        let mut command = Command::new(&self.program);
        command.args(&self.args);
        if let Some(dir) = &self.working_dir {
            command.current_dir(dir);
        }

        let mut child = command.spawn()?;
        log::debug!("Optimizer started with pid {}", child.id());

        match self.timeout {
            Some(timeout) => Self::wait_with_timeout(&mut child, timeout),
            None => Ok(child.wait()?.into()),
        }
    }
}
