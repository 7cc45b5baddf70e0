//! Pipeline error taxonomy and process exit codes.
//!
//! Every failure is fatal. Each variant names the stage that raised it so the
//! diagnostic printed by `main` tells the operator where the run stopped.

/// Exit codes returned by the binary for each failure kind.
pub mod exit_codes {
    pub const ERROR_CONFIG: i32 = 2;
    pub const ERROR_OPTIMIZER: i32 = 3;
    pub const ERROR_MALFORMED_RESULT: i32 = 4;
    pub const ERROR_RENDER_WRITE: i32 = 5;
    pub const ERROR_REPORT_WRITE: i32 = 6;
}

/// Fatal error raised by one of the pipeline stages.
#[derive(Debug)]
pub enum PipelineError {
    /// Non-positive radius or area size, bad output path, unreadable config.
    Configuration(String),
    /// The optimizer could not be started or exited unsuccessfully.
    OptimizerExecution(String),
    /// The result document is missing, unparsable or violates its schema.
    MalformedResult(String),
    /// The rendered image could not be written to the output path.
    RenderWrite(String),
    /// The metrics could not be written to the output stream.
    ReportWrite(String),
}

impl PipelineError {
    /// Name of the stage that failed, used as the diagnostic prefix.
    pub fn stage(&self) -> &'static str {
        match self {
            PipelineError::Configuration(_) => "configuration",
            PipelineError::OptimizerExecution(_) => "optimizer",
            PipelineError::MalformedResult(_) => "result loader",
            PipelineError::RenderWrite(_) => "renderer",
            PipelineError::ReportWrite(_) => "metrics reporter",
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            PipelineError::Configuration(_) => exit_codes::ERROR_CONFIG,
            PipelineError::OptimizerExecution(_) => exit_codes::ERROR_OPTIMIZER,
            PipelineError::MalformedResult(_) => exit_codes::ERROR_MALFORMED_RESULT,
            PipelineError::RenderWrite(_) => exit_codes::ERROR_RENDER_WRITE,
            PipelineError::ReportWrite(_) => exit_codes::ERROR_REPORT_WRITE,
        }
    }
}

impl std::fmt::Display for PipelineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelineError::Configuration(msg) => write!(f, "[{}] Configuration error: {}", self.stage(), msg),
            PipelineError::OptimizerExecution(msg) => write!(f, "[{}] Optimizer execution failed: {}", self.stage(), msg),
            PipelineError::MalformedResult(msg) => write!(f, "[{}] Malformed result: {}", self.stage(), msg),
            PipelineError::RenderWrite(msg) => write!(f, "[{}] Failed to write image: {}", self.stage(), msg),
            PipelineError::ReportWrite(msg) => write!(f, "[{}] Failed to write metrics: {}", self.stage(), msg),
        }
    }
}

impl std::error::Error for PipelineError {}
