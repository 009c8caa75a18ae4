//! Error types for pipeline construction and execution.
//!
//! Construction-time errors (`FaultError`) are local and immediate: a missing
//! required argument fails before any command string is built. Execution-time
//! errors (`ExecutionError`) are detected by the pipeline executor while
//! applying a descriptor's contract and surface upward unchanged.

use std::time::Duration;
use thiserror::Error;

/// Precondition violations raised while building a pipeline.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FaultError {
    #[error("required argument `{key}` missing from fault specification")]
    MissingArgument { key: &'static str },
}

/// Failures raised by a `CommandRunner` before any output could be captured.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to launch command: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("command did not complete within {0:?}")]
    Timeout(Duration),

    #[error("remote session error: {0}")]
    Session(String),
}

/// Failures raised while executing a pipeline step.
#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("could not reach the target: {0}")]
    Transport(#[from] TransportError),

    /// Nonzero exit status on a step with `ignore_exit_code == false`.
    #[error("command exited with status {exit_code}")]
    CommandFailed {
        exit_code: i32,
        output: String,
        /// Catalog diagnosis when the output matched a known failure.
        diagnosis: Option<String>,
    },

    /// Exit status acceptable, but no expected output matched after
    /// exhausting the step's retries.
    #[error("no expected output matched after {attempts} attempt(s)")]
    OutputMismatch {
        output: String,
        attempts: u32,
        diagnosis: Option<String>,
    },

    /// The remediation verification step exhausted its polling budget without
    /// observing completion or agent shutdown. The fault may still be active.
    #[error("remediation not confirmed after {attempts} poll attempt(s)")]
    RemediationIncomplete { attempts: u32 },

    #[error("invalid output extraction pattern `{pattern}`")]
    InvalidExtractionPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

impl ExecutionError {
    /// The catalog explanation attached to this failure, if its output text
    /// matched a known failure signature.
    pub fn diagnosis(&self) -> Option<&str> {
        match self {
            ExecutionError::CommandFailed { diagnosis, .. }
            | ExecutionError::OutputMismatch { diagnosis, .. } => diagnosis.as_deref(),
            _ => None,
        }
    }

    /// Whether retrying the whole pipeline later could plausibly succeed.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ExecutionError::Transport(TransportError::Timeout(_))
                | ExecutionError::RemediationIncomplete { .. }
        )
    }

    /// Coarse category for programmatic handling and log fields.
    pub fn error_category(&self) -> &'static str {
        match self {
            ExecutionError::Transport(_) => "TRANSPORT",
            ExecutionError::CommandFailed { .. } => "EXIT_CODE",
            ExecutionError::OutputMismatch { .. } => "OUTPUT",
            ExecutionError::RemediationIncomplete { .. } => "REMEDIATION",
            ExecutionError::InvalidExtractionPattern { .. } => "EXTRACTION",
        }
    }
}
