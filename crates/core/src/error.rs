//! Top-level pipeline error.
//!
//! Every failure that reaches the orchestrator's handler is one of these.
//! A guard rejection is not here: it completes the job normally.

use crate::agents::AgentError;
use crate::analysis::SnapshotError;
use crate::state::JobStoreError;
use crate::validation::{CorrectionError, StructuralError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    /// A required input is missing; never retried.
    #[error("{0}")]
    Precondition(String),

    #[error("Structural validation failed after {attempts} attempts: {last_error}")]
    StructuralValidation {
        attempts: u32,
        last_error: StructuralError,
    },

    #[error(transparent)]
    Agent(#[from] AgentError),

    #[error(transparent)]
    Store(#[from] JobStoreError),

    /// The downstream worker is gone.
    #[error("Downstream signal channel closed")]
    Signal,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<CorrectionError> for PipelineError {
    fn from(err: CorrectionError) -> Self {
        match err {
            CorrectionError::Exhausted {
                attempts,
                last_error,
            } => PipelineError::StructuralValidation {
                attempts,
                last_error,
            },
            CorrectionError::Agent { source, .. } => PipelineError::Agent(source),
        }
    }
}

impl From<SnapshotError> for PipelineError {
    fn from(err: SnapshotError) -> Self {
        PipelineError::InvalidInput(err.to_string())
    }
}

impl PipelineError {
    /// Message written to a FAILED job.
    pub fn job_message(&self) -> String {
        match self {
            PipelineError::Precondition(message) => message.clone(),
            other => format!("System Error: {}", other),
        }
    }
}

pub type PipelineResult<T> = std::result::Result<T, PipelineError>;
