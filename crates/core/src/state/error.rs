//! Job store error types.

use pc_protocol::{JobState, StepStatus};
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum JobStoreError {
    #[error("Job {0} not found")]
    NotFound(Uuid),

    #[error("Illegal job transition from {from} to {to}")]
    IllegalTransition { from: JobState, to: JobState },

    #[error("Progress step '{step_id}' cannot move from {from:?} to {to:?}")]
    StepRegression {
        step_id: String,
        from: StepStatus,
        to: StepStatus,
    },
}

pub type StoreResult<T> = std::result::Result<T, JobStoreError>;
