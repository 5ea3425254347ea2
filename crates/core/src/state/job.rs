//! Mutation rules for a single job record.
//!
//! These functions only touch the record they are given; the store wraps
//! each call in the job's lock and bumps the version.

use crate::state::error::{JobStoreError, StoreResult};
use pc_protocol::{AnalysisResult, Artifact, Job, JobState, ProgressStep, StepStatus};

/// Suffix appended to the label of a step that was in flight on failure.
pub const FAILED_LABEL_SUFFIX: &str = " (Failed)";

/// Move the job to `state` and overwrite its message.
///
/// # Errors
///
/// `IllegalTransition` when leaving a terminal state or returning to Pending.
pub fn set_state(job: &mut Job, state: JobState, message: String) -> StoreResult<()> {
    if !job.state.can_transition_to(state) {
        return Err(JobStoreError::IllegalTransition {
            from: job.state,
            to: state,
        });
    }
    job.state = state;
    job.message = message;
    Ok(())
}

/// Insert or update a progress step by id.
///
/// An existing step keeps its position. A step that already finished
/// may only be re-announced with the same status.
pub fn upsert_step(job: &mut Job, step_id: &str, label: String, status: StepStatus) -> StoreResult<()> {
    match job.progress_steps.iter_mut().find(|s| s.id == step_id) {
        Some(step) => {
            if step.status.is_terminal() && step.status != status {
                return Err(JobStoreError::StepRegression {
                    step_id: step_id.to_string(),
                    from: step.status,
                    to: status,
                });
            }
            step.label = label;
            step.status = status;
        }
        None => job.progress_steps.push(ProgressStep::new(step_id, label, status)),
    }
    Ok(())
}

/// Store an artifact and the duration of the stage that produced it.
pub fn put_artifact(job: &mut Job, artifact: Artifact, duration_ms: u64) {
    let stage = artifact.stage_name();
    job.stage_durations.insert(stage.to_string(), duration_ms);
    job.last_updated_stage = stage.to_string();
    if !job.state.is_terminal() {
        job.state = JobState::Processing;
    }
    job.artifacts.put(artifact);
}

pub fn set_analysis_results(job: &mut Job, results: Vec<AnalysisResult>) {
    job.analysis_results = results;
}

/// Mark every in-flight step as failed.
///
/// Returns the ids of the steps that changed.
pub fn fail_in_flight_steps(job: &mut Job) -> Vec<String> {
    job.progress_steps
        .iter_mut()
        .filter(|s| s.status == StepStatus::InProgress)
        .map(|step| {
            step.status = StepStatus::Failed;
            if !step.label.ends_with(FAILED_LABEL_SUFFIX) {
                step.label.push_str(FAILED_LABEL_SUFFIX);
            }
            step.id.clone()
        })
        .collect()
}
