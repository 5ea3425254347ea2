//! Stage pipeline execution.
//!
//! The [`StageOrchestrator`] runs the primary stages of a job on the
//! job's own task and publishes a [`GraphReady`](pc_protocol::GraphReady)
//! signal once a valid process map is stored. The [`DownstreamWorker`]
//! consumes those signals on a separate task and finishes the job.
//!
//! Both report failures through [`fail_job`], the only place that writes
//! the FAILED state.

pub mod downstream;
pub mod orchestrator;

pub use downstream::DownstreamWorker;
pub use orchestrator::StageOrchestrator;

use crate::error::PipelineError;
use crate::state::{JobStore, JobStoreError};
use uuid::Uuid;

/// Progress step ids shown to pollers.
pub mod step {
    pub const VALIDATE: &str = "val";
    pub const INTENT: &str = "intent";
    pub const OUTLINE: &str = "outline";
    pub const MAP: &str = "map";
    pub const DIFF: &str = "diff";
    pub const MODIFY: &str = "modify";
    pub const SYNC: &str = "sync";
    pub const DATA: &str = "data";
    pub const FORM: &str = "form";
    pub const AUDIT: &str = "audit";
}

/// Move a job to FAILED and fail its in-flight steps.
///
/// A job that no longer exists is only logged.
pub async fn fail_job(store: &JobStore, job_id: Uuid, error: &PipelineError) {
    if let PipelineError::Store(JobStoreError::NotFound(_)) = error {
        tracing::warn!(%job_id, "Job record missing, stopping pipeline");
        return;
    }

    tracing::error!(%job_id, error = %error, "Job failed");
    match store.fail(job_id, error.job_message()).await {
        Ok(job) => tracing::debug!(%job_id, version = job.version, "Failure recorded"),
        Err(e) => tracing::warn!(%job_id, error = %e, "Could not record job failure"),
    }
}

/// Milliseconds elapsed since `started`.
pub(crate) fn elapsed_ms(started: std::time::Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pc_protocol::{JobState, StepStatus};

    #[tokio::test]
    async fn test_fail_job_marks_in_flight_steps() {
        let store = JobStore::new();
        let id = Uuid::new_v4();
        store.init(id).await;
        store
            .upsert_progress_step(id, step::VALIDATE, "Domain context validated", StepStatus::Completed)
            .await
            .unwrap();
        store
            .upsert_progress_step(id, step::OUTLINE, "Synthesizing process steps", StepStatus::InProgress)
            .await
            .unwrap();

        fail_job(&store, id, &PipelineError::Signal).await;

        let job = store.get(id).await.unwrap();
        assert_eq!(job.state, JobState::Failed);
        assert_eq!(job.message, "System Error: Downstream signal channel closed");
        assert_eq!(job.progress_steps[0].status, StepStatus::Completed);
        assert_eq!(job.progress_steps[1].status, StepStatus::Failed);
        assert_eq!(job.progress_steps[1].label, "Synthesizing process steps (Failed)");
    }

    #[tokio::test]
    async fn test_fail_job_unknown_id_is_ignored() {
        let store = JobStore::new();
        let id = Uuid::new_v4();

        fail_job(&store, id, &PipelineError::Store(JobStoreError::NotFound(id))).await;
        fail_job(&store, id, &PipelineError::Signal).await;

        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_fail_job_keeps_terminal_state() {
        let store = JobStore::new();
        let id = Uuid::new_v4();
        store.init(id).await;
        store.update_state(id, JobState::Completed, "done").await.unwrap();

        fail_job(&store, id, &PipelineError::Signal).await;

        let job = store.get(id).await.unwrap();
        assert_eq!(job.state, JobState::Completed);
        assert_eq!(job.message, "done");
    }

    #[test]
    fn test_elapsed_ms_counts_from_start() {
        let started = std::time::Instant::now() - std::time::Duration::from_millis(250);
        let elapsed = elapsed_ms(started);
        assert!((250..60_000).contains(&elapsed), "elapsed = {}", elapsed);
    }
}
