//! Concurrent job store.
//!
//! Jobs live in a registry of per-job locks. Every mutation holds the
//! job's own lock for the whole read-modify-write, so concurrent writers
//! on one job serialize instead of overwriting each other. Records are
//! kept for the lifetime of the process.

use crate::state::error::{JobStoreError, StoreResult};
use crate::state::job;
use chrono::Utc;
use pc_protocol::{AnalysisResult, Artifact, Job, JobState, StepStatus};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

#[derive(Default)]
pub struct JobStore {
    jobs: RwLock<HashMap<Uuid, Arc<Mutex<Job>>>>,
}

impl JobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a fresh pending job under `id`.
    ///
    /// Re-initializing an existing id replaces its record.
    pub async fn init(&self, id: Uuid) -> Job {
        let job = Job::new(id);
        let mut jobs = self.jobs.write().await;
        jobs.insert(id, Arc::new(Mutex::new(job.clone())));
        job
    }

    /// Snapshot of a job.
    ///
    /// While the job is processing, `totalElapsedMillis` is projected to
    /// the current time on the returned copy only; the stored record and
    /// its version are untouched.
    pub async fn get(&self, id: Uuid) -> Option<Job> {
        let entry = self.entry(id).await?;
        let mut snapshot = entry.lock().await.clone();
        if snapshot.state == JobState::Processing {
            snapshot.total_elapsed_millis = snapshot.elapsed_millis_at(Utc::now());
        }
        Some(snapshot)
    }

    pub async fn len(&self) -> usize {
        self.jobs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.jobs.read().await.is_empty()
    }

    pub async fn update_state(&self, id: Uuid, state: JobState, message: impl Into<String>) -> StoreResult<Job> {
        let message = message.into();
        self.mutate(id, |record| job::set_state(record, state, message)).await
    }

    pub async fn upsert_progress_step(
        &self,
        id: Uuid,
        step_id: &str,
        label: impl Into<String>,
        status: StepStatus,
    ) -> StoreResult<Job> {
        let label = label.into();
        self.mutate(id, |record| job::upsert_step(record, step_id, label, status))
            .await
    }

    /// Store a stage output with its duration; the stage name comes from
    /// the artifact kind.
    pub async fn save_artifact(&self, id: Uuid, artifact: Artifact, duration_ms: u64) -> StoreResult<Job> {
        self.mutate(id, |record| {
            job::put_artifact(record, artifact, duration_ms);
            Ok(())
        })
        .await
    }

    pub async fn save_analysis_results(&self, id: Uuid, results: Vec<AnalysisResult>) -> StoreResult<Job> {
        self.mutate(id, |record| {
            job::set_analysis_results(record, results);
            Ok(())
        })
        .await
    }

    /// Fail the job and every in-flight step in one mutation.
    pub async fn fail(&self, id: Uuid, message: impl Into<String>) -> StoreResult<Job> {
        let message = message.into();
        self.mutate(id, |record| {
            job::set_state(record, JobState::Failed, message)?;
            job::fail_in_flight_steps(record);
            Ok(())
        })
        .await
    }

    async fn entry(&self, id: Uuid) -> Option<Arc<Mutex<Job>>> {
        self.jobs.read().await.get(&id).cloned()
    }

    /// Apply `f` to a draft of the job and commit it with a new version.
    ///
    /// A rule violation leaves the stored record unchanged.
    async fn mutate<F>(&self, id: Uuid, f: F) -> StoreResult<Job>
    where
        F: FnOnce(&mut Job) -> StoreResult<()>,
    {
        let entry = self.entry(id).await.ok_or(JobStoreError::NotFound(id))?;
        let mut current = entry.lock().await;

        let mut draft = current.clone();
        f(&mut draft)?;
        draft.version = current.version + 1;
        draft.total_elapsed_millis = draft.elapsed_millis_at(Utc::now());

        *current = draft;
        Ok(current.clone())
    }
}
