//! Downstream stages run after a process map is published.
//!
//! Each `GraphReady` signal is handled on its own task: data schema,
//! then form layout, then the final audit. Stages of one job run in
//! order, and each stage's output feeds the next.

use crate::agents::AgentManager;
use crate::analysis::HybridAnalyzer;
use crate::engine::{elapsed_ms, fail_job, step};
use crate::error::PipelineResult;
use crate::state::JobStore;
use pc_protocol::{Artifact, GraphReady, JobState, StepStatus};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

pub struct DownstreamWorker {
    store: Arc<JobStore>,
    agents: Arc<AgentManager>,
    analyzer: Arc<HybridAnalyzer>,
}

impl DownstreamWorker {
    pub fn new(store: Arc<JobStore>, agents: Arc<AgentManager>, analyzer: Arc<HybridAnalyzer>) -> Self {
        Self {
            store,
            agents,
            analyzer,
        }
    }

    /// Consume signals until every sender is dropped.
    pub fn spawn(self, mut signals: mpsc::Receiver<GraphReady>) -> JoinHandle<()> {
        let worker = Arc::new(self);
        tokio::spawn(async move {
            while let Some(signal) = signals.recv().await {
                let worker = Arc::clone(&worker);
                tokio::spawn(async move { worker.process(signal).await });
            }
            tracing::debug!("Graph ready channel closed, downstream worker stopping");
        })
    }

    /// Run the downstream stages for one signal.
    pub async fn process(&self, signal: GraphReady) {
        let job_id = signal.job_id;
        tracing::info!(%job_id, "Downstream stages started");
        if let Err(e) = self.execute(&signal).await {
            fail_job(&self.store, job_id, &e).await;
        }
    }

    async fn execute(&self, signal: &GraphReady) -> PipelineResult<()> {
        let job_id = signal.job_id;
        let request = signal.user_request.as_str();
        let map = &signal.process_map;

        self.store
            .upsert_progress_step(job_id, step::DATA, "Extracting data attributes", StepStatus::InProgress)
            .await?;
        let started = Instant::now();
        let schema = self.agents.derive_data(request, map).await?;
        self.store
            .save_artifact(job_id, Artifact::DataSchema(schema.clone()), elapsed_ms(started))
            .await?;
        self.store
            .upsert_progress_step(job_id, step::DATA, "Data attributes extracted", StepStatus::Completed)
            .await?;

        self.store
            .upsert_progress_step(job_id, step::FORM, "Optimizing form layouts", StepStatus::InProgress)
            .await?;
        let started = Instant::now();
        let layout = self.agents.derive_form(request, map, &schema).await?;
        self.store
            .save_artifact(job_id, Artifact::FormLayout(layout), elapsed_ms(started))
            .await?;
        self.store
            .upsert_progress_step(job_id, step::FORM, "Form layouts optimized", StepStatus::Completed)
            .await?;

        self.store
            .upsert_progress_step(job_id, step::AUDIT, "Auditing logical integrity", StepStatus::InProgress)
            .await?;
        let results = self.analyzer.analyze_map(map).await;
        tracing::info!(%job_id, findings = results.len(), "Audit finished");
        self.store.save_analysis_results(job_id, results).await?;
        let job = self
            .store
            .upsert_progress_step(job_id, step::AUDIT, "Logical integrity audited", StepStatus::Completed)
            .await?;

        if job.progress_step(step::SYNC).is_some() {
            self.store
                .upsert_progress_step(job_id, step::SYNC, "Data & forms synchronized", StepStatus::Completed)
                .await?;
        }

        self.store
            .update_state(job_id, JobState::Completed, "Architecture Completed Successfully.")
            .await?;
        tracing::info!(%job_id, "Job completed");
        Ok(())
    }
}
