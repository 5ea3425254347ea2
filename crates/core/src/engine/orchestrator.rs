//! Primary stage pipeline of a job.
//!
//! GUARD -> CLASSIFY -> DESIGN | MODIFY | ANALYZE | other. Design and
//! modify both end in a self-corrected process map that is stored and
//! published to the downstream worker.

use crate::agents::AgentManager;
use crate::analysis::HybridAnalyzer;
use crate::engine::{elapsed_ms, fail_job, step};
use crate::error::{PipelineError, PipelineResult};
use crate::knowledge::{augmented_prompt, KnowledgeStore};
use crate::state::JobStore;
use crate::validation::{validate, SelfCorrectionLoop};
use pc_protocol::{
    Artifact, GraphReady, Intent, JobState, OrchestratorSettings, ProcessDefinition, ProcessMap,
    StepStatus, SubmitRequest,
};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;
use uuid::Uuid;

/// User request recorded for transformation jobs.
pub const TRANSFORMATION_REQUEST: &str = "Manual Transformation Request";

pub struct StageOrchestrator {
    store: Arc<JobStore>,
    agents: Arc<AgentManager>,
    analyzer: Arc<HybridAnalyzer>,
    knowledge: Arc<KnowledgeStore>,
    settings: OrchestratorSettings,
    correction: SelfCorrectionLoop,
    signals: mpsc::Sender<GraphReady>,
}

impl StageOrchestrator {
    pub fn new(
        store: Arc<JobStore>,
        agents: Arc<AgentManager>,
        analyzer: Arc<HybridAnalyzer>,
        knowledge: Arc<KnowledgeStore>,
        settings: OrchestratorSettings,
        signals: mpsc::Sender<GraphReady>,
    ) -> Self {
        let correction = SelfCorrectionLoop::new(settings.max_correction_attempts);
        Self {
            store,
            agents,
            analyzer,
            knowledge,
            settings,
            correction,
            signals,
        }
    }

    /// Run a chat submission to its terminal state or to the downstream
    /// hand-off.
    pub async fn run(&self, job_id: Uuid, request: SubmitRequest) {
        tracing::info!(%job_id, "Job started, evaluating domain context");
        if let Err(e) = self.execute(job_id, &request).await {
            fail_job(&self.store, job_id, &e).await;
        }
    }

    /// Run a ready-made outline straight through transform and publish.
    pub async fn run_transformation(&self, job_id: Uuid, definition: ProcessDefinition) {
        tracing::info!(%job_id, steps = definition.steps.len(), "Transformation job started");
        if let Err(e) = self.execute_transformation(job_id, &definition).await {
            fail_job(&self.store, job_id, &e).await;
        }
    }

    async fn execute(&self, job_id: Uuid, request: &SubmitRequest) -> PipelineResult<()> {
        self.store
            .update_state(job_id, JobState::Processing, "Evaluating domain context...")
            .await?;

        self.store
            .upsert_progress_step(job_id, step::VALIDATE, "Evaluating domain context", StepStatus::InProgress)
            .await?;
        let verdict = self.agents.check_input(&request.user_prompt).await?;
        if !verdict.is_valid() {
            tracing::info!(%job_id, status = ?verdict.status, "Request deflected by domain guard");
            self.store
                .upsert_progress_step(job_id, step::VALIDATE, "Validation completed", StepStatus::Completed)
                .await?;
            self.store
                .update_state(job_id, JobState::Completed, verdict.message)
                .await?;
            return Ok(());
        }
        self.store
            .upsert_progress_step(job_id, step::VALIDATE, "Domain context validated", StepStatus::Completed)
            .await?;

        self.store
            .upsert_progress_step(job_id, step::INTENT, "Analyzing process requirements", StepStatus::InProgress)
            .await?;
        let response = self.agents.classify(&request.user_prompt).await?;
        let intent = match response.confidence {
            Some(confidence) if confidence < self.settings.intent_confidence_floor => {
                tracing::info!(%job_id, intent = %response.intent, confidence, "Intent below confidence floor");
                Intent::Unknown
            }
            _ => response.intent,
        };
        tracing::info!(%job_id, %intent, "Job categorized");
        self.store
            .upsert_progress_step(
                job_id,
                step::INTENT,
                format!("Intent identified: {}", intent),
                StepStatus::Completed,
            )
            .await?;

        match intent {
            Intent::Design => self.design(job_id, request).await,
            Intent::Modify => match &request.current_process {
                Some(current) => self.modify(job_id, &request.user_prompt, current).await,
                None => Err(PipelineError::Precondition(
                    "No process context found to modify.".to_string(),
                )),
            },
            Intent::Analyze => self.audit(job_id, request.current_process.as_ref()).await,
            _ => {
                self.store
                    .update_state(job_id, JobState::Completed, "Inquiry processed.")
                    .await?;
                Ok(())
            }
        }
    }

    async fn execute_transformation(&self, job_id: Uuid, definition: &ProcessDefinition) -> PipelineResult<()> {
        if definition.is_empty() {
            return Err(PipelineError::Precondition(
                "Process definition has no steps.".to_string(),
            ));
        }

        self.store
            .update_state(job_id, JobState::Processing, "Transforming process definition...")
            .await?;
        self.store
            .upsert_progress_step(job_id, step::MAP, "Generating Process Map visualization", StepStatus::InProgress)
            .await?;
        self.transform_and_publish(job_id, TRANSFORMATION_REQUEST, definition)
            .await
    }

    async fn design(&self, job_id: Uuid, request: &SubmitRequest) -> PipelineResult<()> {
        self.store
            .upsert_progress_step(job_id, step::OUTLINE, "Synthesizing process steps", StepStatus::InProgress)
            .await?;

        let context = self
            .knowledge
            .build_context(&request.knowledge_source_ids, self.settings.knowledge_char_limit);
        let prompt = augmented_prompt(&request.user_prompt, &context);
        let definition = self.agents.outline(&prompt).await?;

        if definition.is_empty() {
            tracing::info!(%job_id, "Outline is empty, nothing to design");
            self.store
                .upsert_progress_step(job_id, step::OUTLINE, "Failed to identify steps", StepStatus::Failed)
                .await?;
            self.store
                .update_state(job_id, JobState::Completed, "No design steps could be identified.")
                .await?;
            return Ok(());
        }

        self.store
            .upsert_progress_step(job_id, step::OUTLINE, "Process steps synthesized", StepStatus::Completed)
            .await?;
        self.store
            .upsert_progress_step(job_id, step::MAP, "Generating Process Map visualization", StepStatus::InProgress)
            .await?;

        self.transform_and_publish(job_id, &request.user_prompt, &definition)
            .await
    }

    async fn transform_and_publish(
        &self,
        job_id: Uuid,
        user_request: &str,
        definition: &ProcessDefinition,
    ) -> PipelineResult<()> {
        let agents = &self.agents;
        let started = Instant::now();

        let corrected = self
            .correction
            .run(
                || agents.transform(definition),
                |invalid: ProcessMap, error: String, attempt: u32| async move {
                    tracing::info!(%job_id, attempt, "Requesting process map fix");
                    agents.fix(definition, &invalid, &error).await
                },
                validate,
            )
            .await?;
        tracing::info!(%job_id, attempts = corrected.attempts, "Process map validated");

        self.store
            .save_artifact(job_id, Artifact::ProcessMap(corrected.value.clone()), elapsed_ms(started))
            .await?;
        self.store
            .upsert_progress_step(job_id, step::MAP, "Process Map generated", StepStatus::Completed)
            .await?;

        self.publish(job_id, user_request, corrected.value).await
    }

    async fn modify(&self, job_id: Uuid, instruction: &str, current: &ProcessMap) -> PipelineResult<()> {
        self.store
            .upsert_progress_step(job_id, step::DIFF, "Identifying modification targets", StepStatus::InProgress)
            .await?;
        self.store
            .upsert_progress_step(job_id, step::DIFF, "Modification targets identified", StepStatus::Completed)
            .await?;
        self.store
            .upsert_progress_step(job_id, step::MODIFY, "Applying surgical changes", StepStatus::InProgress)
            .await?;

        let agents = &self.agents;
        let started = Instant::now();

        let corrected = self
            .correction
            .run(
                || agents.modify(current, instruction),
                |invalid: ProcessMap, error: String, attempt: u32| async move {
                    tracing::info!(%job_id, attempt, "Requesting modification fix");
                    let retry = format!(
                        "{}\n\nThe previous revision was rejected: {}",
                        instruction, error
                    );
                    agents.modify(&invalid, &retry).await
                },
                validate,
            )
            .await?;

        self.store
            .save_artifact(job_id, Artifact::ProcessMap(corrected.value.clone()), elapsed_ms(started))
            .await?;
        self.store
            .upsert_progress_step(job_id, step::MODIFY, "Surgical changes applied", StepStatus::Completed)
            .await?;
        self.store
            .upsert_progress_step(job_id, step::SYNC, "Synchronizing data & forms", StepStatus::InProgress)
            .await?;

        self.publish(job_id, instruction, corrected.value).await
    }

    async fn audit(&self, job_id: Uuid, current: Option<&ProcessMap>) -> PipelineResult<()> {
        if let Some(map) = current {
            self.store
                .upsert_progress_step(job_id, step::AUDIT, "Auditing logical integrity", StepStatus::InProgress)
                .await?;
            let results = self.analyzer.analyze_map(map).await;
            tracing::info!(%job_id, findings = results.len(), "Optimization audit finished");
            self.store.save_analysis_results(job_id, results).await?;
            self.store
                .upsert_progress_step(job_id, step::AUDIT, "Logical integrity audited", StepStatus::Completed)
                .await?;
        }

        self.store
            .update_state(job_id, JobState::Completed, "Optimization audit complete.")
            .await?;
        Ok(())
    }

    async fn publish(&self, job_id: Uuid, user_request: &str, process_map: ProcessMap) -> PipelineResult<()> {
        let signal = GraphReady {
            job_id,
            user_request: user_request.to_string(),
            process_map,
        };
        self.signals
            .send(signal)
            .await
            .map_err(|_| PipelineError::Signal)?;
        tracing::debug!(%job_id, "Graph ready signal published");
        Ok(())
    }
}
