//! Job manager for coordinating pipeline runs.
//!
//! The JobManager is the entry point for clients. It owns the job store,
//! spawns one task per submission and keeps the downstream worker fed
//! through the graph-ready channel. Clients observe jobs only by polling.

use crate::agents::{AgentManager, AgentSet};
use crate::analysis::HybridAnalyzer;
use crate::engine::{DownstreamWorker, StageOrchestrator};
use crate::error::PipelineResult;
use crate::knowledge::KnowledgeStore;
use crate::state::JobStore;
use pc_protocol::{
    AnalysisResult, FixGraphRequest, GraphSnapshot, Job, OrchestratorSettings, ProcessDefinition,
    SubmitRequest,
};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use uuid::Uuid;

/// Manages all pipeline jobs.
///
/// Must be created inside a tokio runtime: construction spawns the
/// downstream worker.
pub struct JobManager {
    /// Registry of every job submitted through this manager.
    store: Arc<JobStore>,

    agents: Arc<AgentManager>,

    analyzer: Arc<HybridAnalyzer>,

    orchestrator: Arc<StageOrchestrator>,
}

impl JobManager {
    /// Create a new JobManager.
    ///
    /// # Arguments
    ///
    /// * `agents` - One collaborator per role
    /// * `settings` - Timeouts, attempt ceiling and channel sizing
    /// * `knowledge` - Sources that submissions may reference by id
    pub fn new(agents: AgentSet, settings: OrchestratorSettings, knowledge: KnowledgeStore) -> Self {
        let store = Arc::new(JobStore::new());
        let agents = Arc::new(
            AgentManager::new(agents).with_timeout(Duration::from_secs(settings.agent_timeout_secs)),
        );
        let analyzer = Arc::new(HybridAnalyzer::new(Arc::clone(&agents)));

        let (signals_tx, signals_rx) = mpsc::channel(settings.signal_buffer.max(1));
        DownstreamWorker::new(Arc::clone(&store), Arc::clone(&agents), Arc::clone(&analyzer))
            .spawn(signals_rx);

        let orchestrator = Arc::new(StageOrchestrator::new(
            Arc::clone(&store),
            Arc::clone(&agents),
            Arc::clone(&analyzer),
            Arc::new(knowledge),
            settings,
            signals_tx,
        ));

        Self {
            store,
            agents,
            analyzer,
            orchestrator,
        }
    }

    /// Start a chat job in the background.
    ///
    /// The job is registered as PENDING before this returns; no stage has
    /// run yet.
    pub async fn submit(&self, request: SubmitRequest) -> Uuid {
        let job_id = Uuid::new_v4();
        self.store.init(job_id).await;
        tracing::info!(%job_id, "Job submitted");

        let orchestrator = Arc::clone(&self.orchestrator);
        tokio::spawn(async move {
            orchestrator.run(job_id, request).await;
        });

        job_id
    }

    /// Start a job that transforms a ready-made outline.
    pub async fn submit_transformation(&self, definition: ProcessDefinition) -> Uuid {
        let job_id = Uuid::new_v4();
        self.store.init(job_id).await;
        tracing::info!(%job_id, "Transformation job submitted");

        let orchestrator = Arc::clone(&self.orchestrator);
        tokio::spawn(async move {
            orchestrator.run_transformation(job_id, definition).await;
        });

        job_id
    }

    /// Current snapshot of a job, or `None` for an unknown id.
    pub async fn poll(&self, job_id: Uuid) -> Option<Job> {
        self.store.get(job_id).await
    }

    /// Audit a raw node/edge snapshot outside of any job.
    ///
    /// # Errors
    ///
    /// `PipelineError::InvalidInput` when `nodes` or `edges` is missing.
    pub async fn analyze_graph(&self, graph: &Value) -> PipelineResult<Vec<AnalysisResult>> {
        Ok(self.analyzer.analyze_value(graph).await?)
    }

    /// Ask the flow analyst to repair a snapshot for one finding.
    pub async fn fix_graph(&self, request: &FixGraphRequest) -> PipelineResult<GraphSnapshot> {
        tracing::info!(kind = %request.error.kind, target = ?request.error.target_node_id, "Fixing graph");
        Ok(self.agents.fix_graph(request).await?)
    }

    /// Number of jobs submitted so far.
    pub async fn job_count(&self) -> usize {
        self.store.len().await
    }

    pub fn store(&self) -> Arc<JobStore> {
        Arc::clone(&self.store)
    }

    pub fn agents(&self) -> &AgentManager {
        &self.agents
    }
}
