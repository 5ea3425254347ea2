//! Agent manager for the stage pipeline.
//!
//! The `AgentManager` is responsible for:
//! - Holding one collaborator per role
//! - Bounding every call with the configured timeout
//! - Logging role and latency of each call

use crate::agents::base::{
    Agent, AgentError, AgentSet, DataModeler, FlowAnalyst, FormDesigner, InputGuard,
    IntentClassifier, PartialModifier, ProcessArchitect, ProcessOutliner,
};
use crate::agents::role::AgentRole;
use crate::engine::elapsed_ms;
use pc_protocol::{
    AnalysisResult, DataSchema, FixGraphRequest, FormLayout, GraphSnapshot, GuardVerdict,
    IntentResponse, ProcessDefinition, ProcessMap,
};
use serde_json::Value;
use std::future::Future;
use std::time::{Duration, Instant};

/// Timeout applied when none is configured.
pub const DEFAULT_AGENT_TIMEOUT: Duration = Duration::from_secs(60);

pub struct AgentManager {
    agents: AgentSet,
    timeout: Duration,
}

impl AgentManager {
    pub fn new(agents: AgentSet) -> Self {
        Self {
            agents,
            timeout: DEFAULT_AGENT_TIMEOUT,
        }
    }

    /// Set the upper bound of a single agent call.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Roles whose agent reports itself unavailable.
    pub async fn unavailable_roles(&self) -> Vec<AgentRole> {
        let checks = [
            (AgentRole::InputGuard, self.agents.guard.check_availability().await),
            (AgentRole::IntentClassifier, self.agents.classifier.check_availability().await),
            (AgentRole::ProcessOutliner, self.agents.outliner.check_availability().await),
            (AgentRole::ProcessArchitect, self.agents.architect.check_availability().await),
            (AgentRole::PartialModifier, self.agents.modifier.check_availability().await),
            (AgentRole::DataModeler, self.agents.data_modeler.check_availability().await),
            (AgentRole::FormDesigner, self.agents.form_designer.check_availability().await),
            (AgentRole::FlowAnalyst, self.agents.analyst.check_availability().await),
        ];
        checks
            .into_iter()
            .filter(|(_, available)| !available)
            .map(|(role, _)| role)
            .collect()
    }

    /// Run one agent call under the timeout.
    async fn call<T, F>(&self, role: AgentRole, fut: F) -> Result<T, AgentError>
    where
        F: Future<Output = Result<T, AgentError>>,
    {
        let started = Instant::now();
        let result = match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(AgentError::Timeout {
                role: role.name().to_string(),
                secs: self.timeout.as_secs(),
            }),
        };

        let elapsed_ms = elapsed_ms(started);
        match &result {
            Ok(_) => tracing::debug!(%role, elapsed_ms, "Agent call succeeded"),
            Err(e) => tracing::warn!(%role, elapsed_ms, error = %e, "Agent call failed"),
        }
        result
    }

    pub async fn check_input(&self, user_input: &str) -> Result<GuardVerdict, AgentError> {
        self.call(AgentRole::InputGuard, self.agents.guard.check(user_input))
            .await
    }

    pub async fn classify(&self, user_input: &str) -> Result<IntentResponse, AgentError> {
        self.call(AgentRole::IntentClassifier, self.agents.classifier.classify(user_input))
            .await
    }

    pub async fn outline(&self, augmented_request: &str) -> Result<ProcessDefinition, AgentError> {
        self.call(AgentRole::ProcessOutliner, self.agents.outliner.outline(augmented_request))
            .await
    }

    pub async fn transform(&self, definition: &ProcessDefinition) -> Result<ProcessMap, AgentError> {
        self.call(AgentRole::ProcessArchitect, self.agents.architect.transform(definition))
            .await
    }

    pub async fn fix(
        &self,
        definition: &ProcessDefinition,
        invalid: &ProcessMap,
        error: &str,
    ) -> Result<ProcessMap, AgentError> {
        self.call(
            AgentRole::ProcessArchitect,
            self.agents.architect.fix(definition, invalid, error),
        )
        .await
    }

    pub async fn modify(&self, current: &ProcessMap, instruction: &str) -> Result<ProcessMap, AgentError> {
        self.call(AgentRole::PartialModifier, self.agents.modifier.modify(current, instruction))
            .await
    }

    pub async fn derive_data(&self, request: &str, map: &ProcessMap) -> Result<DataSchema, AgentError> {
        self.call(AgentRole::DataModeler, self.agents.data_modeler.derive_data(request, map))
            .await
    }

    pub async fn derive_form(
        &self,
        request: &str,
        map: &ProcessMap,
        schema: &DataSchema,
    ) -> Result<FormLayout, AgentError> {
        self.call(
            AgentRole::FormDesigner,
            self.agents.form_designer.derive_form(request, map, schema),
        )
        .await
    }

    pub async fn analyze(&self, nodes: &[Value], edges: &[Value]) -> Result<Vec<AnalysisResult>, AgentError> {
        self.call(AgentRole::FlowAnalyst, self.agents.analyst.analyze(nodes, edges))
            .await
    }

    pub async fn fix_graph(&self, request: &FixGraphRequest) -> Result<GraphSnapshot, AgentError> {
        self.call(AgentRole::FlowAnalyst, self.agents.analyst.fix_graph(request))
            .await
    }
}
