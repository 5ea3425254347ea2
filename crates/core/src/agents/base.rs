//! Collaborator traits and supporting types.
//!
//! Every generative or classifying collaborator is an opaque async
//! function behind one trait per role. Prompts and model selection live
//! in the agent profiles, not here.

use async_trait::async_trait;
use pc_protocol::{
    AnalysisResult, DataSchema, FixGraphRequest, FormLayout, GraphSnapshot, GuardVerdict,
    IntentResponse, ProcessDefinition, ProcessMap,
};
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AgentError {
    #[error("Agent not available: {0}")]
    NotAvailable(String),
    #[error("API call failed: {0}")]
    ApiError(String),
    #[error("Response parsing error: {0}")]
    ResponseParse(String),
    #[error("Execution failed: {0}")]
    ExecutionError(String),
    #[error("Agent '{role}' timed out after {secs}s")]
    Timeout { role: String, secs: u64 },
}

/// Common surface of every collaborator implementation.
#[async_trait]
pub trait Agent: Send + Sync {
    async fn check_availability(&self) -> bool;
}

/// Domain guardrail on raw user input.
#[async_trait]
pub trait InputGuard: Agent {
    async fn check(&self, user_input: &str) -> Result<GuardVerdict, AgentError>;
}

#[async_trait]
pub trait IntentClassifier: Agent {
    async fn classify(&self, user_input: &str) -> Result<IntentResponse, AgentError>;
}

/// Drafts the abstract step list for a design request.
#[async_trait]
pub trait ProcessOutliner: Agent {
    async fn outline(&self, augmented_request: &str) -> Result<ProcessDefinition, AgentError>;
}

/// Turns an outline into a process map, and repairs maps it produced.
#[async_trait]
pub trait ProcessArchitect: Agent {
    async fn transform(&self, definition: &ProcessDefinition) -> Result<ProcessMap, AgentError>;

    async fn fix(
        &self,
        definition: &ProcessDefinition,
        invalid: &ProcessMap,
        error: &str,
    ) -> Result<ProcessMap, AgentError>;
}

/// Applies a natural-language edit to an existing map.
#[async_trait]
pub trait PartialModifier: Agent {
    async fn modify(&self, current: &ProcessMap, instruction: &str) -> Result<ProcessMap, AgentError>;
}

#[async_trait]
pub trait DataModeler: Agent {
    async fn derive_data(&self, request: &str, map: &ProcessMap) -> Result<DataSchema, AgentError>;
}

#[async_trait]
pub trait FormDesigner: Agent {
    async fn derive_form(
        &self,
        request: &str,
        map: &ProcessMap,
        schema: &DataSchema,
    ) -> Result<FormLayout, AgentError>;
}

/// Business-level auditor over an editor snapshot.
#[async_trait]
pub trait FlowAnalyst: Agent {
    async fn analyze(&self, nodes: &[Value], edges: &[Value]) -> Result<Vec<AnalysisResult>, AgentError>;

    async fn fix_graph(&self, request: &FixGraphRequest) -> Result<GraphSnapshot, AgentError>;
}

/// One handle per collaborator role.
#[derive(Clone)]
pub struct AgentSet {
    pub guard: Arc<dyn InputGuard>,
    pub classifier: Arc<dyn IntentClassifier>,
    pub outliner: Arc<dyn ProcessOutliner>,
    pub architect: Arc<dyn ProcessArchitect>,
    pub modifier: Arc<dyn PartialModifier>,
    pub data_modeler: Arc<dyn DataModeler>,
    pub form_designer: Arc<dyn FormDesigner>,
    pub analyst: Arc<dyn FlowAnalyst>,
}

impl AgentSet {
    /// Use a single implementation for every role.
    pub fn uniform<A>(agent: Arc<A>) -> Self
    where
        A: InputGuard
            + IntentClassifier
            + ProcessOutliner
            + ProcessArchitect
            + PartialModifier
            + DataModeler
            + FormDesigner
            + FlowAnalyst
            + 'static,
    {
        Self {
            guard: agent.clone(),
            classifier: agent.clone(),
            outliner: agent.clone(),
            architect: agent.clone(),
            modifier: agent.clone(),
            data_modeler: agent.clone(),
            form_designer: agent.clone(),
            analyst: agent,
        }
    }
}
