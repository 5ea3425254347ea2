//! Adapter for agents served by an external command.
//!
//! Each call spawns the configured command, writes one JSON request to its
//! stdin and reads the typed response from the last JSON line of stdout:
//!
//! ```json
//! {"role":"process-architect","task":"transform","model":"gpt-4o-mini","systemPrompt":"...","input":{...}}
//! ```

use crate::agents::base::{
    Agent, AgentError, DataModeler, FlowAnalyst, FormDesigner, InputGuard, IntentClassifier,
    PartialModifier, ProcessArchitect, ProcessOutliner,
};
use crate::agents::cli_executor::CliExecutor;
use crate::agents::role::AgentRole;
use async_trait::async_trait;
use pc_protocol::{
    AgentProfile, AnalysisResult, DataSchema, FixGraphRequest, FormLayout, GraphSnapshot,
    GuardVerdict, IntentResponse, ProcessDefinition, ProcessMap,
};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::path::PathBuf;

pub struct CommandAgent {
    role: AgentRole,
    model: String,
    system_prompt: String,
    command: String,
    args: Vec<String>,
    working_dir: PathBuf,
}

/// Analysts may answer with a bare list or a `{"results": [...]}` report.
#[derive(Deserialize)]
#[serde(untagged)]
enum Findings {
    List(Vec<AnalysisResult>),
    Report { results: Vec<AnalysisResult> },
}

impl CommandAgent {
    /// Create an adapter from a profile.
    ///
    /// # Arguments
    ///
    /// * `role` - Role the profile was resolved to
    /// * `profile` - Profile from `.copilot/agents/*.md`; must name a command
    /// * `working_dir` - Directory the command runs in
    pub fn new(role: AgentRole, profile: &AgentProfile, working_dir: PathBuf) -> Result<Self, AgentError> {
        let command = profile
            .command
            .clone()
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| {
                AgentError::NotAvailable(format!("Profile '{}' does not name a command", profile.name))
            })?;

        Ok(Self {
            role,
            model: profile.model.clone(),
            system_prompt: profile.system_prompt.clone(),
            command,
            args: profile.args.clone(),
            working_dir,
        })
    }

    pub fn role(&self) -> AgentRole {
        self.role
    }

    fn request_payload(&self, task: &str, input: Value) -> String {
        let request = json!({
            "role": self.role.name(),
            "task": task,
            "model": self.model,
            "systemPrompt": self.system_prompt,
            "input": input,
        });
        // Trailing newline so line-oriented readers see a complete record.
        format!("{}\n", request)
    }

    async fn call<T: DeserializeOwned>(&self, task: &str, input: Value) -> Result<T, AgentError> {
        tracing::debug!(role = %self.role, task, command = %self.command, "Invoking command agent");

        let value = CliExecutor::last_value(
            self.command.clone(),
            self.args.clone(),
            self.working_dir.to_string_lossy().into_owned(),
            Some(self.request_payload(task, input)),
        )
        .await?;

        serde_json::from_value(value).map_err(|e| {
            AgentError::ResponseParse(format!("'{}' returned an unexpected {} response: {}", self.role, task, e))
        })
    }
}

#[async_trait]
impl Agent for CommandAgent {
    async fn check_availability(&self) -> bool {
        which::which(&self.command).is_ok()
    }
}

#[async_trait]
impl InputGuard for CommandAgent {
    async fn check(&self, user_input: &str) -> Result<GuardVerdict, AgentError> {
        self.call("check", json!({ "userInput": user_input })).await
    }
}

#[async_trait]
impl IntentClassifier for CommandAgent {
    async fn classify(&self, user_input: &str) -> Result<IntentResponse, AgentError> {
        self.call("classify", json!({ "userInput": user_input })).await
    }
}

#[async_trait]
impl ProcessOutliner for CommandAgent {
    async fn outline(&self, augmented_request: &str) -> Result<ProcessDefinition, AgentError> {
        self.call("outline", json!({ "userRequest": augmented_request })).await
    }
}

#[async_trait]
impl ProcessArchitect for CommandAgent {
    async fn transform(&self, definition: &ProcessDefinition) -> Result<ProcessMap, AgentError> {
        self.call("transform", json!({ "definition": definition })).await
    }

    async fn fix(
        &self,
        definition: &ProcessDefinition,
        invalid: &ProcessMap,
        error: &str,
    ) -> Result<ProcessMap, AgentError> {
        self.call(
            "fix",
            json!({ "definition": definition, "invalidMap": invalid, "errorMessage": error }),
        )
        .await
    }
}

#[async_trait]
impl PartialModifier for CommandAgent {
    async fn modify(&self, current: &ProcessMap, instruction: &str) -> Result<ProcessMap, AgentError> {
        self.call("modify", json!({ "currentMap": current, "instruction": instruction }))
            .await
    }
}

#[async_trait]
impl DataModeler for CommandAgent {
    async fn derive_data(&self, request: &str, map: &ProcessMap) -> Result<DataSchema, AgentError> {
        self.call("derive-data", json!({ "userRequest": request, "processMap": map }))
            .await
    }
}

#[async_trait]
impl FormDesigner for CommandAgent {
    async fn derive_form(
        &self,
        request: &str,
        map: &ProcessMap,
        schema: &DataSchema,
    ) -> Result<FormLayout, AgentError> {
        self.call(
            "derive-form",
            json!({ "userRequest": request, "processMap": map, "dataSchema": schema }),
        )
        .await
    }
}

#[async_trait]
impl FlowAnalyst for CommandAgent {
    async fn analyze(&self, nodes: &[Value], edges: &[Value]) -> Result<Vec<AnalysisResult>, AgentError> {
        let findings: Findings = self
            .call("analyze", json!({ "nodes": nodes, "edges": edges }))
            .await?;
        Ok(match findings {
            Findings::List(results) | Findings::Report { results } => results,
        })
    }

    async fn fix_graph(&self, request: &FixGraphRequest) -> Result<GraphSnapshot, AgentError> {
        self.call(
            "fix-graph",
            json!({
                "graphSnapshot": request.graph_snapshot,
                "errorType": request.error.kind,
                "targetNodeId": request.error.target_node_id,
                "suggestion": request.error.suggestion,
            }),
        )
        .await
    }
}
