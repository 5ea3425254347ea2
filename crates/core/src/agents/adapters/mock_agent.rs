//! Deterministic in-process agent.
//!
//! Serves every role without a model: it designs a leave-request style
//! process (submit, manager review, approval gateway with a loop-back
//! reject path, notification). Builder methods switch individual roles to
//! rejecting, failing, slow or structurally broken behaviour for tests.

use crate::agents::base::{
    Agent, AgentError, DataModeler, FlowAnalyst, FormDesigner, InputGuard, IntentClassifier,
    PartialModifier, ProcessArchitect, ProcessOutliner,
};
use crate::agents::role::AgentRole;
use async_trait::async_trait;
use pc_protocol::{
    Activity, AnalysisResult, BranchCondition, DataEntity, DataEntityGroup, DataSchema,
    DefinitionStep, FixGraphRequest, FormDefinition, FormField, FormFieldGroup, FormLayout,
    GraphSnapshot, GuardVerdict, Intent, IntentResponse, NodeConfiguration, NodeType,
    ProcessDefinition, ProcessMap, Swimlane, TERMINAL_NODE_ID,
};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Target the mock writes into broken drafts.
pub const MOCK_DANGLING_TARGET: &str = "node_missing";

#[derive(Clone)]
pub struct MockAgent {
    available: bool,
    guard: GuardVerdict,
    intent: IntentResponse,
    empty_outline: bool,
    invalid_drafts: u32,
    failing_role: Option<AgentRole>,
    delay: Option<Duration>,
    semantic_findings: Vec<AnalysisResult>,
    map_calls: Arc<AtomicU32>,
}

impl Default for MockAgent {
    fn default() -> Self {
        Self::success()
    }
}

impl MockAgent {
    /// Accepts every input, classifies it as a design request and produces
    /// valid artifacts on the first try.
    pub fn success() -> Self {
        Self {
            available: true,
            guard: GuardVerdict::valid(),
            intent: IntentResponse::of(Intent::Design),
            empty_outline: false,
            invalid_drafts: 0,
            failing_role: None,
            delay: None,
            semantic_findings: Vec::new(),
            map_calls: Arc::new(AtomicU32::new(0)),
        }
    }

    pub fn unavailable() -> Self {
        Self {
            available: false,
            ..Self::success()
        }
    }

    /// Every call made in `role` fails with an execution error.
    pub fn failing(role: AgentRole) -> Self {
        Self {
            failing_role: Some(role),
            ..Self::success()
        }
    }

    pub fn with_guard(mut self, verdict: GuardVerdict) -> Self {
        self.guard = verdict;
        self
    }

    pub fn with_intent(mut self, intent: Intent) -> Self {
        self.intent = IntentResponse::of(intent);
        self
    }

    pub fn with_intent_confidence(mut self, intent: Intent, confidence: f32) -> Self {
        self.intent = IntentResponse {
            intent,
            confidence: Some(confidence),
        };
        self
    }

    /// The outliner returns no steps.
    pub fn with_empty_outline(mut self) -> Self {
        self.empty_outline = true;
        self
    }

    /// The first `count` map generations (transform, fix or modify) carry
    /// a dangling `nextActivityId`.
    pub fn with_invalid_drafts(mut self, count: u32) -> Self {
        self.invalid_drafts = count;
        self
    }

    /// Every call sleeps this long before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn with_semantic_findings(mut self, findings: Vec<AnalysisResult>) -> Self {
        self.semantic_findings = findings;
        self
    }

    /// Number of map generations served so far.
    pub fn map_calls(&self) -> u32 {
        self.map_calls.load(Ordering::SeqCst)
    }

    async fn enter(&self, role: AgentRole) -> Result<(), AgentError> {
        if !self.available {
            return Err(AgentError::NotAvailable(format!("Mock agent for '{}' not available", role)));
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing_role == Some(role) {
            return Err(AgentError::ExecutionError(format!("Mock failure in '{}'", role)));
        }
        Ok(())
    }

    /// Hands out the next map, broken while invalid drafts remain.
    fn next_map(&self, valid: ProcessMap) -> ProcessMap {
        let call = self.map_calls.fetch_add(1, Ordering::SeqCst);
        if call < self.invalid_drafts {
            break_last_link(valid)
        } else {
            valid
        }
    }
}

fn task(id: &str, label: &str, lane: &str, role: Option<&str>, next: &str) -> Activity {
    let node_type = if role.is_some() {
        NodeType::UserTask
    } else {
        NodeType::ServiceTask
    };
    Activity {
        id: id.to_string(),
        node_type,
        label: label.to_string(),
        swimlane_id: Some(lane.to_string()),
        description: None,
        configuration: Some(NodeConfiguration {
            config_type: Some(format!("{}_CONFIG", node_type.as_str().to_uppercase())),
            participant_role: role.map(str::to_string),
            is_approval: (id == "node_review").then_some(true),
            ..NodeConfiguration::default()
        }),
        input_mapping: BTreeMap::new(),
        position: None,
        next_activity_id: Some(next.to_string()),
    }
}

fn branch(expression: &str, target: &str) -> BranchCondition {
    BranchCondition {
        expression: Some(expression.to_string()),
        target_activity_id: Some(target.to_string()),
    }
}

/// The canonical leave-request map.
pub fn leave_request_map() -> ProcessMap {
    let decision = Activity {
        id: "node_decision".to_string(),
        node_type: NodeType::ExclusiveGateway,
        label: "Approved?".to_string(),
        swimlane_id: Some("lane_manager".to_string()),
        description: None,
        configuration: Some(NodeConfiguration {
            config_type: Some("GATEWAY_CONFIG".to_string()),
            default_next_activity_id: Some("node_revise".to_string()),
            conditions: vec![
                branch("{{ node_review.decision }} == 'APPROVE'", "node_notify"),
                branch("{{ node_review.decision }} == 'REJECT'", "node_revise"),
            ],
            ..NodeConfiguration::default()
        }),
        input_mapping: BTreeMap::new(),
        position: None,
        next_activity_id: None,
    };

    ProcessMap {
        process_name: "Leave Request".to_string(),
        description: "Employee leave request with manager approval".to_string(),
        swimlanes: vec![
            Swimlane {
                swimlane_id: "lane_employee".to_string(),
                name: "Employee".to_string(),
                next_swimlane_id: Some("lane_manager".to_string()),
            },
            Swimlane {
                swimlane_id: "lane_manager".to_string(),
                name: "Manager".to_string(),
                next_swimlane_id: Some("lane_system".to_string()),
            },
            Swimlane {
                swimlane_id: "lane_system".to_string(),
                name: "System".to_string(),
                next_swimlane_id: None,
            },
        ],
        activities: vec![
            task("node_submit", "Submit Leave Request", "lane_employee", Some("Drafter"), "node_review"),
            task("node_review", "Review Request", "lane_manager", Some("Manager"), "node_decision"),
            decision,
            task("node_revise", "Revise Request", "lane_employee", Some("Drafter"), "node_review"),
            task("node_notify", "Notify Employee", "lane_system", None, TERMINAL_NODE_ID),
        ],
    }
}

/// Point the last terminal link at a node that does not exist.
fn break_last_link(mut map: ProcessMap) -> ProcessMap {
    if let Some(activity) = map
        .activities
        .iter_mut()
        .rev()
        .find(|a| a.next_activity_id.as_deref() == Some(TERMINAL_NODE_ID))
    {
        activity.next_activity_id = Some(MOCK_DANGLING_TARGET.to_string());
    }
    map
}

/// Insert an archiving service task in front of the end of flow.
fn append_archive_step(current: &ProcessMap) -> ProcessMap {
    let mut map = current.clone();
    if map.activity("node_archive").is_some() {
        return map;
    }
    for activity in map.activities.iter_mut() {
        if activity.next_activity_id.as_deref() == Some(TERMINAL_NODE_ID) {
            activity.next_activity_id = Some("node_archive".to_string());
        }
    }
    map.activities
        .push(task("node_archive", "Archive Record", "lane_system", None, TERMINAL_NODE_ID));
    map
}

fn to_alias(label: &str) -> String {
    label
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}

fn node_type_of(node: &Value) -> String {
    node.get("type")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_lowercase()
}

#[async_trait]
impl Agent for MockAgent {
    async fn check_availability(&self) -> bool {
        self.available
    }
}

#[async_trait]
impl InputGuard for MockAgent {
    async fn check(&self, _user_input: &str) -> Result<GuardVerdict, AgentError> {
        self.enter(AgentRole::InputGuard).await?;
        Ok(self.guard.clone())
    }
}

#[async_trait]
impl IntentClassifier for MockAgent {
    async fn classify(&self, _user_input: &str) -> Result<IntentResponse, AgentError> {
        self.enter(AgentRole::IntentClassifier).await?;
        Ok(self.intent)
    }
}

#[async_trait]
impl ProcessOutliner for MockAgent {
    async fn outline(&self, _augmented_request: &str) -> Result<ProcessDefinition, AgentError> {
        self.enter(AgentRole::ProcessOutliner).await?;
        if self.empty_outline {
            return Ok(ProcessDefinition::default());
        }

        let step = |id: &str, name: &str, role: &str, kind: &str| DefinitionStep {
            step_id: id.to_string(),
            name: name.to_string(),
            role: Some(role.to_string()),
            description: None,
            step_type: Some(kind.to_string()),
        };

        Ok(ProcessDefinition {
            topic: "Leave Request".to_string(),
            steps: vec![
                step("step_1", "Submit Leave Request", "Employee", "ACTION"),
                step("step_2", "Review Request", "Manager", "DECISION"),
                step("step_3", "Notify Employee", "System", "ACTION"),
            ],
        })
    }
}

#[async_trait]
impl ProcessArchitect for MockAgent {
    async fn transform(&self, _definition: &ProcessDefinition) -> Result<ProcessMap, AgentError> {
        self.enter(AgentRole::ProcessArchitect).await?;
        Ok(self.next_map(leave_request_map()))
    }

    async fn fix(
        &self,
        _definition: &ProcessDefinition,
        _invalid: &ProcessMap,
        _error: &str,
    ) -> Result<ProcessMap, AgentError> {
        self.enter(AgentRole::ProcessArchitect).await?;
        Ok(self.next_map(leave_request_map()))
    }
}

#[async_trait]
impl PartialModifier for MockAgent {
    async fn modify(&self, current: &ProcessMap, _instruction: &str) -> Result<ProcessMap, AgentError> {
        self.enter(AgentRole::PartialModifier).await?;
        // Repair passes hand back the broken draft; start over from it.
        let base = ProcessMap {
            activities: current
                .activities
                .iter()
                .filter(|a| a.id != "node_archive")
                .cloned()
                .map(|mut a| {
                    if a.next_activity_id.as_deref() == Some(MOCK_DANGLING_TARGET) {
                        a.next_activity_id = Some(TERMINAL_NODE_ID.to_string());
                    }
                    a
                })
                .collect(),
            ..current.clone()
        };
        Ok(self.next_map(append_archive_step(&base)))
    }
}

#[async_trait]
impl DataModeler for MockAgent {
    async fn derive_data(&self, _request: &str, map: &ProcessMap) -> Result<DataSchema, AgentError> {
        self.enter(AgentRole::DataModeler).await?;

        let entities: Vec<DataEntity> = map
            .activities
            .iter()
            .filter(|a| a.node_type == NodeType::UserTask)
            .map(|a| DataEntity {
                id: format!("ent_{}", a.id.trim_start_matches("node_")),
                alias: format!("{}Note", to_alias(&a.label)),
                label: format!("{} Note", a.label),
                entity_type: "string".to_string(),
                source_node_id: Some(a.id.clone()),
                required: true,
            })
            .collect();

        let groups = vec![DataEntityGroup {
            id: "grp_request".to_string(),
            name: "Request Details".to_string(),
            entity_ids: entities.iter().map(|e| e.id.clone()).collect(),
        }];

        Ok(DataSchema { entities, groups })
    }
}

#[async_trait]
impl FormDesigner for MockAgent {
    async fn derive_form(
        &self,
        _request: &str,
        map: &ProcessMap,
        schema: &DataSchema,
    ) -> Result<FormLayout, AgentError> {
        self.enter(AgentRole::FormDesigner).await?;

        let fields = schema
            .entities
            .iter()
            .map(|entity| {
                let source = entity.source_node_id.clone().unwrap_or_default();
                let readonly = map
                    .activities
                    .iter()
                    .filter(|a| a.id != source && a.node_type == NodeType::UserTask)
                    .map(|a| a.id.clone())
                    .collect();
                FormField {
                    id: format!("fld_{}", entity.id.trim_start_matches("ent_")),
                    entity_alias: entity.alias.clone(),
                    label: entity.label.clone(),
                    component: "input_text".to_string(),
                    required: entity.required,
                    visible_activity_ids: vec![source],
                    readonly_activity_ids: readonly,
                }
            })
            .collect();

        Ok(FormLayout {
            form_definitions: vec![FormDefinition {
                form_name: format!("{} Form", map.process_name),
                field_groups: vec![FormFieldGroup {
                    id: "grp_main".to_string(),
                    name: "Main".to_string(),
                    fields,
                }],
            }],
        })
    }
}

#[async_trait]
impl FlowAnalyst for MockAgent {
    async fn analyze(&self, _nodes: &[Value], _edges: &[Value]) -> Result<Vec<AnalysisResult>, AgentError> {
        self.enter(AgentRole::FlowAnalyst).await?;
        Ok(self.semantic_findings.clone())
    }

    async fn fix_graph(&self, request: &FixGraphRequest) -> Result<GraphSnapshot, AgentError> {
        self.enter(AgentRole::FlowAnalyst).await?;

        let mut snapshot = request.graph_snapshot.clone();
        let Some(target) = request.error.target_node_id.clone() else {
            return Ok(snapshot);
        };

        let find_id = |kinds: [&str; 2]| {
            snapshot
                .nodes
                .iter()
                .find(|n| kinds.contains(&node_type_of(n).as_str()))
                .and_then(|n| n.get("id").and_then(Value::as_str))
                .map(str::to_string)
        };
        let start_id = find_id(["start", "start_event"]);
        let end_id = find_id(["end", "end_event"]);

        match request.error.kind.as_str() {
            "MISSING_LABEL" => {
                if let Some(node) = snapshot
                    .nodes
                    .iter_mut()
                    .find(|n| n.get("id").and_then(Value::as_str) == Some(target.as_str()))
                {
                    node["data"]["label"] = json!("Untitled Step");
                }
            }
            "MISSING_INPUT" | "DISCONNECTED_END" => {
                if let Some(source) = start_id {
                    snapshot.edges.push(json!({
                        "id": format!("edge_fix_{}", target),
                        "source": source,
                        "target": target,
                    }));
                }
            }
            "MISSING_OUTPUT" | "DISCONNECTED_START" => {
                if let Some(end) = end_id {
                    snapshot.edges.push(json!({
                        "id": format!("edge_fix_{}", target),
                        "source": target,
                        "target": end,
                    }));
                }
            }
            _ => {}
        }

        Ok(snapshot)
    }
}
