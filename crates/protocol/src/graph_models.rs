//! Process map models produced by the architect and modifier agents.
//!
//! Only the structural shape matters to the engine: activity ids, the
//! default `nextActivityId` link, and the branch targets of gateways. The
//! remaining fields are carried through untouched for the renderer.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use ts_rs::TS;

/// Reserved id meaning "end of flow".
///
/// It is a virtual node: no activity carries this id, but every
/// `nextActivityId` or branch target may point at it.
pub const TERMINAL_NODE_ID: &str = "node_end";

/// Semantic type of a process node.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, TS)]
#[serde(rename_all = "snake_case")]
pub enum NodeType {
    /// A step requiring human interaction (form fill, approval).
    #[serde(alias = "USER_TASK")]
    UserTask,

    /// An automated system action (email, API call).
    #[serde(alias = "SERVICE_TASK")]
    ServiceTask,

    /// An exclusive branching point.
    #[serde(alias = "EXCLUSIVE_GATEWAY")]
    ExclusiveGateway,
}

impl NodeType {
    /// Gateways may leave `nextActivityId` empty; tasks may not.
    pub fn is_gateway(self) -> bool {
        matches!(self, NodeType::ExclusiveGateway)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            NodeType::UserTask => "user_task",
            NodeType::ServiceTask => "service_task",
            NodeType::ExclusiveGateway => "exclusive_gateway",
        }
    }
}

impl std::fmt::Display for NodeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One outgoing branch of a gateway.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
#[serde(rename_all = "camelCase")]
pub struct BranchCondition {
    /// Expression over process variables, e.g. `{{ node_review.decision }} == 'APPROVE'`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expression: Option<String>,

    /// Activity id (or the terminal sentinel) taken when the expression holds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_activity_id: Option<String>,
}

/// Type-dependent node configuration.
///
/// A single flat record is used for every node type; fields that do not
/// apply to a node are simply absent.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq, TS)]
#[serde(rename_all = "camelCase")]
pub struct NodeConfiguration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_type: Option<String>,

    /// Who performs the task (a role name or a binding expression).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub participant_role: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub form_key: Option<String>,

    /// Renders approve/reject actions when true.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_approval: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_duration: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_count: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_next_activity_id: Option<String>,

    /// Gateway branches, evaluated in order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<BranchCondition>,
}

/// A single node of the process map.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, TS)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    /// Unique snake_case identifier, e.g. `node_step_1_submit`.
    pub id: String,

    #[serde(rename = "type")]
    pub node_type: NodeType,

    #[serde(default)]
    pub label: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub swimlane_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub configuration: Option<NodeConfiguration>,

    /// Data bindings: input field of this node to `#{SourceNode.Alias}`.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub input_mapping: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<BTreeMap<String, f64>>,

    /// Default sequence flow. Required for tasks; the "else" path for gateways.
    #[serde(default)]
    pub next_activity_id: Option<String>,
}

impl Activity {
    /// Branch conditions of this node, empty when it has none.
    pub fn conditions(&self) -> &[BranchCondition] {
        self.configuration
            .as_ref()
            .map(|c| c.conditions.as_slice())
            .unwrap_or(&[])
    }

    pub fn participant_role(&self) -> Option<&str> {
        self.configuration
            .as_ref()
            .and_then(|c| c.participant_role.as_deref())
    }
}

/// A lane grouping activities by participant.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
#[serde(rename_all = "camelCase")]
pub struct Swimlane {
    pub swimlane_id: String,
    pub name: String,
    #[serde(default)]
    pub next_swimlane_id: Option<String>,
}

/// The generated process graph.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, TS)]
#[serde(rename_all = "camelCase")]
pub struct ProcessMap {
    #[serde(default)]
    pub process_name: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub swimlanes: Vec<Swimlane>,

    /// Activities in forward flow order.
    #[serde(default)]
    pub activities: Vec<Activity>,
}

impl ProcessMap {
    pub fn activity(&self, id: &str) -> Option<&Activity> {
        self.activities.iter().find(|a| a.id == id)
    }

    pub fn gateways(&self) -> impl Iterator<Item = &Activity> {
        self.activities.iter().filter(|a| a.node_type.is_gateway())
    }

    pub fn tasks(&self) -> impl Iterator<Item = &Activity> {
        self.activities.iter().filter(|a| !a.node_type.is_gateway())
    }
}
