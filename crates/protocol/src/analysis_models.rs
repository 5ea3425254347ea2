//! Audit findings and the loose node/edge snapshot they are computed from.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

/// A single audit finding.
///
/// `kind` is an open vocabulary (`MISSING_LABEL`, `MISSING_INPUT`, or
/// whatever the semantic analyst reports), so it stays a string.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    /// Offending node; `None` for graph-wide findings.
    #[serde(default)]
    pub target_node_id: Option<String>,

    pub severity: Severity,

    #[serde(rename = "type")]
    pub kind: String,

    pub message: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl AnalysisResult {
    pub fn new(
        target_node_id: impl Into<String>,
        severity: Severity,
        kind: &str,
        message: &str,
        suggestion: &str,
    ) -> Self {
        Self {
            target_node_id: Some(target_node_id.into()),
            severity,
            kind: kind.to_string(),
            message: message.to_string(),
            suggestion: Some(suggestion.to_string()),
        }
    }
}

/// Raw canvas snapshot as sent by an editor.
///
/// Nodes and edges are kept as JSON values: the editor decides their
/// shape, and the analyzer only reads `id`, `type`, `label`/`data.label`,
/// `source` and `target`.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, TS)]
pub struct GraphSnapshot {
    pub nodes: Vec<serde_json::Value>,
    pub edges: Vec<serde_json::Value>,
}

/// Request to repair a snapshot for one previously reported finding.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, TS)]
#[serde(rename_all = "camelCase")]
pub struct FixGraphRequest {
    pub graph_snapshot: GraphSnapshot,
    pub error: AnalysisResult,
}
