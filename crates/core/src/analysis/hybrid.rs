//! Hybrid analyzer.
//!
//! Two passes over an editor snapshot:
//! 1. Deterministic rules on labels and node degrees. Never fails; a
//!    malformed snapshot yields no findings.
//! 2. The semantic analyst agent. Best-effort; its failure is logged and
//!    only the deterministic findings are returned.
//!
//! Findings are concatenated in that order without deduplication.

use crate::agents::AgentManager;
use pc_protocol::{AnalysisResult, GraphSnapshot, ProcessMap, Severity};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

use super::projection::snapshot_of;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SnapshotError {
    #[error("Graph snapshot is missing the '{0}' array")]
    MissingCollection(&'static str),

    #[error("{collection}[{index}] has no string '{field}'")]
    MissingField {
        collection: &'static str,
        index: usize,
        field: &'static str,
    },
}

pub struct HybridAnalyzer {
    agents: Arc<AgentManager>,
}

impl HybridAnalyzer {
    pub fn new(agents: Arc<AgentManager>) -> Self {
        Self { agents }
    }

    /// Run both passes over a snapshot.
    pub async fn analyze(&self, nodes: &[Value], edges: &[Value]) -> Vec<AnalysisResult> {
        let mut results = Self::deterministic(nodes, edges);

        match self.agents.analyze(nodes, edges).await {
            Ok(semantic) => results.extend(semantic),
            Err(e) => tracing::warn!(error = %e, "Semantic analysis failed, keeping rule-based findings"),
        }

        results
    }

    /// Audit a generated process map through its snapshot projection.
    pub async fn analyze_map(&self, map: &ProcessMap) -> Vec<AnalysisResult> {
        let GraphSnapshot { nodes, edges } = snapshot_of(map);
        self.analyze(&nodes, &edges).await
    }

    /// Audit a raw `{ "nodes": [...], "edges": [...] }` document.
    ///
    /// # Errors
    ///
    /// `SnapshotError::MissingCollection` when either array is absent.
    pub async fn analyze_value(&self, graph: &Value) -> Result<Vec<AnalysisResult>, SnapshotError> {
        let nodes = collection(graph, "nodes")?;
        let edges = collection(graph, "edges")?;
        Ok(self.analyze(nodes, edges).await)
    }

    /// Rule-based pass.
    pub fn deterministic(nodes: &[Value], edges: &[Value]) -> Vec<AnalysisResult> {
        match check_rules(nodes, edges) {
            Ok(results) => results,
            Err(e) => {
                tracing::error!(error = %e, "Rule-based analysis skipped");
                Vec::new()
            }
        }
    }
}

fn collection<'a>(graph: &'a Value, name: &'static str) -> Result<&'a [Value], SnapshotError> {
    graph
        .get(name)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .ok_or(SnapshotError::MissingCollection(name))
}

fn string_field<'a>(
    value: &'a Value,
    collection: &'static str,
    index: usize,
    field: &'static str,
) -> Result<&'a str, SnapshotError> {
    value
        .get(field)
        .and_then(Value::as_str)
        .ok_or(SnapshotError::MissingField {
            collection,
            index,
            field,
        })
}

/// An edge endpoint that may still be unset while the edge is being drawn.
/// Absent or null is `None`; any other non-string value is an error.
fn edge_endpoint<'a>(
    edge: &'a Value,
    index: usize,
    field: &'static str,
) -> Result<Option<&'a str>, SnapshotError> {
    match edge.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(_) => string_field(edge, "edges", index, field).map(Some),
    }
}

/// `data.label` when `data` is an object, the top-level `label` otherwise.
fn label_of(node: &Value) -> Option<&str> {
    match node.get("data") {
        Some(data) if data.is_object() => data.get("label").and_then(Value::as_str),
        _ => node.get("label").and_then(Value::as_str),
    }
}

fn check_rules(nodes: &[Value], edges: &[Value]) -> Result<Vec<AnalysisResult>, SnapshotError> {
    let mut incoming: HashMap<&str, usize> = HashMap::new();
    let mut outgoing: HashMap<&str, usize> = HashMap::new();

    for (index, edge) in edges.iter().enumerate() {
        let source = edge_endpoint(edge, index, "source")?;
        let target = edge_endpoint(edge, index, "target")?;
        if source.is_none() || target.is_none() {
            tracing::debug!(index, "Edge with a missing endpoint, counting the connected side only");
        }
        if let Some(source) = source {
            *outgoing.entry(source).or_default() += 1;
        }
        if let Some(target) = target {
            *incoming.entry(target).or_default() += 1;
        }
    }

    let mut results = Vec::new();
    for (index, node) in nodes.iter().enumerate() {
        let id = string_field(node, "nodes", index, "id")?;
        let node_type = node.get("type").and_then(Value::as_str).unwrap_or_default();
        let ins = incoming.get(id).copied().unwrap_or(0);
        let outs = outgoing.get(id).copied().unwrap_or(0);

        if label_of(node).map_or(true, |l| l.trim().is_empty()) {
            results.push(AnalysisResult::new(
                id,
                Severity::Warning,
                "MISSING_LABEL",
                "The step name is empty.",
                "Please provide a clear name for this step.",
            ));
        }

        let is_start = node_type.eq_ignore_ascii_case("start") || node_type.eq_ignore_ascii_case("start_event");
        let is_end = node_type.eq_ignore_ascii_case("end") || node_type.eq_ignore_ascii_case("end_event");

        if is_start {
            if outs == 0 {
                results.push(AnalysisResult::new(
                    id,
                    Severity::Error,
                    "DISCONNECTED_START",
                    "The start point is not connected.",
                    "Please connect the start event to the first step.",
                ));
            }
        } else if is_end {
            if ins == 0 {
                results.push(AnalysisResult::new(
                    id,
                    Severity::Error,
                    "DISCONNECTED_END",
                    "The end point is not connected.",
                    "Please connect a line to the end event.",
                ));
            }
        } else {
            if ins == 0 {
                results.push(AnalysisResult::new(
                    id,
                    Severity::Error,
                    "MISSING_INPUT",
                    "This step is not reachable from the previous stage.",
                    "Please connect a line from the previous step.",
                ));
            }
            if outs == 0 {
                results.push(AnalysisResult::new(
                    id,
                    Severity::Error,
                    "MISSING_OUTPUT",
                    "This step has no outgoing connection.",
                    "Please connect this to the next step or the end event.",
                ));
            }
        }
    }

    Ok(results)
}
