//! Projection of a `ProcessMap` onto the editor's node/edge shape.

use pc_protocol::{GraphSnapshot, ProcessMap, TERMINAL_NODE_ID};
use serde_json::{json, Value};
use std::collections::HashSet;

/// Id of the synthetic start node.
pub const START_NODE_ID: &str = "node_start";

/// Build the snapshot the analyzer audits.
///
/// Adds a `start_event` linked to the first activity and, when anything
/// points at the terminal sentinel, an `end_event` carrying that id.
/// Edges come from `nextActivityId` and every branch target; duplicates
/// are collapsed.
pub fn snapshot_of(map: &ProcessMap) -> GraphSnapshot {
    let mut nodes = Vec::with_capacity(map.activities.len() + 2);
    let mut edges = Vec::new();
    let mut seen = HashSet::new();

    let mut push_edge = |edges: &mut Vec<Value>, source: &str, target: &str| {
        if seen.insert((source.to_string(), target.to_string())) {
            edges.push(json!({
                "id": format!("edge_{}_{}", source, target),
                "source": source,
                "target": target,
            }));
        }
    };

    nodes.push(json!({
        "id": START_NODE_ID,
        "type": "start_event",
        "data": { "label": "Start" },
    }));
    if let Some(first) = map.activities.first() {
        push_edge(&mut edges, START_NODE_ID, &first.id);
    }

    let mut references_end = false;
    for activity in &map.activities {
        nodes.push(json!({
            "id": activity.id,
            "type": activity.node_type.as_str(),
            "data": { "label": activity.label },
        }));

        let targets = activity
            .next_activity_id
            .iter()
            .map(String::as_str)
            .chain(activity.conditions().iter().filter_map(|c| c.target_activity_id.as_deref()));

        for target in targets {
            references_end |= target == TERMINAL_NODE_ID;
            push_edge(&mut edges, &activity.id, target);
        }
    }

    if references_end {
        nodes.push(json!({
            "id": TERMINAL_NODE_ID,
            "type": "end_event",
            "data": { "label": "End" },
        }));
    }

    GraphSnapshot { nodes, edges }
}
