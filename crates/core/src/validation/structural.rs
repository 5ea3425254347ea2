//! Structural validator for process maps.
//!
//! A map is valid when every task names its successor and every successor
//! or branch target resolves to an activity id or [`TERMINAL_NODE_ID`].
//! Validation stops at the first violation.

use pc_protocol::{NodeType, ProcessMap, TERMINAL_NODE_ID};
use std::collections::HashSet;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StructuralError {
    #[error("Process must have at least one activity.")]
    EmptyProcess,

    #[error(
        "Flow Disconnected: Node ['{activity_id}'] (Type: {node_type}) has no nextActivityId. Use 'node_end' if it ends the process."
    )]
    FlowDisconnected {
        activity_id: String,
        node_type: NodeType,
    },

    #[error(
        "Structural Error Detected: Node ['{source_id}'] refers to non-existent node ['{target_id}'] as nextActivityId."
    )]
    DanglingReference { source_id: String, target_id: String },

    #[error(
        "Structural Error Detected: Branch condition in Node ['{source_id}'] refers to non-existent node ['{target_id}'] as targetActivityId."
    )]
    DanglingBranch { source_id: String, target_id: String },
}

/// Check `map` for missing successors and dangling references.
///
/// # Errors
///
/// The first violation found, checked in this order:
/// 1. no activities at all
/// 2. a task with no `nextActivityId`
/// 3. a `nextActivityId` outside the map
/// 4. a gateway branch target outside the map
pub fn validate(map: &ProcessMap) -> Result<(), StructuralError> {
    if map.activities.is_empty() {
        return Err(StructuralError::EmptyProcess);
    }

    let valid_ids: HashSet<&str> = map
        .activities
        .iter()
        .map(|a| a.id.as_str())
        .chain(std::iter::once(TERMINAL_NODE_ID))
        .collect();

    if let Some(task) = map.tasks().find(|a| a.next_activity_id.is_none()) {
        return Err(StructuralError::FlowDisconnected {
            activity_id: task.id.clone(),
            node_type: task.node_type,
        });
    }

    for activity in &map.activities {
        if let Some(next) = activity.next_activity_id.as_deref() {
            if !valid_ids.contains(next) {
                return Err(StructuralError::DanglingReference {
                    source_id: activity.id.clone(),
                    target_id: next.to_string(),
                });
            }
        }
    }

    for activity in &map.activities {
        let dangling = activity
            .conditions()
            .iter()
            .filter_map(|c| c.target_activity_id.as_deref())
            .find(|target| !valid_ids.contains(target));

        if let Some(target) = dangling {
            return Err(StructuralError::DanglingBranch {
                source_id: activity.id.clone(),
                target_id: target.to_string(),
            });
        }
    }

    Ok(())
}
