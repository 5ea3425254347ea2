//! Custom assertion helpers for integration tests.

use pc_core::JobManager;
use pc_protocol::{Job, ProcessMap, StepStatus, TERMINAL_NODE_ID};
use std::time::Duration;
use uuid::Uuid;

/// Poll until the job is COMPLETED or FAILED, collecting every observed
/// version.
///
/// Panics after five seconds.
#[allow(dead_code)]
pub async fn wait_for_terminal(manager: &JobManager, job_id: Uuid) -> (Job, Vec<u64>) {
    let mut versions = Vec::new();
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);

    while tokio::time::Instant::now() < deadline {
        let job = manager.poll(job_id).await.expect("submitted job must exist");
        versions.push(job.version);
        if job.state.is_terminal() {
            return (job, versions);
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    panic!("Job {} did not reach a terminal state", job_id);
}

/// Assert the step exists with the given status.
#[allow(dead_code)]
pub fn assert_step(job: &Job, step_id: &str, status: StepStatus) {
    let step = job
        .progress_step(step_id)
        .unwrap_or_else(|| panic!("step '{}' missing from {:?}", step_id, job.progress_steps));
    assert_eq!(step.status, status, "step '{}' has label '{}'", step_id, step.label);
}

/// Ids of the job's progress steps in order.
#[allow(dead_code)]
pub fn step_ids(job: &Job) -> Vec<&str> {
    job.progress_steps.iter().map(|s| s.id.as_str()).collect()
}

#[allow(dead_code)]
pub fn assert_non_decreasing(versions: &[u64]) {
    for pair in versions.windows(2) {
        assert!(pair[0] <= pair[1], "version went backwards: {:?}", versions);
    }
}

/// A leave-request style map: a task with a participant role and a
/// gateway whose reject path loops back instead of ending the flow.
#[allow(dead_code)]
pub fn assert_approval_shape(map: &ProcessMap) {
    assert!(
        map.tasks().any(|a| a.participant_role().is_some()),
        "no task carries a participant role"
    );

    let gateway = map
        .gateways()
        .find(|g| g.conditions().len() >= 2)
        .expect("no gateway with at least two branches");

    let reject = gateway
        .conditions()
        .iter()
        .find(|c| {
            c.expression
                .as_deref()
                .is_some_and(|e| e.to_uppercase().contains("REJECT"))
        })
        .expect("gateway has no reject branch");
    assert_ne!(reject.target_activity_id.as_deref(), Some(TERMINAL_NODE_ID));
}
