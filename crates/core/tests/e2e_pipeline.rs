//! E2E tests for job execution.
//!
//! These tests drive the `JobManager` the way a client does: submit,
//! then poll until the job is terminal. They cover:
//! - The full design path through the downstream stages
//! - Modification, analysis and conversational branches
//! - Self-correction and failure handling
//! - Knowledge context and configuration wiring

mod common;

use common::*;
use pc_core::agents::{AgentFactory, AgentRole, AgentSet, MockAgent};
use pc_core::config::load_config;
use pc_core::knowledge::KnowledgeStore;
use pc_core::JobManager;
use pc_protocol::{
    GuardVerdict, Intent, JobState, OrchestratorSettings, Severity, StepStatus, SubmitRequest,
};
use std::sync::Arc;
use std::time::Duration;

/// Scenario: employee leave request with manager approval.
///
/// Acceptance criteria:
/// 1. Job ends COMPLETED with the final architecture message
/// 2. Steps run in order and all complete
/// 3. All three artifacts and their durations are stored
/// 4. The map has a role-bearing task and a looping reject branch
#[tokio::test]
async fn test_leave_request_design_completes() {
    // Given: every role served by the deterministic mock
    let manager = create_mock_manager(MockAgent::success());

    // When: a design request is submitted and polled to the end
    let job_id = manager
        .submit(SubmitRequest::new("employee leave request with manager approval"))
        .await;
    let (job, versions) = wait_for_terminal(&manager, job_id).await;

    // Then
    assert_eq!(job.state, JobState::Completed);
    assert_eq!(job.message, "Architecture Completed Successfully.");
    assert_eq!(
        step_ids(&job),
        vec!["val", "intent", "outline", "map", "data", "form", "audit"]
    );
    assert!(job.progress_steps.iter().all(|s| s.status == StepStatus::Completed));
    assert_eq!(job.progress_step("intent").unwrap().label, "Intent identified: DESIGN");

    for stage in ["PROCESS", "DATA", "FORM"] {
        assert!(job.stage_durations.contains_key(stage), "missing duration for {}", stage);
    }
    assert_eq!(job.last_updated_stage, "FORM");

    let map = job.artifacts.process_map.as_ref().unwrap();
    assert_approval_shape(map);
    assert!(job.artifacts.data_schema.is_some());
    assert!(job.artifacts.form_layout.is_some());

    assert_non_decreasing(&versions);
    assert!(job.version > 0);
}

#[tokio::test]
async fn test_modify_without_map_fails_immediately() {
    let manager = create_mock_manager(MockAgent::success().with_intent(Intent::Modify));

    let job_id = manager.submit(SubmitRequest::new("add an archive step")).await;
    let (job, _) = wait_for_terminal(&manager, job_id).await;

    assert_eq!(job.state, JobState::Failed);
    assert_eq!(job.message, "No process context found to modify.");
    assert!(job.stage_durations.is_empty());
    assert!(job.artifacts.process_map.is_none());
}

#[tokio::test]
async fn test_modify_with_map_synchronizes_downstream() {
    let manager = create_mock_manager(MockAgent::success().with_intent(Intent::Modify));
    let current = pc_core::agents::adapters::mock_agent::leave_request_map();

    let job_id = manager
        .submit(SubmitRequest::new("archive the request at the end").with_current_process(current))
        .await;
    let (job, _) = wait_for_terminal(&manager, job_id).await;

    assert_eq!(job.state, JobState::Completed);
    for step in ["diff", "modify", "sync", "data", "form", "audit"] {
        assert_step(&job, step, StepStatus::Completed);
    }
    let map = job.artifacts.process_map.as_ref().unwrap();
    assert!(map.activity("node_archive").is_some());
}

#[tokio::test]
async fn test_self_correction_recovers_within_ceiling() {
    let agent = MockAgent::success().with_invalid_drafts(2);
    let manager = create_mock_manager(agent.clone());

    let job_id = manager.submit(SubmitRequest::new("leave request")).await;
    let (job, _) = wait_for_terminal(&manager, job_id).await;

    assert_eq!(job.state, JobState::Completed);
    assert_eq!(agent.map_calls(), 3);
    assert!(pc_core::validation::validate(job.artifacts.process_map.as_ref().unwrap()).is_ok());
}

#[tokio::test]
async fn test_fix_receives_validation_error_text() {
    // Given: an architect whose first draft has a dangling successor
    let architect = Arc::new(ScriptedArchitect::new(vec![create_dangling_map()]));
    let mut agents = AgentSet::uniform(Arc::new(MockAgent::success()));
    agents.architect = architect.clone();
    let manager = create_manager(agents);

    // When
    let job_id = manager.submit(SubmitRequest::new("leave request")).await;
    let (job, _) = wait_for_terminal(&manager, job_id).await;

    // Then: the fix call saw the validator's message
    assert_eq!(job.state, JobState::Completed);
    let errors = architect.fix_errors.lock().unwrap();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("['t1']"));
    assert!(errors[0].contains("['t_missing']"));
}

#[tokio::test]
async fn test_exhausted_ceiling_fails_job() {
    let architect = Arc::new(ScriptedArchitect::new(vec![create_dangling_map(); 5]));
    let mut agents = AgentSet::uniform(Arc::new(MockAgent::success()));
    agents.architect = architect.clone();
    let manager = create_manager(agents);

    let job_id = manager.submit(SubmitRequest::new("leave request")).await;
    let (job, _) = wait_for_terminal(&manager, job_id).await;

    assert_eq!(job.state, JobState::Failed);
    assert!(job.message.contains("after 3 attempts"));
    assert!(job.message.contains("t_missing"));
    assert_step(&job, "map", StepStatus::Failed);
    assert_eq!(architect.fix_errors.lock().unwrap().len(), 2);
    assert!(job.progress_step("data").is_none());
}

#[tokio::test]
async fn test_guard_rejection_completes_with_guidance() {
    let manager = create_mock_manager(
        MockAgent::success().with_guard(GuardVerdict::rejected("I can only help with business processes.")),
    );

    let job_id = manager.submit(SubmitRequest::new("tell me a joke")).await;
    let (job, _) = wait_for_terminal(&manager, job_id).await;

    assert_eq!(job.state, JobState::Completed);
    assert_eq!(job.message, "I can only help with business processes.");
    assert_eq!(step_ids(&job), vec!["val"]);
}

#[tokio::test]
async fn test_chat_intent_is_inquiry() {
    let manager = create_mock_manager(MockAgent::success().with_intent(Intent::Chat));

    let job_id = manager.submit(SubmitRequest::new("what can you do?")).await;
    let (job, _) = wait_for_terminal(&manager, job_id).await;

    assert_eq!(job.state, JobState::Completed);
    assert_eq!(job.message, "Inquiry processed.");
}

#[tokio::test]
async fn test_analyze_intent_stores_findings() {
    let manager = create_mock_manager(MockAgent::success().with_intent(Intent::Analyze));
    let mut current = pc_core::agents::adapters::mock_agent::leave_request_map();
    current.activities[1].label = String::new();

    let job_id = manager
        .submit(SubmitRequest::new("audit my process").with_current_process(current))
        .await;
    let (job, _) = wait_for_terminal(&manager, job_id).await;

    assert_eq!(job.state, JobState::Completed);
    assert_eq!(job.message, "Optimization audit complete.");
    assert_step(&job, "audit", StepStatus::Completed);
    let finding = job
        .analysis_results
        .iter()
        .find(|r| r.kind == "MISSING_LABEL")
        .expect("missing label finding");
    assert_eq!(finding.target_node_id.as_deref(), Some("node_review"));
    assert_eq!(finding.severity, Severity::Warning);
}

#[tokio::test]
async fn test_knowledge_context_reaches_outliner() {
    // Given: one registered knowledge source and a recording outliner
    let outliner = Arc::new(RecordingOutliner::default());
    let mut agents = AgentSet::uniform(Arc::new(MockAgent::success()));
    agents.outliner = outliner.clone();
    let manager = JobManager::new(
        agents,
        OrchestratorSettings::default(),
        KnowledgeStore::new(vec![create_leave_policy()]),
    );

    // When
    let request = SubmitRequest::new("leave request")
        .with_knowledge(vec!["leave-policy".to_string(), "unknown".to_string()]);
    let job_id = manager.submit(request).await;
    wait_for_terminal(&manager, job_id).await;

    // Then
    let prompts = outliner.prompts.lock().unwrap();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("USER REQUEST: \"leave request\""));
    assert!(prompts[0].contains("- [Source: leave-policy.pdf]\nEmployees receive fifteen days"));
    assert!(!prompts[0].contains("General standards."));
}

#[tokio::test]
async fn test_agent_timeout_fails_job() {
    let settings = OrchestratorSettings {
        agent_timeout_secs: 1,
        ..OrchestratorSettings::default()
    };
    let manager = JobManager::new(
        AgentSet::uniform(Arc::new(MockAgent::success().with_delay(Duration::from_millis(1500)))),
        settings,
        KnowledgeStore::default(),
    );

    let job_id = manager.submit(SubmitRequest::new("leave request")).await;
    let (job, _) = wait_for_terminal(&manager, job_id).await;

    assert_eq!(job.state, JobState::Failed);
    assert!(job.message.contains("timed out after 1s"));
    assert_step(&job, "val", StepStatus::Failed);
    assert!(job.progress_step("val").unwrap().label.ends_with(" (Failed)"));
}

#[tokio::test]
async fn test_downstream_failure_fails_job() {
    let manager = create_mock_manager(MockAgent::failing(AgentRole::DataModeler));

    let job_id = manager.submit(SubmitRequest::new("leave request")).await;
    let (job, _) = wait_for_terminal(&manager, job_id).await;

    assert_eq!(job.state, JobState::Failed);
    assert!(job.artifacts.process_map.is_some());
    assert_step(&job, "map", StepStatus::Completed);
    assert_step(&job, "data", StepStatus::Failed);
}

#[tokio::test]
async fn test_transformation_job_skips_guard() {
    let manager = create_mock_manager(
        MockAgent::success().with_guard(GuardVerdict::rejected("never consulted")),
    );

    let job_id = manager.submit_transformation(create_test_definition()).await;
    let (job, _) = wait_for_terminal(&manager, job_id).await;

    assert_eq!(job.state, JobState::Completed);
    assert_eq!(step_ids(&job), vec!["map", "data", "form", "audit"]);
}

#[tokio::test]
async fn test_concurrent_jobs_are_independent() {
    let manager = create_mock_manager(MockAgent::success());

    let mut ids = Vec::new();
    for i in 0..8 {
        ids.push(manager.submit(SubmitRequest::new(format!("request {}", i))).await);
    }

    for id in ids {
        let (job, _) = wait_for_terminal(&manager, id).await;
        assert_eq!(job.state, JobState::Completed);
        assert_eq!(job.id, id);
    }
    assert_eq!(manager.job_count().await, 8);
}

#[tokio::test]
async fn test_manager_from_loaded_config() {
    // Given: a project directory with mock profiles and a knowledge file
    let project = create_test_project().expect("Failed to create test project");
    let config = load_config(project.path()).await.expect("Failed to load config");
    assert_eq!(config.settings.max_correction_attempts, 2);

    let agents = AgentFactory::build(&config.agents, project.path()).expect("Failed to build agents");
    let manager = JobManager::new(agents, config.settings, KnowledgeStore::new(config.knowledge));

    // When
    let request = SubmitRequest::new("leave request").with_knowledge(vec!["leave-policy".to_string()]);
    let job_id = manager.submit(request).await;
    let (job, _) = wait_for_terminal(&manager, job_id).await;

    // Then
    assert_eq!(job.state, JobState::Completed);
}
