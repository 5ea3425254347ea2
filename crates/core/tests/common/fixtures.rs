//! Test fixtures for creating sample configurations and test data.

use pc_core::agents::{AgentRole, AgentSet, MockAgent};
use pc_core::knowledge::{KnowledgeSource, KnowledgeStore};
use pc_core::JobManager;
use pc_protocol::{
    Activity, AgentProfile, DefinitionStep, NodeType, OrchestratorSettings, ProcessDefinition,
    ProcessMap, TERMINAL_NODE_ID,
};
use std::sync::Arc;
use tempfile::TempDir;

/// Create a temporary project directory with `.copilot` configuration.
///
/// This creates a complete test environment with:
/// - `.copilot/config.toml` lowering the correction ceiling to 2
/// - `.copilot/agents/` with a mock profile for every role
/// - `.copilot/knowledge/leave-policy.yaml`
///
/// Returns a TempDir that must be kept alive for the test duration.
#[allow(dead_code)]
pub fn create_test_project() -> std::io::Result<TempDir> {
    let temp_dir = tempfile::tempdir()?;
    let config_dir = temp_dir.path().join(".copilot");

    std::fs::create_dir_all(config_dir.join("agents"))?;
    std::fs::create_dir_all(config_dir.join("knowledge"))?;

    std::fs::write(
        config_dir.join("config.toml"),
        "max_correction_attempts = 2\nknowledge_char_limit = 40\n",
    )?;

    for role in AgentRole::ALL {
        let profile = format!(
            "---\nname: {}\ndescription: Test profile\nmodel: mock\n---\nYou are the {} agent.\n",
            role.name(),
            role.name()
        );
        std::fs::write(config_dir.join(format!("agents/{}.md", role.name())), profile)?;
    }

    std::fs::write(
        config_dir.join("knowledge/leave-policy.yaml"),
        "id: leave-policy\nfile_name: leave-policy.pdf\nextracted_text: Employees receive fifteen days of annual leave per year.\n",
    )?;

    Ok(temp_dir)
}

/// Mock profiles for every role, as the loader would return them.
#[allow(dead_code)]
pub fn mock_profiles() -> Vec<AgentProfile> {
    AgentRole::ALL
        .iter()
        .map(|role| AgentProfile {
            name: role.name().to_string(),
            description: String::new(),
            model: "mock".to_string(),
            command: None,
            args: vec![],
            system_prompt: String::new(),
        })
        .collect()
}

#[allow(dead_code)]
pub fn create_manager(agents: AgentSet) -> JobManager {
    JobManager::new(agents, OrchestratorSettings::default(), KnowledgeStore::default())
}

/// A manager whose every role is served by `agent`.
#[allow(dead_code)]
pub fn create_mock_manager(agent: MockAgent) -> JobManager {
    create_manager(AgentSet::uniform(Arc::new(agent)))
}

#[allow(dead_code)]
pub fn create_leave_policy() -> KnowledgeSource {
    KnowledgeSource {
        id: "leave-policy".to_string(),
        file_name: "leave-policy.pdf".to_string(),
        extracted_text: "Employees receive fifteen days of annual leave per year.".to_string(),
        description: String::new(),
    }
}

#[allow(dead_code)]
pub fn create_test_definition() -> ProcessDefinition {
    ProcessDefinition {
        topic: "Expense Claim".to_string(),
        steps: vec![
            DefinitionStep {
                step_id: "step_1".to_string(),
                name: "Submit Claim".to_string(),
                role: Some("Employee".to_string()),
                description: None,
                step_type: Some("ACTION".to_string()),
            },
            DefinitionStep {
                step_id: "step_2".to_string(),
                name: "Approve Claim".to_string(),
                role: Some("Finance".to_string()),
                description: None,
                step_type: Some("DECISION".to_string()),
            },
        ],
    }
}

#[allow(dead_code)]
pub fn create_task(id: &str, next: Option<&str>) -> Activity {
    Activity {
        id: id.to_string(),
        node_type: NodeType::UserTask,
        label: format!("Task {}", id),
        swimlane_id: None,
        description: None,
        configuration: None,
        input_mapping: Default::default(),
        position: None,
        next_activity_id: next.map(str::to_string),
    }
}

/// `t1 -> t_missing`: one dangling successor.
#[allow(dead_code)]
pub fn create_dangling_map() -> ProcessMap {
    ProcessMap {
        process_name: "Broken".to_string(),
        activities: vec![create_task("t1", Some("t_missing")), create_task("t2", Some(TERMINAL_NODE_ID))],
        ..Default::default()
    }
}
