//! Aggregated configuration loaded from `.copilot/`.

use crate::knowledge::KnowledgeSource;
use pc_protocol::{AgentProfile, OrchestratorSettings};

/// Unified application configuration.
///
/// - `config.toml`: orchestrator settings
/// - `agents/*.md`: one profile per collaborator role
/// - `knowledge/*.yaml`: knowledge sources referenced by submissions
///
/// # Example
///
/// ```rust,no_run
/// use pc_core::config::loader::load_config;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new(".")).await?;
/// println!("Loaded {} agent profiles and {} knowledge sources",
///          config.agents.len(),
///          config.knowledge.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub settings: OrchestratorSettings,
    pub agents: Vec<AgentProfile>,
    pub knowledge: Vec<KnowledgeSource>,
}
