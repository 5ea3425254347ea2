//! Orchestrator settings from `.copilot/config.toml`.

use serde::Deserialize;
use serde::Serialize;
use ts_rs::TS;

/// Tunables of the stage orchestrator.
///
/// # Example
///
/// ```toml
/// # .copilot/config.toml
/// max_correction_attempts = 3
/// knowledge_char_limit = 3000
/// agent_timeout_secs = 60
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, TS)]
#[serde(default)]
pub struct OrchestratorSettings {
    /// Attempt ceiling of the self-correction loop, first generation included.
    pub max_correction_attempts: u32,

    /// Per-source character cap applied when building knowledge context.
    pub knowledge_char_limit: usize,

    /// Upper bound on a single agent call.
    pub agent_timeout_secs: u64,

    /// Intents reported below this confidence take the default branch.
    pub intent_confidence_floor: f32,

    /// Capacity of the graph-ready channel feeding downstream stages.
    pub signal_buffer: usize,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            max_correction_attempts: 3,
            knowledge_char_limit: 3000,
            agent_timeout_secs: 60,
            intent_confidence_floor: 0.5,
            signal_buffer: 64,
        }
    }
}
