//! Agent profile models for `.copilot/agents/*.md`.
//!
//! Profiles are Markdown files with YAML front matter. The front matter
//! names the role and how to reach the model; the body is the system
//! prompt sent with every call.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Configuration of one collaborator agent.
///
/// # Example
///
/// ```markdown
/// ---
/// name: process-architect
/// description: Turns an outline into a process map
/// model: gpt-4o-mini
/// command: copilot-llm
/// args: ["--json"]
/// ---
///
/// You are a system architect. Transform the process definition list...
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, TS)]
pub struct AgentProfile {
    /// Role identifier, e.g. `input-guard` or `process-architect`.
    pub name: String,

    #[serde(default)]
    pub description: String,

    /// Model identifier forwarded to the command. Models starting with
    /// `mock` select the built-in deterministic agent.
    pub model: String,

    /// Executable that serves this role.
    #[serde(default)]
    pub command: Option<String>,

    #[serde(default)]
    pub args: Vec<String>,

    /// Markdown body of the profile file.
    #[serde(skip)]
    pub system_prompt: String,
}
