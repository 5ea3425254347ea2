//! # pc-protocol
//!
//! Core protocol definitions and data models for process-copilot.
//!
//! This crate defines all shared data structures used for:
//! - Configuration file parsing (TOML settings, Markdown agent profiles)
//! - Job snapshots returned to polling clients
//! - Generated artifacts (process map, data schema, form layout)
//! - Audit findings and editor graph snapshots
//!
//! ## Modules
//!
//! - [`agent_models`]: Agent profile structures
//! - [`analysis_models`]: Audit findings and node/edge snapshots
//! - [`config_models`]: Orchestrator settings from config.toml
//! - [`design_models`]: Outline, data schema and form layout
//! - [`graph_models`]: Process map and the terminal sentinel
//! - [`ipc`]: Submissions, agent verdicts and the graph-ready signal
//! - [`job_models`]: Job, progress steps and artifacts
//!
//! ## Design Principles
//!
//! - Minimal dependencies: Only serde, ts-rs, chrono and uuid
//! - TypeScript generation: All types derive `TS` for client compatibility
//! - Independent compilation: No dependencies on other process-copilot crates

pub mod agent_models;
pub mod analysis_models;
pub mod config_models;
pub mod design_models;
pub mod graph_models;
pub mod ipc;
pub mod job_models;

// Re-export all public types for convenience
pub use agent_models::*;
pub use analysis_models::*;
pub use config_models::*;
pub use design_models::*;
pub use graph_models::*;
pub use ipc::*;
pub use job_models::*;
