//! # pc-core
//!
//! Stage orchestration engine for process-copilot.
//!
//! This crate provides:
//! - Configuration loading from the `.copilot/` directory
//! - Collaborator traits for every agent role, with command and mock adapters
//! - The stage orchestrator and downstream worker
//! - The concurrent job store and the `JobManager` facade
//! - Structural validation with bounded self-correction
//! - Hybrid (rule-based plus semantic) graph analysis
//!
//! ## Modules
//!
//! - [`config`]: Configuration loading and management
//! - [`agents`]: Agent traits, adapters and the timeout-bounded manager
//! - [`engine`]: Stage orchestration
//! - [`state`]: Job store and manager
//! - [`validation`]: Structural validator and self-correction loop
//! - [`analysis`]: Hybrid analyzer
//! - [`knowledge`]: Knowledge sources and prompt context

pub mod agents;
pub mod analysis;
pub mod config;
pub mod engine;
pub mod error;
pub mod knowledge;
pub mod logging;
pub mod state;
pub mod validation;

pub use error::{PipelineError, PipelineResult};
pub use state::JobManager;
