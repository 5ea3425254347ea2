//! Configuration loading and management.
//!
//! Loads orchestrator settings, agent profiles and knowledge sources from
//! the `.copilot/` directory.

pub mod error;
pub mod loader;
pub mod models;

pub use error::{ConfigError, ConfigResult};
pub use loader::load_config;
pub use models::AppConfig;
