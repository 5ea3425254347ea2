//! Agent abstraction and management.
//!
//! One trait per collaborator role, the `AgentManager` that bounds every
//! call with a timeout, and the adapters that implement the roles.

pub mod adapters;
pub mod base;
pub mod cli_executor;
pub mod factory;
pub mod manager;
pub mod role;

pub use adapters::{CommandAgent, MockAgent};
pub use base::{
    Agent, AgentError, AgentSet, DataModeler, FlowAnalyst, FormDesigner, InputGuard,
    IntentClassifier, PartialModifier, ProcessArchitect, ProcessOutliner,
};
pub use factory::AgentFactory;
pub use manager::AgentManager;
pub use role::{AgentKind, AgentRole};
