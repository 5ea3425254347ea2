//! Agent factory for building the role set from agent profiles.

use crate::agents::adapters::{CommandAgent, MockAgent};
use crate::agents::base::{AgentError, AgentSet};
use crate::agents::role::{AgentKind, AgentRole};
use pc_protocol::AgentProfile;
use std::path::Path;
use std::sync::Arc;

/// Factory for creating agent instances based on configuration.
pub struct AgentFactory;

enum Built {
    Command(Arc<CommandAgent>),
    Mock(Arc<MockAgent>),
}

impl AgentFactory {
    /// Build one agent per role from the loaded profiles.
    ///
    /// # Arguments
    ///
    /// * `profiles` - Profiles from `.copilot/agents/*.md`
    /// * `working_dir` - Directory command agents run in
    ///
    /// # Behavior
    ///
    /// - Each role uses the profile whose `name` resolves to it
    ///   (see [`AgentRole::from_name`]); the first match wins
    /// - `mock*` models get the built-in [`MockAgent`]
    /// - Other models run their `command` through [`CommandAgent`]
    /// - A role without a usable profile is `AgentError::NotAvailable`
    ///
    /// # Examples
    ///
    /// ```
    /// use pc_core::agents::AgentFactory;
    /// use pc_core::agents::AgentRole;
    /// use pc_protocol::AgentProfile;
    ///
    /// let profiles: Vec<AgentProfile> = AgentRole::ALL
    ///     .iter()
    ///     .map(|role| AgentProfile {
    ///         name: role.name().to_string(),
    ///         description: String::new(),
    ///         model: "mock".to_string(),
    ///         command: None,
    ///         args: vec![],
    ///         system_prompt: String::new(),
    ///     })
    ///     .collect();
    ///
    /// let agents = AgentFactory::build(&profiles, std::path::Path::new(".")).unwrap();
    /// ```
    pub fn build(profiles: &[AgentProfile], working_dir: &Path) -> Result<AgentSet, AgentError> {
        macro_rules! pick {
            ($role:expr, $slot:ty) => {{
                let agent: Arc<$slot> = match Self::create($role, profiles, working_dir)? {
                    Built::Command(a) => a,
                    Built::Mock(a) => a,
                };
                agent
            }};
        }

        use crate::agents::base::{
            DataModeler, FlowAnalyst, FormDesigner, InputGuard, IntentClassifier, PartialModifier,
            ProcessArchitect, ProcessOutliner,
        };

        Ok(AgentSet {
            guard: pick!(AgentRole::InputGuard, dyn InputGuard),
            classifier: pick!(AgentRole::IntentClassifier, dyn IntentClassifier),
            outliner: pick!(AgentRole::ProcessOutliner, dyn ProcessOutliner),
            architect: pick!(AgentRole::ProcessArchitect, dyn ProcessArchitect),
            modifier: pick!(AgentRole::PartialModifier, dyn PartialModifier),
            data_modeler: pick!(AgentRole::DataModeler, dyn DataModeler),
            form_designer: pick!(AgentRole::FormDesigner, dyn FormDesigner),
            analyst: pick!(AgentRole::FlowAnalyst, dyn FlowAnalyst),
        })
    }

    /// The built-in deterministic agent in every role.
    pub fn mock_set() -> AgentSet {
        AgentSet::uniform(Arc::new(MockAgent::success()))
    }

    fn create(role: AgentRole, profiles: &[AgentProfile], working_dir: &Path) -> Result<Built, AgentError> {
        let profile = profiles
            .iter()
            .find(|p| AgentRole::from_name(&p.name) == Some(role))
            .ok_or_else(|| AgentError::NotAvailable(format!("No agent profile for role '{}'", role)))?;

        match AgentKind::from_profile(&profile.model, profile.command.as_deref()) {
            Some(AgentKind::Mock) => Ok(Built::Mock(Arc::new(MockAgent::success()))),
            Some(AgentKind::Command) => Ok(Built::Command(Arc::new(CommandAgent::new(
                role,
                profile,
                working_dir.to_path_buf(),
            )?))),
            None => Err(AgentError::NotAvailable(format!(
                "Profile '{}' uses model '{}' but names no command",
                profile.name, profile.model
            ))),
        }
    }
}
