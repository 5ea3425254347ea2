//! Collaborator roles and how profiles select their implementation.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AgentRole {
    InputGuard,
    IntentClassifier,
    ProcessOutliner,
    ProcessArchitect,
    PartialModifier,
    DataModeler,
    FormDesigner,
    FlowAnalyst,
}

impl AgentRole {
    pub const ALL: [AgentRole; 8] = [
        AgentRole::InputGuard,
        AgentRole::IntentClassifier,
        AgentRole::ProcessOutliner,
        AgentRole::ProcessArchitect,
        AgentRole::PartialModifier,
        AgentRole::DataModeler,
        AgentRole::FormDesigner,
        AgentRole::FlowAnalyst,
    ];

    /// Resolve a role from an agent profile's `name`.
    ///
    /// Matching ignores case and accepts `_` in place of `-`.
    ///
    /// # Examples
    ///
    /// ```
    /// use pc_core::agents::AgentRole;
    ///
    /// assert_eq!(AgentRole::from_name("process-architect"), Some(AgentRole::ProcessArchitect));
    /// assert_eq!(AgentRole::from_name("Data_Modeler"), Some(AgentRole::DataModeler));
    /// assert_eq!(AgentRole::from_name("reviewer"), None);
    /// ```
    pub fn from_name(name: &str) -> Option<Self> {
        let normalized = name.trim().to_lowercase().replace('_', "-");
        Self::ALL.into_iter().find(|role| role.name() == normalized)
    }

    /// Profile name of the role.
    pub fn name(&self) -> &'static str {
        match self {
            Self::InputGuard => "input-guard",
            Self::IntentClassifier => "intent-classifier",
            Self::ProcessOutliner => "process-outliner",
            Self::ProcessArchitect => "process-architect",
            Self::PartialModifier => "partial-modifier",
            Self::DataModeler => "data-modeler",
            Self::FormDesigner => "form-designer",
            Self::FlowAnalyst => "flow-analyst",
        }
    }
}

impl std::fmt::Display for AgentRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Which adapter serves a profile.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AgentKind {
    /// External command speaking JSON over stdin/stdout.
    Command,
    /// Built-in deterministic agent.
    Mock,
}

impl AgentKind {
    /// Infer the adapter from a profile.
    ///
    /// Models starting with `mock` always get the built-in agent; anything
    /// else needs a command. Returns `None` when neither applies.
    pub fn from_profile(model: &str, command: Option<&str>) -> Option<Self> {
        if model.to_lowercase().starts_with("mock") {
            return Some(Self::Mock);
        }
        match command {
            Some(cmd) if !cmd.trim().is_empty() => Some(Self::Command),
            _ => None,
        }
    }
}
