//! Messages exchanged across the engine boundary.
//!
//! Inbound: what a transport submits (`SubmitRequest`). Agent replies:
//! the guardrail verdict and the classified intent. Internal hand-off:
//! the `GraphReady` signal that moves a job from primary generation to
//! the downstream stages.
//!
//! Uses camelCase field names so the same JSON works for web clients:
//! ```json
//! {
//!   "userPrompt": "employee leave request with manager approval",
//!   "knowledgeSourceIds": ["policy-handbook"],
//!   "currentProcess": null
//! }
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::graph_models::ProcessMap;

/// A chat-style submission.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRequest {
    /// Raw user request text.
    pub user_prompt: String,

    /// Knowledge sources to fold into the design prompt.
    #[serde(default)]
    pub knowledge_source_ids: Vec<String>,

    /// Previously generated map; required by modify requests.
    #[serde(default)]
    pub current_process: Option<ProcessMap>,
}

impl SubmitRequest {
    pub fn new(user_prompt: impl Into<String>) -> Self {
        Self {
            user_prompt: user_prompt.into(),
            ..Self::default()
        }
    }

    pub fn with_knowledge(mut self, ids: Vec<String>) -> Self {
        self.knowledge_source_ids = ids;
        self
    }

    pub fn with_current_process(mut self, map: ProcessMap) -> Self {
        self.current_process = Some(map);
        self
    }
}

/// Closed set of routable intents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Intent {
    /// Create a brand-new process map.
    Design,
    /// Edit an existing map.
    Modify,
    /// Audit an existing map.
    Analyze,
    /// Questions about using the application.
    Guide,
    /// General in-domain conversation.
    Chat,
    /// Anything the classifier returned that is not recognised.
    #[serde(other)]
    Unknown,
}

impl std::fmt::Display for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Intent::Design => "DESIGN",
            Intent::Modify => "MODIFY",
            Intent::Analyze => "ANALYZE",
            Intent::Guide => "GUIDE",
            Intent::Chat => "CHAT",
            Intent::Unknown => "UNKNOWN",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct IntentResponse {
    pub intent: Intent,

    /// Classifier confidence in `[0, 1]`, when it reports one.
    #[serde(default)]
    pub confidence: Option<f32>,
}

impl IntentResponse {
    pub fn of(intent: Intent) -> Self {
        Self {
            intent,
            confidence: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GuardStatus {
    /// In domain; continue.
    Valid,
    /// Out of domain.
    Invalid,
    /// Adjacent topic; answered with a bridging message instead of a design.
    Bridge,
}

/// Domain guardrail verdict on raw user input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct GuardVerdict {
    pub status: GuardStatus,
    #[serde(default)]
    pub message: String,
}

impl GuardVerdict {
    pub fn valid() -> Self {
        Self {
            status: GuardStatus::Valid,
            message: String::new(),
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            status: GuardStatus::Invalid,
            message: message.into(),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.status == GuardStatus::Valid
    }
}

/// Signal emitted once a process map passed validation and was stored.
///
/// Immutable payload consumed by the downstream worker.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct GraphReady {
    pub job_id: Uuid,
    pub user_request: String,
    pub process_map: ProcessMap,
}
