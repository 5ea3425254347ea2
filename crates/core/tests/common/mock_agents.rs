//! Single-role test agents for observing what the pipeline sends.

use async_trait::async_trait;
use pc_core::agents::adapters::mock_agent::leave_request_map;
use pc_core::agents::{Agent, AgentError, MockAgent, ProcessArchitect, ProcessOutliner};
use pc_protocol::{ProcessDefinition, ProcessMap};
use std::collections::VecDeque;
use std::sync::Mutex;

/// Outliner that records every prompt and answers like `MockAgent`.
#[allow(dead_code)]
#[derive(Default)]
pub struct RecordingOutliner {
    pub prompts: Mutex<Vec<String>>,
    inner: MockAgent,
}

#[async_trait]
impl Agent for RecordingOutliner {
    async fn check_availability(&self) -> bool {
        true
    }
}

#[async_trait]
impl ProcessOutliner for RecordingOutliner {
    async fn outline(&self, augmented_request: &str) -> Result<ProcessDefinition, AgentError> {
        self.prompts.lock().unwrap().push(augmented_request.to_string());
        self.inner.outline(augmented_request).await
    }
}

/// Architect that serves queued drafts first, then the valid leave map,
/// and records the error text of every fix request.
#[allow(dead_code)]
#[derive(Default)]
pub struct ScriptedArchitect {
    drafts: Mutex<VecDeque<ProcessMap>>,
    pub fix_errors: Mutex<Vec<String>>,
}

impl ScriptedArchitect {
    #[allow(dead_code)]
    pub fn new(drafts: Vec<ProcessMap>) -> Self {
        Self {
            drafts: Mutex::new(drafts.into()),
            fix_errors: Mutex::new(Vec::new()),
        }
    }

    fn next_draft(&self) -> ProcessMap {
        self.drafts
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(leave_request_map)
    }
}

#[async_trait]
impl Agent for ScriptedArchitect {
    async fn check_availability(&self) -> bool {
        true
    }
}

#[async_trait]
impl ProcessArchitect for ScriptedArchitect {
    async fn transform(&self, _definition: &ProcessDefinition) -> Result<ProcessMap, AgentError> {
        Ok(self.next_draft())
    }

    async fn fix(
        &self,
        _definition: &ProcessDefinition,
        _invalid: &ProcessMap,
        error: &str,
    ) -> Result<ProcessMap, AgentError> {
        self.fix_errors.lock().unwrap().push(error.to_string());
        Ok(self.next_draft())
    }
}
