//! Job snapshot models exposed to polling clients.
//!
//! A `Job` is one end-to-end pipeline run. Clients only ever see clones of
//! it, and use `version` as a cache-validation token.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use ts_rs::TS;
use uuid::Uuid;

use crate::analysis_models::AnalysisResult;
use crate::design_models::{DataSchema, FormLayout};
use crate::graph_models::ProcessMap;

/// Stage names used as `stageDurations` keys and `lastUpdatedStage` values.
pub mod stage {
    pub const INIT: &str = "INIT";
    pub const PROCESS: &str = "PROCESS";
    pub const DATA: &str = "DATA";
    pub const FORM: &str = "FORM";
}

/// Lifecycle state of a job.
///
/// Pending -> Processing -> Completed | Failed. Terminal states are
/// absorbing; Processing may be re-entered while stages run.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobState {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl JobState {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobState::Completed | JobState::Failed)
    }

    /// Whether moving from `self` to `next` keeps the state monotonic.
    pub fn can_transition_to(self, next: JobState) -> bool {
        match self {
            JobState::Pending => true,
            JobState::Processing => next != JobState::Pending,
            JobState::Completed | JobState::Failed => false,
        }
    }
}

impl std::fmt::Display for JobState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            JobState::Pending => "PENDING",
            JobState::Processing => "PROCESSING",
            JobState::Completed => "COMPLETED",
            JobState::Failed => "FAILED",
        };
        f.write_str(s)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StepStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
}

impl StepStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, StepStatus::Completed | StepStatus::Failed)
    }
}

/// A named sub-task shown to pollers as a progress line.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
pub struct ProgressStep {
    /// Internal id such as `val` or `outline`; identity of the step.
    pub id: String,
    pub label: String,
    pub status: StepStatus,
}

impl ProgressStep {
    pub fn new(id: impl Into<String>, label: impl Into<String>, status: StepStatus) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            status,
        }
    }
}

/// An output produced by one generation stage.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, TS)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum Artifact {
    ProcessMap(ProcessMap),
    DataSchema(DataSchema),
    FormLayout(FormLayout),
}

impl Artifact {
    /// Stage the artifact belongs to; used as the duration key.
    pub fn stage_name(&self) -> &'static str {
        match self {
            Artifact::ProcessMap(_) => stage::PROCESS,
            Artifact::DataSchema(_) => stage::DATA,
            Artifact::FormLayout(_) => stage::FORM,
        }
    }
}

/// Fixed set of output slots on a job.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, TS)]
#[serde(rename_all = "camelCase")]
pub struct Artifacts {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub process_map: Option<ProcessMap>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_schema: Option<DataSchema>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub form_layout: Option<FormLayout>,
}

impl Artifacts {
    /// Fill the slot matching `artifact`, replacing a previous value.
    pub fn put(&mut self, artifact: Artifact) {
        match artifact {
            Artifact::ProcessMap(map) => self.process_map = Some(map),
            Artifact::DataSchema(schema) => self.data_schema = Some(schema),
            Artifact::FormLayout(layout) => self.form_layout = Some(layout),
        }
    }
}

/// Snapshot of a pipeline run.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, TS)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    /// Assigned at submission, never changes.
    pub id: Uuid,

    pub state: JobState,

    /// Latest human-readable status, overwritten on each state update.
    pub message: String,

    pub last_updated_stage: String,

    /// Incremented on every mutation.
    pub version: u64,

    pub start_time: DateTime<Utc>,

    /// Stage name to elapsed milliseconds.
    pub stage_durations: BTreeMap<String, u64>,

    /// Elapsed time since `start_time`; recomputed on read while processing.
    pub total_elapsed_millis: u64,

    /// Progress steps in first-seen order.
    pub progress_steps: Vec<ProgressStep>,

    pub analysis_results: Vec<AnalysisResult>,

    pub artifacts: Artifacts,
}

impl Job {
    /// A fresh pending job.
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            state: JobState::Pending,
            message: "Waiting for job...".to_string(),
            last_updated_stage: stage::INIT.to_string(),
            version: 0,
            start_time: Utc::now(),
            stage_durations: BTreeMap::new(),
            total_elapsed_millis: 0,
            progress_steps: Vec::new(),
            analysis_results: Vec::new(),
            artifacts: Artifacts::default(),
        }
    }

    pub fn progress_step(&self, step_id: &str) -> Option<&ProgressStep> {
        self.progress_steps.iter().find(|s| s.id == step_id)
    }

    /// Milliseconds between `start_time` and `now`, clamped at zero.
    pub fn elapsed_millis_at(&self, now: DateTime<Utc>) -> u64 {
        u64::try_from((now - self.start_time).num_milliseconds()).unwrap_or(0)
    }
}
