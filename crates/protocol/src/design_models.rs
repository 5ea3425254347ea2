//! Intermediate and downstream design artifacts.
//!
//! The outline is the abstract step list drafted before the process map;
//! the data schema and form layout are derived from the finished map.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// One abstract step of a drafted process outline.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
#[serde(rename_all = "camelCase")]
pub struct DefinitionStep {
    /// Stable id used as the namespace root of the map's node ids.
    pub step_id: String,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Free-form hint such as `ACTION` or `DECISION`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step_type: Option<String>,
}

/// Linear outline of a business process.
///
/// An outline with no steps means the request was conversational and
/// nothing should be generated.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq, TS)]
#[serde(rename_all = "camelCase")]
pub struct ProcessDefinition {
    #[serde(default)]
    pub topic: String,

    #[serde(default)]
    pub steps: Vec<DefinitionStep>,
}

impl ProcessDefinition {
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// A single captured data attribute.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
#[serde(rename_all = "camelCase")]
pub struct DataEntity {
    pub id: String,

    /// UpperCamelCase key shared with form fields.
    pub alias: String,

    #[serde(default)]
    pub label: String,

    /// Lowercase data type, e.g. `string`, `date`, `lookup`.
    #[serde(rename = "type")]
    pub entity_type: String,

    /// Activity that captures this value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_node_id: Option<String>,

    #[serde(default)]
    pub required: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
#[serde(rename_all = "camelCase")]
pub struct DataEntityGroup {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub entity_ids: Vec<String>,
}

/// Data model derived from a process map.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq, TS)]
#[serde(rename_all = "camelCase")]
pub struct DataSchema {
    #[serde(default)]
    pub entities: Vec<DataEntity>,
    #[serde(default)]
    pub groups: Vec<DataEntityGroup>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
#[serde(rename_all = "camelCase")]
pub struct FormField {
    pub id: String,

    /// Must match a `DataEntity::alias`.
    pub entity_alias: String,

    #[serde(default)]
    pub label: String,

    /// UI component, e.g. `input_text`, `date_picker`.
    pub component: String,

    #[serde(default)]
    pub required: bool,

    #[serde(default)]
    pub visible_activity_ids: Vec<String>,

    #[serde(default)]
    pub readonly_activity_ids: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
#[serde(rename_all = "camelCase")]
pub struct FormFieldGroup {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub fields: Vec<FormField>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
#[serde(rename_all = "camelCase")]
pub struct FormDefinition {
    pub form_name: String,
    #[serde(default)]
    pub field_groups: Vec<FormFieldGroup>,
}

/// Form layout derived from the process map and its data schema.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq, TS)]
#[serde(rename_all = "camelCase")]
pub struct FormLayout {
    #[serde(default)]
    pub form_definitions: Vec<FormDefinition>,
}
