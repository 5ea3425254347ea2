//! Knowledge sources attached to design requests.
//!
//! A source is text already extracted from an uploaded document. Design
//! requests reference sources by id; their text is folded into the
//! outline prompt under a per-source character cap.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Context used when no requested source resolves.
pub const DEFAULT_CONTEXT: &str = "General standards.";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct KnowledgeSource {
    pub id: String,

    /// Original file name, shown as the source label.
    pub file_name: String,

    #[serde(default)]
    pub extracted_text: String,

    /// Fallback content when no text could be extracted.
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Default)]
pub struct KnowledgeStore {
    sources: HashMap<String, KnowledgeSource>,
}

impl KnowledgeStore {
    pub fn new(sources: impl IntoIterator<Item = KnowledgeSource>) -> Self {
        Self {
            sources: sources.into_iter().map(|s| (s.id.clone(), s)).collect(),
        }
    }

    pub fn get(&self, id: &str) -> Option<&KnowledgeSource> {
        self.sources.get(id)
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Concatenate the requested sources into a prompt context.
    ///
    /// Each resolved source contributes a `- [Source: <file>]` line and
    /// its text (or description when the text is blank), cut to
    /// `char_limit` characters with a trailing `...`. Unknown ids are
    /// skipped. Returns an empty string when nothing resolves.
    pub fn build_context(&self, ids: &[String], char_limit: usize) -> String {
        let mut context = String::new();

        for id in ids {
            let Some(source) = self.get(id) else {
                tracing::debug!(source_id = %id, "Unknown knowledge source skipped");
                continue;
            };

            let content = if source.extracted_text.trim().is_empty() {
                source.description.as_str()
            } else {
                source.extracted_text.as_str()
            };

            context.push_str(&format!("- [Source: {}]\n", source.file_name));
            context.push_str(&truncate_chars(content, char_limit));
            context.push_str("\n\n");
        }

        context
    }
}

fn truncate_chars(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((byte_index, _)) => format!("{}...", &text[..byte_index]),
        None => text.to_string(),
    }
}

/// Prompt sent to the outliner for a design request.
pub fn augmented_prompt(user_request: &str, context: &str) -> String {
    let knowledge = if context.trim().is_empty() {
        DEFAULT_CONTEXT
    } else {
        context
    };
    format!(
        "USER REQUEST: \"{}\"\nKNOWLEDGE: {}",
        user_request, knowledge
    )
}
