//! Chat message types exposed to the presentation layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use textbook_qa_client::messages::RetrievedSource;

/// Author of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// Link shown under an assistant answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLink {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl From<RetrievedSource> for SourceLink {
    /// Title falls back to "Source" when the backend sends no file name.
    fn from(source: RetrievedSource) -> Self {
        let title = if source.source_file.is_empty() {
            "Source".to_string()
        } else {
            source.source_file
        };
        SourceLink {
            title,
            url: source.url,
        }
    }
}

/// One conversational turn. `id`, `role`, and `timestamp` are fixed at
/// creation; `sources` is empty except on assistant answers from a
/// successful exchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: u64,
    pub content: String,
    pub role: Role,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<SourceLink>,
}
