//! Request/response types for the backend `/api/v1` JSON contract
//! (chat, ingest, health).

use serde::{Deserialize, Serialize};

/// Client → backend: one chat question.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest<'a> {
    pub query: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<&'a str>,
}

impl<'a> ChatRequest<'a> {
    pub fn new(query: &'a str, session_id: Option<&'a str>) -> Self {
        Self {
            query,
            session_id,
            user_id: None,
        }
    }
}

/// One retrieved passage backing an answer.
///
/// The backend sends loosely-typed source dicts; every field is defaulted so
/// a partial payload still parses. `url` is not in the backend schema today
/// but is passed through when present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedSource {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub source_file: String,
    #[serde(default)]
    pub source_section: String,
    #[serde(default)]
    pub score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Backend → client: chat answer with supporting sources.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    pub answer: String,
    #[serde(default)]
    pub sources: Vec<RetrievedSource>,
    pub session_id: String,
    pub query: String,
    pub timestamp: String,
}

/// Client → backend: documentation ingest trigger.
#[derive(Debug, Clone, Serialize)]
pub struct IngestRequest {
    pub source_path: String,
    pub chunk_size: u32,
    pub chunk_overlap: u32,
}

impl Default for IngestRequest {
    /// Backend defaults: the mounted docs volume, 1000-char chunks, 200 overlap.
    fn default() -> Self {
        Self {
            source_path: "/app/docs".into(),
            chunk_size: 1000,
            chunk_overlap: 200,
        }
    }
}

/// Ingestion outcome reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IngestStatus {
    Success,
    Processing,
    Error,
}

/// Backend → client: ingest result.
#[derive(Debug, Clone, Deserialize)]
pub struct IngestResponse {
    pub status: IngestStatus,
    pub processed_files: u32,
    pub total_chunks: u32,
    #[serde(default)]
    pub errors: Vec<String>,
    #[serde(default)]
    pub message: String,
}

/// Backend → client: health probe (`{"status": "healthy", "service": "chat"}`).
#[derive(Debug, Clone, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
}
