//! HTTP client for the textbook Q&A backend: ask a question, trigger
//! document ingestion, probe health. One attempt per call, no retry or
//! backoff; retry policy belongs to callers.

use std::time::Duration;

use reqwest::StatusCode;

use crate::messages::{ChatRequest, ChatResponse, HealthResponse, IngestRequest, IngestResponse};

/// Default backend endpoint, overridable via config or `TEXTBOOK_QA_API_URL`.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api/v1";

/// Default per-request timeout in seconds. A hung backend surfaces as a
/// [`ClientError::Transport`] once this elapses.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Gateway call failure. Carries backend detail for logging; user-facing
/// layers render their own text instead of this.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Connection, DNS, timeout, or response-decoding failure.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// The backend answered outside the 2xx range.
    #[error("server returned {status}: {body}")]
    Status { status: StatusCode, body: String },
}

/// Client for the backend `/api/v1` endpoints.
#[derive(Debug, Clone)]
pub struct ChatClient {
    base_url: String,
    http: reqwest::Client,
}

impl ChatClient {
    /// Create a client builder.
    pub fn builder() -> ChatClientBuilder {
        ChatClientBuilder::new()
    }

    /// Endpoint this client talks to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Ask one question. `session_id` correlates the exchanges of a
    /// conversation; when absent the backend assigns one.
    pub async fn ask(
        &self,
        query: &str,
        session_id: Option<&str>,
    ) -> Result<ChatResponse, ClientError> {
        let url = format!("{}/chat/", self.base_url);
        tracing::debug!(%url, session_id = ?session_id, "sending chat query");
        let response = self
            .http
            .post(&url)
            .json(&ChatRequest::new(query, session_id))
            .send()
            .await?;
        let response = expect_2xx(response).await?;
        Ok(response.json::<ChatResponse>().await?)
    }

    /// Trigger ingestion of the documentation tree into the backend index.
    pub async fn ingest(&self, request: &IngestRequest) -> Result<IngestResponse, ClientError> {
        let url = format!("{}/ingest/", self.base_url);
        tracing::debug!(%url, source_path = %request.source_path, "requesting ingest");
        let response = self.http.post(&url).json(request).send().await?;
        let response = expect_2xx(response).await?;
        Ok(response.json::<IngestResponse>().await?)
    }

    /// Probe the chat service health endpoint.
    pub async fn health(&self) -> Result<HealthResponse, ClientError> {
        let url = format!("{}/chat/health", self.base_url);
        let response = self.http.get(&url).send().await?;
        let response = expect_2xx(response).await?;
        Ok(response.json::<HealthResponse>().await?)
    }
}

async fn expect_2xx(response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ClientError::Status { status, body })
}

/// Builder for [`ChatClient`].
pub struct ChatClientBuilder {
    base_url: Option<String>,
    timeout: Option<Duration>,
}

impl ChatClientBuilder {
    pub fn new() -> Self {
        Self {
            base_url: None,
            timeout: None,
        }
    }

    /// Base endpoint, e.g. `http://localhost:8000/api/v1`. A trailing slash
    /// is tolerated.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Per-request timeout; expiry is reported as a transport failure.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn build(self) -> Result<ChatClient, ClientError> {
        let base_url = self
            .base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let timeout = self
            .timeout
            .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(ChatClient {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }
}

impl Default for ChatClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
