//! Client library for the textbook Q&A backend (HTTP gateway, wire types,
//! config). Used by the chat widget controller and the `textbook-qa` CLI.

pub mod client;
pub mod config;
pub mod messages;

pub use client::{
    ChatClient, ChatClientBuilder, ClientError, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS,
};
pub use config::{default_config_path, ApiSection, Config, ConfigError, IngestSection};
pub use messages::{
    ChatRequest, ChatResponse, HealthResponse, IngestRequest, IngestResponse, IngestStatus,
    RetrievedSource,
};
