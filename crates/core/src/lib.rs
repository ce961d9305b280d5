//! # MNS Core
//!
//! Core logic for the Medical Note Structurer: prompting a local generation
//! backend to pull structured fields out of free-text clinical notes.
//!
//! This crate contains:
//! - Runtime configuration resolved once at startup (`config`)
//! - The generation backend HTTP client (`ollama`)
//! - Prompt construction (`prompt`)
//! - The structured-output contract, sentinels, and fallback (`extract`)
//! - The extraction service used by the REST API (`service`)
//! - The sequential batch client used by the CLI (`batch`)
//!
//! **No API concerns**: HTTP server routing, OpenAPI documentation, and wire
//! serialisation belong in `api-rest` and `api-shared`.

pub mod batch;
pub mod config;
pub mod extract;
pub mod ollama;
pub mod prompt;
pub mod service;

pub use config::CoreConfig;
pub use service::StructurerService;

/// Failure while talking to the generation backend.
///
/// Sentinel strings on the wire are derived from these, never the other way
/// around; code paths branch on the variant, not on string contents.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ExtractError {
    #[error("generation backend unreachable at {0}")]
    Unreachable(String),
    #[error("generation request timed out after {0}s")]
    Timeout(u64),
    #[error("malformed response from generation backend: {0}")]
    InvalidResponse(String),
    #[error("generation backend returned HTTP {0}")]
    UpstreamError(u16),
}

/// Startup configuration failure.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("ollama base URL cannot be empty")]
    EmptyBaseUrl,
    #[error("model name cannot be empty")]
    EmptyModel,
    #[error("invalid timeout value: {0}")]
    InvalidTimeout(String),
    #[error("failed to build HTTP client: {0}")]
    HttpClient(reqwest::Error),
}

pub type ExtractResult<T> = std::result::Result<T, ExtractError>;
