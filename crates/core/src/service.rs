//! The extraction service: prompt, generate, validity-check, fall back.
//!
//! `extract` never fails from the caller's perspective — every backend
//! failure is absorbed into the serialised fallback object so the wire
//! payload is always well-formed JSON. The failure reason is logged here and
//! carried internally as `ExtractError`, never leaked into the payload.

use std::sync::Arc;

use crate::config::CoreConfig;
use crate::extract::{fallback_payload, is_valid_json};
use crate::ollama::{GenerateClient, OllamaClient};
use crate::prompt::extraction_prompt;
use crate::ConfigError;

/// Structuring service used by the REST API handlers.
pub struct StructurerService {
    client: Arc<dyn GenerateClient>,
    model: String,
}

impl StructurerService {
    pub fn new(client: Arc<dyn GenerateClient>, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }

    /// Build a service backed by a real Ollama client.
    pub fn from_config(cfg: &CoreConfig) -> Result<Self, ConfigError> {
        let client = OllamaClient::from_config(cfg)?;
        Ok(Self::new(Arc::new(client), cfg.model()))
    }

    /// Extract structured fields from a clinical note.
    ///
    /// Returns the `structured` payload: the model's raw text when it is
    /// syntactically valid JSON (pass-through, never re-serialised), the
    /// fallback object otherwise. No retry, no persistence.
    pub async fn extract(&self, note: &str) -> String {
        let prompt = extraction_prompt(note);

        match self.client.generate(&self.model, &prompt).await {
            Ok(raw) => {
                let raw = raw.trim().to_string();
                if is_valid_json(&raw) {
                    raw
                } else {
                    tracing::warn!("model output was not valid JSON, substituting fallback");
                    fallback_payload()
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "generation request failed");
                fallback_payload()
            }
        }
    }

    /// Probe the generation backend.
    ///
    /// True iff the backend's model-listing endpoint answered HTTP 200; any
    /// other status or transport failure reads as unreachable,
    /// indistinguishably.
    pub async fn backend_reachable(&self) -> bool {
        match self.client.list_models().await {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!(error = %e, "generation backend health probe failed");
                false
            }
        }
    }
}
