//! HTTP client for the Ollama generation backend.
//!
//! Two endpoints are used: `POST /api/generate` (non-streaming, 60 s default
//! timeout) for extraction and `GET /api/tags` (5 s default timeout) for the
//! health probe. Timeouts are applied per request so one client serves both.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::CoreConfig;
use crate::{ConfigError, ExtractError, ExtractResult};

/// Seam between the extraction service and the generation backend.
///
/// `StructurerService` holds this as a trait object so tests can substitute
/// [`MockGenerateClient`].
#[async_trait]
pub trait GenerateClient: Send + Sync {
    /// Send a prompt to the backend and return its raw text response.
    async fn generate(&self, model: &str, prompt: &str) -> ExtractResult<String>;

    /// List the model names the backend has available.
    async fn list_models(&self) -> ExtractResult<Vec<String>>;
}

/// Ollama HTTP client.
pub struct OllamaClient {
    base_url: String,
    http: reqwest::Client,
    generate_timeout: Duration,
    tags_timeout: Duration,
}

impl OllamaClient {
    /// Create a client for the given base URL.
    pub fn new(
        base_url: &str,
        generate_timeout: Duration,
        tags_timeout: Duration,
    ) -> Result<Self, ConfigError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(ConfigError::HttpClient)?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
            generate_timeout,
            tags_timeout,
        })
    }

    /// Create a client from resolved core configuration.
    pub fn from_config(cfg: &CoreConfig) -> Result<Self, ConfigError> {
        Self::new(
            cfg.ollama_base_url(),
            cfg.generate_timeout(),
            cfg.tags_timeout(),
        )
    }

    fn map_send_error(&self, e: reqwest::Error, timeout: Duration) -> ExtractError {
        if e.is_timeout() {
            ExtractError::Timeout(timeout.as_secs())
        } else if e.is_connect() {
            ExtractError::Unreachable(self.base_url.clone())
        } else {
            ExtractError::InvalidResponse(e.to_string())
        }
    }
}

/// Request body for `POST /api/generate`.
#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

/// Response body from `POST /api/generate`.
#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

/// Response body from `GET /api/tags`.
#[derive(Deserialize)]
struct TagsResponse {
    models: Vec<ModelEntry>,
}

#[derive(Deserialize)]
struct ModelEntry {
    name: String,
}

#[async_trait]
impl GenerateClient for OllamaClient {
    async fn generate(&self, model: &str, prompt: &str) -> ExtractResult<String> {
        let url = format!("{}/api/generate", self.base_url);
        let body = GenerateRequest {
            model,
            prompt,
            stream: false,
        };

        let response = self
            .http
            .post(&url)
            .timeout(self.generate_timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.map_send_error(e, self.generate_timeout))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ExtractError::UpstreamError(status.as_u16()));
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| ExtractError::InvalidResponse(e.to_string()))?;

        Ok(parsed.response)
    }

    async fn list_models(&self) -> ExtractResult<Vec<String>> {
        let url = format!("{}/api/tags", self.base_url);

        let response = self
            .http
            .get(&url)
            .timeout(self.tags_timeout)
            .send()
            .await
            .map_err(|e| self.map_send_error(e, self.tags_timeout))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ExtractError::UpstreamError(status.as_u16()));
        }

        let parsed: TagsResponse = response
            .json()
            .await
            .map_err(|e| ExtractError::InvalidResponse(e.to_string()))?;

        Ok(parsed.models.into_iter().map(|m| m.name).collect())
    }
}

/// Mock generation client for tests — returns a configured response or
/// failure.
pub struct MockGenerateClient {
    generate_result: ExtractResult<String>,
    models_result: ExtractResult<Vec<String>>,
}

impl MockGenerateClient {
    /// A client whose `generate` returns the given text.
    pub fn respond(text: &str) -> Self {
        Self {
            generate_result: Ok(text.to_string()),
            models_result: Ok(vec!["llama2:latest".to_string()]),
        }
    }

    /// A client whose calls all fail with the given error.
    pub fn fail(err: ExtractError) -> Self {
        Self {
            generate_result: Err(err.clone()),
            models_result: Err(err),
        }
    }

    pub fn with_models(mut self, models: Vec<String>) -> Self {
        self.models_result = Ok(models);
        self
    }
}

#[async_trait]
impl GenerateClient for MockGenerateClient {
    async fn generate(&self, _model: &str, _prompt: &str) -> ExtractResult<String> {
        self.generate_result.clone()
    }

    async fn list_models(&self) -> ExtractResult<Vec<String>> {
        self.models_result.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client(base_url: &str) -> OllamaClient {
        OllamaClient::new(base_url, Duration::from_secs(60), Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn constructor_trims_trailing_slash() {
        let client = test_client("http://localhost:11434/");
        assert_eq!(client.base_url, "http://localhost:11434");
    }

    #[tokio::test]
    async fn generate_returns_response_text() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/generate")
            .match_body(mockito::Matcher::PartialJson(serde_json::json!({
                "model": "llama2",
                "stream": false,
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"response": "{\"diagnosis\": \"flu\"}"}"#)
            .create_async()
            .await;

        let client = test_client(&server.url());
        let text = client.generate("llama2", "a prompt").await.unwrap();
        assert_eq!(text, r#"{"diagnosis": "flu"}"#);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn generate_non_200_is_upstream_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/generate")
            .with_status(500)
            .with_body("model exploded")
            .create_async()
            .await;

        let client = test_client(&server.url());
        let err = client.generate("llama2", "a prompt").await.unwrap_err();
        assert!(matches!(err, ExtractError::UpstreamError(500)));
    }

    #[tokio::test]
    async fn generate_malformed_body_is_invalid_response() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/generate")
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let client = test_client(&server.url());
        let err = client.generate("llama2", "a prompt").await.unwrap_err();
        assert!(matches!(err, ExtractError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn list_models_extracts_names() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/tags")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"models": [{"name": "llama2:latest"}, {"name": "medllama2:7b"}]}"#)
            .create_async()
            .await;

        let client = test_client(&server.url());
        let models = client.list_models().await.unwrap();
        assert_eq!(models, vec!["llama2:latest", "medllama2:7b"]);
    }

    #[tokio::test]
    async fn list_models_non_200_is_upstream_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/tags")
            .with_status(503)
            .create_async()
            .await;

        let client = test_client(&server.url());
        let err = client.list_models().await.unwrap_err();
        assert!(matches!(err, ExtractError::UpstreamError(503)));
    }

    #[tokio::test]
    async fn mock_client_returns_configured_response() {
        let client = MockGenerateClient::respond("mock output");
        assert_eq!(
            client.generate("llama2", "prompt").await.unwrap(),
            "mock output"
        );
        assert_eq!(client.list_models().await.unwrap(), vec!["llama2:latest"]);
    }

    #[tokio::test]
    async fn mock_client_lists_configured_models() {
        let client = MockGenerateClient::respond("")
            .with_models(vec!["medllama2:7b".into(), "llama2:latest".into()]);
        let models = client.list_models().await.unwrap();
        assert_eq!(models.len(), 2);
        assert_eq!(models[0], "medllama2:7b");
    }

    #[tokio::test]
    async fn mock_client_fails_on_demand() {
        let client = MockGenerateClient::fail(ExtractError::Unreachable("nowhere".into()));
        assert!(client.generate("llama2", "prompt").await.is_err());
        assert!(client.list_models().await.is_err());
    }
}
