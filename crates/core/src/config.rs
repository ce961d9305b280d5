//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into the
//! services that need it. The intent is to avoid reading process-wide
//! environment variables during request handling, which can lead to
//! inconsistent behaviour in multi-threaded runtimes and test harnesses.

use std::time::Duration;

use crate::ConfigError;

pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
pub const DEFAULT_MODEL: &str = "llama2";
pub const DEFAULT_GENERATE_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_TAGS_TIMEOUT_SECS: u64 = 5;

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    ollama_base_url: String,
    model: String,
    generate_timeout: Duration,
    tags_timeout: Duration,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// The base URL is stored without a trailing slash so endpoint paths can
    /// be appended uniformly.
    pub fn new(
        ollama_base_url: String,
        model: String,
        generate_timeout: Duration,
        tags_timeout: Duration,
    ) -> Result<Self, ConfigError> {
        if ollama_base_url.trim().is_empty() {
            return Err(ConfigError::EmptyBaseUrl);
        }
        if model.trim().is_empty() {
            return Err(ConfigError::EmptyModel);
        }

        Ok(Self {
            ollama_base_url: ollama_base_url.trim_end_matches('/').to_string(),
            model,
            generate_timeout,
            tags_timeout,
        })
    }

    /// Resolve configuration from optional environment-variable values.
    ///
    /// `None` values fall back to the defaults above. Timeout values are
    /// plain integer seconds.
    pub fn resolve(
        ollama_base_url: Option<String>,
        model: Option<String>,
        generate_timeout_secs: Option<String>,
        tags_timeout_secs: Option<String>,
    ) -> Result<Self, ConfigError> {
        let generate_timeout = parse_timeout(generate_timeout_secs, DEFAULT_GENERATE_TIMEOUT_SECS)?;
        let tags_timeout = parse_timeout(tags_timeout_secs, DEFAULT_TAGS_TIMEOUT_SECS)?;

        Self::new(
            ollama_base_url.unwrap_or_else(|| DEFAULT_OLLAMA_URL.into()),
            model.unwrap_or_else(|| DEFAULT_MODEL.into()),
            generate_timeout,
            tags_timeout,
        )
    }

    /// Defaults for a local Ollama instance.
    pub fn default_local() -> Self {
        Self {
            ollama_base_url: DEFAULT_OLLAMA_URL.into(),
            model: DEFAULT_MODEL.into(),
            generate_timeout: Duration::from_secs(DEFAULT_GENERATE_TIMEOUT_SECS),
            tags_timeout: Duration::from_secs(DEFAULT_TAGS_TIMEOUT_SECS),
        }
    }

    pub fn ollama_base_url(&self) -> &str {
        &self.ollama_base_url
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn generate_timeout(&self) -> Duration {
        self.generate_timeout
    }

    pub fn tags_timeout(&self) -> Duration {
        self.tags_timeout
    }
}

fn parse_timeout(value: Option<String>, default_secs: u64) -> Result<Duration, ConfigError> {
    match value {
        Some(raw) => {
            let secs: u64 = raw
                .parse()
                .map_err(|_| ConfigError::InvalidTimeout(raw.clone()))?;
            Ok(Duration::from_secs(secs))
        }
        None => Ok(Duration::from_secs(default_secs)),
    }
}
