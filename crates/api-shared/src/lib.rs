//! # API Shared
//!
//! Wire types shared by the MNS REST API and the batch client.
//!
//! Both sides of the extraction contract deserialise these from one place so
//! the shapes cannot drift: `api-rest` serves them, `mns-core`'s batch client
//! consumes them.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Form body for `POST /extract/`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ExtractForm {
    /// Free-text clinical note. May be empty; no validation is performed.
    pub note: String,
}

/// Response wrapper for `POST /extract/`.
///
/// `structured` is opaque text that is always syntactically valid JSON:
/// either the model's raw output (passed through unchanged) or the serialised
/// fallback object with every field set to `"Unable to parse"`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ExtractRes {
    pub structured: String,
}

/// Overall service status reported by `GET /health`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ServiceStatus {
    Healthy,
    Unhealthy,
}

/// Generation backend connectivity reported by `GET /health`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum BackendStatus {
    Connected,
    Disconnected,
}

/// Response body for `GET /health`.
///
/// The two fields move together: the service is healthy iff its backend is
/// connected. Any probe failure reads as disconnected, indistinguishably.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub status: ServiceStatus,
    pub ollama: BackendStatus,
}

impl HealthRes {
    pub fn connected() -> Self {
        Self {
            status: ServiceStatus::Healthy,
            ollama: BackendStatus::Connected,
        }
    }

    pub fn disconnected() -> Self {
        Self {
            status: ServiceStatus::Unhealthy,
            ollama: BackendStatus::Disconnected,
        }
    }
}

/// Response body for `GET /`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RootRes {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_res_serialises_to_wire_strings() {
        let json = serde_json::to_string(&HealthRes::connected()).unwrap();
        assert_eq!(json, r#"{"status":"healthy","ollama":"connected"}"#);

        let json = serde_json::to_string(&HealthRes::disconnected()).unwrap();
        assert_eq!(json, r#"{"status":"unhealthy","ollama":"disconnected"}"#);
    }

    #[test]
    fn health_res_round_trips() {
        let parsed: HealthRes =
            serde_json::from_str(r#"{"status": "healthy", "ollama": "connected"}"#).unwrap();
        assert_eq!(parsed, HealthRes::connected());
    }

    #[test]
    fn extract_res_keeps_payload_opaque() {
        let res: ExtractRes =
            serde_json::from_str(r#"{"structured": "{\"diagnosis\": \"flu\"}"}"#).unwrap();
        assert_eq!(res.structured, r#"{"diagnosis": "flu"}"#);
    }
}
