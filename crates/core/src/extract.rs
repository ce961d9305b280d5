//! Structured-output contract: sentinels, the fallback object, and the
//! canonical parse used by both the service and the batch client.
//!
//! The model's output is opaque text on the wire. The service checks only
//! that it is syntactically valid JSON; the batch client flattens it into
//! tabular fields here. Keeping both sides in one module is deliberate:
//! three distinct sentinel layers exist (`Unable to parse`, `Parsing error`,
//! `API Error`/`Connection Error`) and they must not drift apart.

use serde_json::Value;

/// Service-level sentinel: the generation backend failed or returned
/// something that is not JSON.
pub const UNABLE_TO_PARSE: &str = "Unable to parse";

/// Client-level sentinel: the service answered 200 but the `structured`
/// payload did not parse as JSON.
pub const PARSING_ERROR: &str = "Parsing error";

/// Client-level sentinel: the service answered with a non-200 status.
pub const API_ERROR: &str = "API Error";

/// Client-level sentinel: the request to the service itself failed.
pub const CONNECTION_ERROR: &str = "Connection Error";

/// Substituted for fields the model omitted.
pub const MISSING_FIELD: &str = "N/A";

/// Syntactic JSON validity check — no schema or field enforcement.
pub fn is_valid_json(raw: &str) -> bool {
    serde_json::from_str::<Value>(raw).is_ok()
}

/// The serialised fallback object returned whenever extraction fails.
///
/// Always well-formed JSON: every service-side failure path must yield a
/// payload the client can parse, so a backend outage reads as
/// `"Unable to parse"` rather than cascading into a misleading client-side
/// parse failure.
pub fn fallback_payload() -> String {
    serde_json::json!({
        "symptoms": [UNABLE_TO_PARSE],
        "diagnosis": UNABLE_TO_PARSE,
        "medications": [UNABLE_TO_PARSE],
        "follow_up": UNABLE_TO_PARSE,
    })
    .to_string()
}

/// The four extracted fields, flattened for tabular display and export.
///
/// List-valued fields are joined with `"; "`; scalar values pass through
/// unchanged; missing fields become [`MISSING_FIELD`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuredFields {
    pub symptoms: String,
    pub diagnosis: String,
    pub medications: String,
    pub follow_up: String,
}

impl StructuredFields {
    /// Parse a raw `structured` payload and flatten its fields.
    ///
    /// Fails only on syntactically invalid JSON; any valid JSON value is
    /// accepted, with absent fields defaulting per field.
    pub fn parse(raw: &str) -> Result<Self, serde_json::Error> {
        let value: Value = serde_json::from_str(raw)?;
        Ok(Self {
            symptoms: flatten_field(&value, "symptoms"),
            diagnosis: flatten_field(&value, "diagnosis"),
            medications: flatten_field(&value, "medications"),
            follow_up: flatten_field(&value, "follow_up"),
        })
    }

    /// All four fields set to the same sentinel.
    pub fn uniform(sentinel: &str) -> Self {
        Self {
            symptoms: sentinel.to_string(),
            diagnosis: sentinel.to_string(),
            medications: sentinel.to_string(),
            follow_up: sentinel.to_string(),
        }
    }
}

fn flatten_field(value: &Value, key: &str) -> String {
    match value.get(key) {
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join("; "),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => MISSING_FIELD.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_payload_is_well_formed_json() {
        let payload = fallback_payload();
        assert!(is_valid_json(&payload));

        let fields = StructuredFields::parse(&payload).unwrap();
        assert_eq!(fields, StructuredFields::uniform(UNABLE_TO_PARSE));
    }

    #[test]
    fn list_fields_are_semicolon_joined() {
        let raw = r#"{"symptoms": ["fatigue", "joint pain"], "diagnosis": "rheumatoid arthritis", "medications": ["methotrexate 15mg weekly", "folic acid 5mg daily"], "follow_up": "6 weeks"}"#;
        let fields = StructuredFields::parse(raw).unwrap();
        assert_eq!(fields.symptoms, "fatigue; joint pain");
        assert_eq!(fields.diagnosis, "rheumatoid arthritis");
        assert_eq!(
            fields.medications,
            "methotrexate 15mg weekly; folic acid 5mg daily"
        );
        assert_eq!(fields.follow_up, "6 weeks");
    }

    #[test]
    fn scalar_values_pass_through() {
        let raw = r#"{"symptoms": "headache", "diagnosis": "migraine", "medications": "sumatriptan", "follow_up": "as needed"}"#;
        let fields = StructuredFields::parse(raw).unwrap();
        assert_eq!(fields.symptoms, "headache");
        assert_eq!(fields.medications, "sumatriptan");
    }

    #[test]
    fn missing_fields_default_to_na() {
        let fields = StructuredFields::parse(r#"{"diagnosis": "flu"}"#).unwrap();
        assert_eq!(fields.symptoms, MISSING_FIELD);
        assert_eq!(fields.diagnosis, "flu");
        assert_eq!(fields.medications, MISSING_FIELD);
        assert_eq!(fields.follow_up, MISSING_FIELD);
    }

    #[test]
    fn valid_non_object_json_yields_all_defaults() {
        // Only syntactic validity is enforced; an array has no fields.
        let fields = StructuredFields::parse("[1, 2, 3]").unwrap();
        assert_eq!(fields, StructuredFields::uniform(MISSING_FIELD));
    }

    #[test]
    fn invalid_json_is_an_error() {
        assert!(StructuredFields::parse("not json at all").is_err());
        assert!(!is_valid_json("Error: connection refused"));
    }

    #[test]
    fn non_string_list_items_are_rendered() {
        let fields = StructuredFields::parse(r#"{"symptoms": [1, true]}"#).unwrap();
        assert_eq!(fields.symptoms, "1; true");
    }
}
