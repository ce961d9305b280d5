//! Sequential batch client core.
//!
//! Reads a CSV of `patient_id, doctor_notes` rows, calls the extraction
//! service once per row (blocking, one request in flight at a time), and
//! assembles a results table for export. Input validation happens before any
//! network call; per-row failures substitute sentinel values and never abort
//! the batch — N rows in always yields N rows out.

use std::io::{Read, Write};
use std::time::Duration;

use api_shared::{ExtractRes, HealthRes};
use serde::Serialize;

use crate::extract::{StructuredFields, API_ERROR, CONNECTION_ERROR, PARSING_ERROR};

pub const PATIENT_ID_COLUMN: &str = "patient_id";
pub const NOTES_COLUMN: &str = "doctor_notes";

/// Characters of the original note kept in the export.
pub const NOTE_PREVIEW_CHARS: usize = 100;

/// Characters of an error message kept in the symptoms column.
pub const ERROR_DETAIL_CHARS: usize = 50;

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;

/// Failure reading input or writing output. These abort the batch; per-row
/// extraction failures never do.
#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("input is missing required column '{0}'")]
    MissingColumn(String),
    #[error("failed to read input CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to write output: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to build HTTP client: {0}")]
    HttpClient(reqwest::Error),
}

/// Per-row failure talking to the extraction service.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("service returned HTTP {0}")]
    Status(u16),
    #[error("request failed: {0}")]
    Request(String),
}

/// One input row: an opaque patient identifier and the free-text note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteRecord {
    pub patient_id: String,
    pub note: String,
}

/// One output row of the results table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultRow {
    pub patient_id: String,
    pub original_note: String,
    pub symptoms: String,
    pub diagnosis: String,
    pub medications: String,
    pub follow_up: String,
}

/// Seam between batch processing and the extraction service, so tests can
/// run batches without a server.
pub trait ExtractApi {
    fn extract(&self, note: &str) -> Result<ExtractRes, ApiError>;
}

/// Blocking HTTP client for the extraction service.
pub struct HttpExtractApi {
    base_url: String,
    http: reqwest::blocking::Client,
}

impl HttpExtractApi {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, BatchError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(BatchError::HttpClient)?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    /// Probe the service's `/health` endpoint.
    pub fn health(&self) -> Result<HealthRes, ApiError> {
        let url = format!("{}/health", self.base_url);
        let response = self
            .http
            .get(&url)
            .send()
            .map_err(|e| ApiError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status(status.as_u16()));
        }

        response
            .json::<HealthRes>()
            .map_err(|e| ApiError::Request(e.to_string()))
    }
}

impl ExtractApi for HttpExtractApi {
    fn extract(&self, note: &str) -> Result<ExtractRes, ApiError> {
        let url = format!("{}/extract/", self.base_url);
        let response = self
            .http
            .post(&url)
            .form(&[("note", note)])
            .send()
            .map_err(|e| ApiError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status(status.as_u16()));
        }

        response
            .json::<ExtractRes>()
            .map_err(|e| ApiError::Request(e.to_string()))
    }
}

/// Read and validate the input CSV.
///
/// Both required columns must be present in the header before any extraction
/// is attempted; extra columns are ignored.
pub fn read_notes<R: Read>(reader: R) -> Result<Vec<NoteRecord>, BatchError> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let headers = csv_reader.headers()?.clone();

    let id_idx = headers
        .iter()
        .position(|h| h == PATIENT_ID_COLUMN)
        .ok_or_else(|| BatchError::MissingColumn(PATIENT_ID_COLUMN.into()))?;
    let note_idx = headers
        .iter()
        .position(|h| h == NOTES_COLUMN)
        .ok_or_else(|| BatchError::MissingColumn(NOTES_COLUMN.into()))?;

    let mut notes = Vec::new();
    for record in csv_reader.records() {
        let record = record?;
        notes.push(NoteRecord {
            patient_id: record.get(id_idx).unwrap_or_default().to_string(),
            note: record.get(note_idx).unwrap_or_default().to_string(),
        });
    }
    Ok(notes)
}

/// First [`NOTE_PREVIEW_CHARS`] characters of the note plus an ellipsis.
///
/// The ellipsis is appended unconditionally; truncation is `char`-based so
/// multi-byte text never panics.
pub fn truncate_note(note: &str) -> String {
    let preview: String = note.chars().take(NOTE_PREVIEW_CHARS).collect();
    format!("{preview}...")
}

fn truncate_error(message: &str) -> String {
    message.chars().take(ERROR_DETAIL_CHARS).collect()
}

/// Process one note into a result row. Never fails; every failure mode maps
/// to its sentinel layer.
pub fn process_note(api: &dyn ExtractApi, record: &NoteRecord) -> ResultRow {
    let fields = match api.extract(&record.note) {
        Ok(res) => match StructuredFields::parse(&res.structured) {
            Ok(fields) => fields,
            Err(e) => {
                tracing::warn!(patient_id = %record.patient_id, error = %e, "structured payload was not valid JSON");
                StructuredFields::uniform(PARSING_ERROR)
            }
        },
        Err(ApiError::Status(code)) => {
            tracing::warn!(patient_id = %record.patient_id, status = code, "extraction service returned an error status");
            StructuredFields::uniform(API_ERROR)
        }
        Err(ApiError::Request(message)) => {
            tracing::warn!(patient_id = %record.patient_id, error = %message, "request to extraction service failed");
            StructuredFields {
                symptoms: format!("Error: {}", truncate_error(&message)),
                diagnosis: CONNECTION_ERROR.to_string(),
                medications: CONNECTION_ERROR.to_string(),
                follow_up: CONNECTION_ERROR.to_string(),
            }
        }
    };

    ResultRow {
        patient_id: record.patient_id.clone(),
        original_note: truncate_note(&record.note),
        symptoms: fields.symptoms,
        diagnosis: fields.diagnosis,
        medications: fields.medications,
        follow_up: fields.follow_up,
    }
}

/// Process every note sequentially, reporting progress as `(done, total)`
/// before each request.
pub fn process_batch<F>(
    api: &dyn ExtractApi,
    notes: &[NoteRecord],
    mut progress: F,
) -> Vec<ResultRow>
where
    F: FnMut(usize, usize),
{
    let total = notes.len();
    notes
        .iter()
        .enumerate()
        .map(|(idx, record)| {
            progress(idx + 1, total);
            process_note(api, record)
        })
        .collect()
}

/// Write the results table as CSV.
pub fn write_results<W: Write>(rows: &[ResultRow], writer: W) -> Result<(), BatchError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for row in rows {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Batch outcome counts. A row counts as successful when its diagnosis field
/// does not contain the substring "Error".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchSummary {
    pub total: usize,
    pub successful: usize,
}

impl BatchSummary {
    /// Failed rows as a percentage of the batch; 0.0 for an empty batch.
    pub fn error_rate(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        (self.total - self.successful) as f64 / self.total as f64 * 100.0
    }
}

pub fn summarize(rows: &[ResultRow]) -> BatchSummary {
    let successful = rows.iter().filter(|r| !r.diagnosis.contains("Error")).count();
    BatchSummary {
        total: rows.len(),
        successful,
    }
}
