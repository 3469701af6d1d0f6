use thiserror::Error;

/// Failures that abort a whole ingestion cycle.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Role API request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Role API returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Role API returned invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Expected a JSON array of roles, got {found}")]
    NotArray { found: &'static str },
}

/// Failures that skip a single record and let the cycle continue.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecordError {
    #[error("Record is not a JSON object")]
    NotObject,
    #[error("Record has no roleId")]
    MissingId,
    #[error("Field '{field}' must be {expected}")]
    InvalidField {
        field: &'static str,
        expected: &'static str,
    },
}
