use std::path::PathBuf;

use thiserror::Error;

// ---------------------------------------------------------------------------
// Dataset loading
// ---------------------------------------------------------------------------

/// Why a dataset could not be turned into a [`RecordStore`].
///
/// Without a record store nothing else in the viewer can work, so these are
/// surfaced to the user as-is and the previous dataset (if any) is kept.
///
/// [`RecordStore`]: crate::data::model::RecordStore
#[derive(Debug, Error)]
pub enum DataLoadError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported file extension: .{0}")]
    UnsupportedFormat(String),

    #[error("dataset is missing the required '{0}' column")]
    MissingColumn(&'static str),

    #[error("row {row}: invalid unit cost {value:?} ({reason})")]
    InvalidCost {
        row: usize,
        value: String,
        reason: &'static str,
    },

    /// Format-level parse failures (bad CSV quoting, non-array JSON, corrupt parquet…).
    #[error(transparent)]
    Malformed(#[from] anyhow::Error),
}

// ---------------------------------------------------------------------------
// Estimation
// ---------------------------------------------------------------------------

/// Failure of a single estimation request.
///
/// Recoverable: the record store, filters and aggregates stay usable.
#[derive(Debug, Error)]
pub enum EstimationError {
    #[error("LLM_API_KEY is not set (environment or .env)")]
    MissingApiKey,

    #[error("model request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("model endpoint returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("malformed model response: {0}")]
    Malformed(String),

    #[error("model returned no text")]
    EmptyResponse,

    #[error("estimation worker stopped before replying")]
    WorkerLost,
}

impl EstimationError {
    /// Whether the endpoint rejected our credential.
    pub fn is_auth_failure(&self) -> bool {
        match self {
            EstimationError::MissingApiKey => true,
            EstimationError::Status { status, .. } => {
                *status == reqwest::StatusCode::UNAUTHORIZED
                    || *status == reqwest::StatusCode::FORBIDDEN
            }
            _ => false,
        }
    }
}
