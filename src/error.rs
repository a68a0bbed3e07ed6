//! Error types for the rollup core and the service boundary.

use reqwest::StatusCode;
use serde::Serialize;
use thiserror::Error;

/// Failures raised by [`crate::rollup::aggregate`].
#[derive(Debug, Error)]
pub enum AggregateError {
    /// No timestamps or no field series were supplied.
    #[error("hourly data is empty or missing")]
    EmptyInput,

    #[error("row {row}: timestamp {value:?} does not match YYYY-MM-DD HH:MM")]
    MalformedTimestamp {
        row: usize,
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("row {row}: field {field:?} has non-numeric value {value:?}")]
    MalformedNumericValue {
        field: String,
        row: usize,
        value: String,
    },
}

/// Failures surfaced by [`crate::service::WeatherService`].
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Transport failure, non-success status, or an undecodable upstream body.
    #[error("upstream request failed: {0:#}")]
    Upstream(#[source] anyhow::Error),

    /// The upstream document decoded but its hourly data could not be aggregated.
    #[error("invalid hourly data: {0}")]
    InvalidData(#[from] AggregateError),

    #[error("snapshot store failed: {0:#}")]
    Store(#[source] anyhow::Error),
}

impl ServiceError {
    /// Status code reported to callers for this failure.
    pub fn status(&self) -> StatusCode {
        match self {
            ServiceError::Upstream(_) | ServiceError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ServiceError::InvalidData(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }

    /// Builds the structured error payload returned to callers.
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            error: self.to_string(),
            status: self.status().as_u16(),
        }
    }
}

/// Structured error payload, e.g. `{"error": "...", "status": 500}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub status: u16,
}
