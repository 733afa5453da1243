//! Report error types.

use bankdesk_shared::types::ClientId;
use chrono::NaiveDate;
use thiserror::Error;

/// Errors that can occur during report generation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReportError {
    /// Invalid date range.
    #[error("Invalid date range: start {from} is after end {to}")]
    InvalidDateRange {
        /// First business day.
        from: NaiveDate,
        /// Last business day.
        to: NaiveDate,
    },

    /// Client not found.
    #[error("Client {0} not found")]
    ClientNotFound(ClientId),

    /// No movements in the range.
    #[error("No movements found for client {client_id} between {from} and {to}")]
    NoMovements {
        /// Client the statement was requested for.
        client_id: ClientId,
        /// First business day.
        from: NaiveDate,
        /// Last business day.
        to: NaiveDate,
    },

    /// Storage failed.
    #[error("Persistence failure: {0}")]
    Persistence(String),
}

impl ReportError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidDateRange { .. } => "INVALID_DATE_RANGE",
            Self::ClientNotFound(_) => "CLIENT_NOT_FOUND",
            Self::NoMovements { .. } => "NO_MOVEMENTS",
            Self::Persistence(_) => "PERSISTENCE_FAILURE",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::InvalidDateRange { .. } => 400,
            Self::ClientNotFound(_) | Self::NoMovements { .. } => 404,
            Self::Persistence(_) => 500,
        }
    }
}
