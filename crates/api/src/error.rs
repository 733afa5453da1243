//! API error rendering.
//!
//! Every failure leaves the API as `{"error": "<snake_case code>", "message": ...}`
//! with the status code of the underlying domain error.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use bankdesk_core::customer::CustomerError;
use bankdesk_core::ledger::LedgerError;
use bankdesk_core::reports::ReportError;
use bankdesk_db::repositories::{AccountError, ClientError, MovementError, StatementError};
use bankdesk_shared::AppError;
use bankdesk_shared::types::MovementId;
use sea_orm::DbErr;
use serde_json::json;
use tracing::error;

/// Result type for handlers.
pub type ApiResult<T> = Result<T, ApiError>;

/// Errors surfaced by the HTTP layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Request-level failure (bad query, malformed body, ...).
    #[error(transparent)]
    App(#[from] AppError),

    /// Posting engine rejection or failure.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Client or account rule violation.
    #[error(transparent)]
    Customer(#[from] CustomerError),

    /// Report rule violation.
    #[error(transparent)]
    Report(#[from] ReportError),

    /// Unknown movement id.
    #[error("Movement {0} not found")]
    MovementNotFound(MovementId),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl ApiError {
    /// Shorthand for a request validation failure.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::App(AppError::Validation(message.into()))
    }

    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        let code = match self {
            Self::App(e) => e.status_code(),
            Self::Ledger(e) => e.http_status_code(),
            Self::Customer(e) => e.http_status_code(),
            Self::Report(e) => e.http_status_code(),
            Self::MovementNotFound(_) => 404,
            Self::Database(_) => 500,
        };
        StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Stable error code in upper snake case.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::App(e) => e.error_code(),
            Self::Ledger(e) => e.error_code(),
            Self::Customer(e) => e.error_code(),
            Self::Report(e) => e.error_code(),
            Self::MovementNotFound(_) => "MOVEMENT_NOT_FOUND",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }
}

impl From<ClientError> for ApiError {
    fn from(e: ClientError) -> Self {
        match e {
            ClientError::Customer(e) => Self::Customer(e),
            ClientError::Database(e) => Self::Database(e),
        }
    }
}

impl From<AccountError> for ApiError {
    fn from(e: AccountError) -> Self {
        match e {
            AccountError::Customer(e) => Self::Customer(e),
            AccountError::Database(e) => Self::Database(e),
        }
    }
}

impl From<MovementError> for ApiError {
    fn from(e: MovementError) -> Self {
        match e {
            MovementError::MovementNotFound(id) => Self::MovementNotFound(id),
            MovementError::CorruptAccountNumber(_) => Self::App(AppError::Internal(e.to_string())),
            MovementError::Database(e) => Self::Database(e),
        }
    }
}

impl From<StatementError> for ApiError {
    fn from(e: StatementError) -> Self {
        match e {
            StatementError::Report(e) => Self::Report(e),
            StatementError::Database(e) => Self::Database(e),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status.is_server_error() {
            error!(error = %self, code = self.code(), "Request failed");
            "An internal error occurred".to_string()
        } else {
            self.to_string()
        };

        (
            status,
            Json(json!({
                "error": self.code().to_ascii_lowercase(),
                "message": message,
            })),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bankdesk_shared::types::AccountNumber;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn number() -> AccountNumber {
        AccountNumber::new(478_758).unwrap()
    }

    #[rstest]
    #[case(ApiError::from(LedgerError::AccountNotFound(number())), StatusCode::NOT_FOUND, "ACCOUNT_NOT_FOUND")]
    #[case(
        ApiError::from(LedgerError::InsufficientFunds { balance: dec!(10), requested: dec!(20) }),
        StatusCode::CONFLICT,
        "INSUFFICIENT_FUNDS"
    )]
    #[case(
        ApiError::from(LedgerError::InvalidMovementKind("Transferencia".into())),
        StatusCode::BAD_REQUEST,
        "INVALID_MOVEMENT_KIND"
    )]
    #[case(ApiError::MovementNotFound(MovementId::new(9)), StatusCode::NOT_FOUND, "MOVEMENT_NOT_FOUND")]
    #[case(ApiError::validation("page must be a number"), StatusCode::BAD_REQUEST, "VALIDATION_ERROR")]
    #[case(
        ApiError::from(MovementError::CorruptAccountNumber(MovementId::new(1))),
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR"
    )]
    fn test_status_and_code(#[case] error: ApiError, #[case] status: StatusCode, #[case] code: &str) {
        assert_eq!(error.status(), status);
        assert_eq!(error.code(), code);
    }

    #[test]
    fn test_repository_errors_unwrap_domain_errors() {
        let error = ApiError::from(ClientError::Customer(CustomerError::DuplicateIdentification(
            "1712345678".into(),
        )));
        assert!(matches!(error, ApiError::Customer(CustomerError::DuplicateIdentification(_))));
        assert_eq!(error.status(), StatusCode::CONFLICT);
    }
}
