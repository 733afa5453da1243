//! Errors for client and account management.

use bankdesk_shared::types::{AccountNumber, ClientId};
use rust_decimal::Decimal;
use thiserror::Error;

use super::password::PasswordError;

/// Errors that can occur while managing clients and accounts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CustomerError {
    // ========== Not Found ==========
    /// Client does not exist.
    #[error("Client {0} not found")]
    ClientNotFound(ClientId),

    /// Account does not exist.
    #[error("Account {0} not found")]
    AccountNotFound(AccountNumber),

    // ========== State ==========
    /// Client is inactive.
    #[error("Client {0} is inactive")]
    ClientInactive(ClientId),

    /// Another client already uses this identification.
    #[error("A client with identification '{0}' already exists")]
    DuplicateIdentification(String),

    // ========== Validation ==========
    /// Account type is neither savings nor checking.
    #[error("Invalid account type '{0}', expected 'savings' or 'checking'")]
    InvalidAccountType(String),

    /// Opening balance is negative or has more than two decimals.
    #[error("Invalid opening balance {0}")]
    InvalidOpeningBalance(Decimal),

    /// A client field is out of range.
    #[error("Invalid {field}: {reason}")]
    InvalidField {
        /// Field name.
        field: &'static str,
        /// What is wrong with it.
        reason: &'static str,
    },

    // ========== Internal ==========
    /// No free account number was found.
    #[error("No free account number found after {0} attempts")]
    AccountNumberExhausted(usize),

    /// Password hashing failed.
    #[error(transparent)]
    Password(#[from] PasswordError),

    /// Storage failed.
    #[error("Persistence failure: {0}")]
    Persistence(String),
}

impl CustomerError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::ClientNotFound(_) => "CLIENT_NOT_FOUND",
            Self::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::ClientInactive(_) => "CLIENT_INACTIVE",
            Self::DuplicateIdentification(_) => "DUPLICATE_IDENTIFICATION",
            Self::InvalidAccountType(_) => "INVALID_ACCOUNT_TYPE",
            Self::InvalidOpeningBalance(_) => "INVALID_OPENING_BALANCE",
            Self::InvalidField { .. } => "VALIDATION_ERROR",
            Self::AccountNumberExhausted(_) => "ACCOUNT_NUMBER_EXHAUSTED",
            Self::Password(_) => "PASSWORD_HASH_FAILURE",
            Self::Persistence(_) => "PERSISTENCE_FAILURE",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::InvalidAccountType(_)
            | Self::InvalidOpeningBalance(_)
            | Self::InvalidField { .. } => 400,

            Self::ClientNotFound(_) | Self::AccountNotFound(_) => 404,

            Self::ClientInactive(_) | Self::DuplicateIdentification(_) => 409,

            Self::AccountNumberExhausted(_) | Self::Password(_) | Self::Persistence(_) => 500,
        }
    }
}
