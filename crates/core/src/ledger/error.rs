//! Ledger error types for posting and balance queries.
//!
//! Every rejection the posting engine can produce is a variant here. All of
//! them except [`LedgerError::Persistence`] are raised before anything is
//! written.

use bankdesk_shared::types::AccountNumber;
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors that can occur during ledger operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    // ========== Account Errors ==========
    /// No account carries this number.
    #[error("Account {0} not found")]
    AccountNotFound(AccountNumber),

    /// Account is inactive and cannot receive movements.
    #[error("Account {0} is inactive")]
    AccountInactive(AccountNumber),

    // ========== Validation Errors ==========
    /// Movement kind is neither debit nor credit.
    #[error("Invalid movement kind '{0}', expected 'debit' or 'credit'")]
    InvalidMovementKind(String),

    /// Movement amount must be positive, storable, with at most two decimals.
    #[error("Invalid movement amount {0}")]
    InvalidAmount(Decimal),

    // ========== Business Rule Errors ==========
    /// Debit would take the balance below zero.
    #[error("Insufficient funds: balance {balance}, requested {requested}")]
    InsufficientFunds {
        /// Balance before the rejected debit.
        balance: Decimal,
        /// Debit magnitude that was requested.
        requested: Decimal,
    },

    /// Debit would push today's cumulative debits past the daily limit.
    #[error("Daily debit limit exceeded: debited today {debited_today}, requested {requested}, limit {limit}")]
    DailyLimitExceeded {
        /// Debits already posted in the current business day.
        debited_today: Decimal,
        /// Debit magnitude that was requested.
        requested: Decimal,
        /// Configured daily limit.
        limit: Decimal,
    },

    /// Credit would push the balance past the largest storable value.
    #[error("Balance out of range: balance {balance}, requested {requested}")]
    BalanceOutOfRange {
        /// Balance before the rejected credit.
        balance: Decimal,
        /// Credit magnitude that was requested.
        requested: Decimal,
    },

    // ========== Storage Errors ==========
    /// The ledger store failed; the transaction was rolled back.
    #[error("Persistence failure: {0}")]
    Persistence(String),
}

impl LedgerError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::AccountInactive(_) => "ACCOUNT_INACTIVE",
            Self::InvalidMovementKind(_) => "INVALID_MOVEMENT_KIND",
            Self::InvalidAmount(_) => "INVALID_AMOUNT",
            Self::InsufficientFunds { .. } => "INSUFFICIENT_FUNDS",
            Self::DailyLimitExceeded { .. } => "DAILY_LIMIT_EXCEEDED",
            Self::BalanceOutOfRange { .. } => "BALANCE_OUT_OF_RANGE",
            Self::Persistence(_) => "PERSISTENCE_FAILURE",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - malformed posting request
            Self::InvalidMovementKind(_) | Self::InvalidAmount(_) => 400,

            // 404 Not Found
            Self::AccountNotFound(_) => 404,

            // 409 Conflict - request is valid but the account state refuses it
            Self::AccountInactive(_)
            | Self::InsufficientFunds { .. }
            | Self::DailyLimitExceeded { .. }
            | Self::BalanceOutOfRange { .. } => 409,

            // 500 Internal Server Error
            Self::Persistence(_) => 500,
        }
    }

    /// Returns true if the error is a business rejection rather than a storage fault.
    #[must_use]
    pub const fn is_rejection(&self) -> bool {
        !matches!(self, Self::Persistence(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn number() -> AccountNumber {
        AccountNumber::new(478_758).unwrap()
    }

    #[rstest]
    #[case(LedgerError::AccountNotFound(number()), "ACCOUNT_NOT_FOUND", 404)]
    #[case(LedgerError::AccountInactive(number()), "ACCOUNT_INACTIVE", 409)]
    #[case(LedgerError::InvalidMovementKind("Transferencia".into()), "INVALID_MOVEMENT_KIND", 400)]
    #[case(LedgerError::InvalidAmount(dec!(0)), "INVALID_AMOUNT", 400)]
    #[case(
        LedgerError::InsufficientFunds { balance: dec!(100), requested: dec!(200) },
        "INSUFFICIENT_FUNDS",
        409
    )]
    #[case(
        LedgerError::DailyLimitExceeded { debited_today: dec!(900), requested: dec!(200), limit: dec!(1000) },
        "DAILY_LIMIT_EXCEEDED",
        409
    )]
    #[case(
        LedgerError::BalanceOutOfRange { balance: dec!(1000), requested: dec!(9999999999999999.99) },
        "BALANCE_OUT_OF_RANGE",
        409
    )]
    #[case(LedgerError::Persistence("connection reset".into()), "PERSISTENCE_FAILURE", 500)]
    fn test_codes_and_statuses(#[case] err: LedgerError, #[case] code: &str, #[case] status: u16) {
        assert_eq!(err.error_code(), code);
        assert_eq!(err.http_status_code(), status);
    }

    #[test]
    fn test_only_persistence_is_not_a_rejection() {
        assert!(LedgerError::AccountInactive(number()).is_rejection());
        assert!(LedgerError::InvalidAmount(dec!(-1)).is_rejection());
        assert!(!LedgerError::Persistence("disk full".into()).is_rejection());
    }

    #[test]
    fn test_error_display() {
        let err = LedgerError::InsufficientFunds {
            balance: dec!(100.00),
            requested: dec!(250.50),
        };
        assert_eq!(
            err.to_string(),
            "Insufficient funds: balance 100.00, requested 250.50"
        );

        let err = LedgerError::DailyLimitExceeded {
            debited_today: dec!(800),
            requested: dec!(300),
            limit: dec!(1000),
        };
        assert_eq!(
            err.to_string(),
            "Daily debit limit exceeded: debited today 800, requested 300, limit 1000"
        );
        assert_eq!(
            LedgerError::AccountNotFound(number()).to_string(),
            "Account 478758 not found"
        );
    }
}
