//! Domain types for movement posting.

use bankdesk_shared::types::{AccountId, AccountNumber, ClientId, MovementId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::LedgerError;

/// Direction of a movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MovementKind {
    /// Money leaves the account.
    Debit,
    /// Money enters the account.
    Credit,
}

impl MovementKind {
    /// Parses a movement kind case-insensitively.
    ///
    /// Surrounding whitespace is ignored. Anything other than `debit` or
    /// `credit` is rejected with [`LedgerError::InvalidMovementKind`].
    pub fn parse(raw: &str) -> Result<Self, LedgerError> {
        let trimmed = raw.trim();
        if trimmed.eq_ignore_ascii_case("debit") {
            Ok(Self::Debit)
        } else if trimmed.eq_ignore_ascii_case("credit") {
            Ok(Self::Credit)
        } else {
            Err(LedgerError::InvalidMovementKind(raw.to_string()))
        }
    }

    /// Applies the direction to a positive magnitude.
    #[must_use]
    pub fn signed(self, amount: Decimal) -> Decimal {
        match self {
            Self::Debit => -amount,
            Self::Credit => amount,
        }
    }

    /// Returns the canonical lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Debit => "debit",
            Self::Credit => "credit",
        }
    }
}

impl std::fmt::Display for MovementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The account state the posting engine needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountSnapshot {
    /// Internal row id.
    pub id: AccountId,
    /// Public account number.
    pub number: AccountNumber,
    /// Owning client.
    pub client_id: ClientId,
    /// Balance before the first movement. Never changes.
    pub opening_balance: Decimal,
    /// Whether the account accepts movements.
    pub is_active: bool,
}

/// A committed movement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movement {
    /// Movement id, assigned by the store.
    pub id: MovementId,
    /// Account the movement belongs to.
    pub account_id: AccountId,
    /// Direction.
    pub kind: MovementKind,
    /// Signed amount: negative for debits.
    pub amount: Decimal,
    /// Account balance right after this movement.
    pub balance: Decimal,
    /// Server timestamp.
    pub created_at: DateTime<Utc>,
}

impl Movement {
    /// Magnitude of the movement.
    #[must_use]
    pub fn magnitude(&self) -> Decimal {
        self.amount.abs()
    }
}

/// A validated movement waiting to be appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMovement {
    /// Account the movement belongs to.
    pub account_id: AccountId,
    /// Direction.
    pub kind: MovementKind,
    /// Signed amount.
    pub amount: Decimal,
    /// Balance snapshot after applying `amount`.
    pub balance: Decimal,
    /// Server timestamp.
    pub created_at: DateTime<Utc>,
}

/// Read-only balance view of an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceSummary {
    /// Account number.
    pub account_number: AccountNumber,
    /// Current balance.
    pub current_balance: Decimal,
    /// Debits posted in the current business day.
    pub debited_today: Decimal,
    /// Configured daily debit limit.
    pub daily_limit: Decimal,
    /// What can still be debited today, ignoring the balance.
    pub remaining_today: Decimal,
}
