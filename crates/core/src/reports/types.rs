//! Statement report data types.

use bankdesk_shared::types::{AccountNumber, ClientId, MovementId};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::ReportError;
use crate::customer::AccountType;
use crate::ledger::{BusinessDay, DayWindow};

/// Inclusive range of business days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementPeriod {
    /// First business day.
    pub from: NaiveDate,
    /// Last business day.
    pub to: NaiveDate,
}

impl StatementPeriod {
    /// Creates a period, rejecting `from > to`.
    pub fn new(from: NaiveDate, to: NaiveDate) -> Result<Self, ReportError> {
        if from > to {
            return Err(ReportError::InvalidDateRange { from, to });
        }
        Ok(Self { from, to })
    }

    /// A single business day.
    #[must_use]
    pub const fn single_day(date: NaiveDate) -> Self {
        Self { from: date, to: date }
    }

    /// UTC span from the start of `from` to the end of `to`.
    #[must_use]
    pub fn window(&self, calendar: &BusinessDay) -> DayWindow {
        calendar
            .window_for(self.from)
            .through(calendar.window_for(self.to))
    }
}

/// Account data the statement needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatementAccount {
    /// Account number.
    pub number: AccountNumber,
    /// Account type.
    pub account_type: AccountType,
    /// Opening balance.
    pub opening_balance: Decimal,
    /// Whether the account is active.
    pub is_active: bool,
}

/// Movement data the statement needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatementMovement {
    /// Account the movement belongs to.
    pub account_number: AccountNumber,
    /// Movement id.
    pub id: MovementId,
    /// Signed amount.
    pub amount: Decimal,
    /// Balance snapshot after the movement.
    pub balance: Decimal,
    /// Timestamp.
    pub created_at: DateTime<Utc>,
}

/// One row of the statement: an account with movements in range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementLine {
    /// Timestamp of the last movement in range.
    pub last_movement_at: DateTime<Utc>,
    /// Client name.
    pub client_name: String,
    /// Account number.
    pub account_number: AccountNumber,
    /// Account type.
    pub account_type: AccountType,
    /// Opening balance.
    pub opening_balance: Decimal,
    /// Whether the account is active.
    pub is_active: bool,
    /// Net of all movement amounts in range.
    pub movement_total: Decimal,
    /// Sum of debit magnitudes in range.
    pub debit_total: Decimal,
    /// Sum of credits in range.
    pub credit_total: Decimal,
    /// Balance at the end of the range.
    pub available_balance: Decimal,
}

/// Account statement of one client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountStatement {
    /// Client id.
    pub client_id: ClientId,
    /// Client name.
    pub client_name: String,
    /// Covered business days.
    pub period: StatementPeriod,
    /// One line per account with movements, by account number.
    pub lines: Vec<StatementLine>,
}
