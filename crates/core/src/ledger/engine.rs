//! Posting engine - validates and commits movements atomically.
//!
//! A posting walks `Received -> Validated -> Committed`, or stops at
//! `Rejected` on the first failing check:
//!
//! 1. resolve and lock the account (`AccountNotFound`)
//! 2. status gate (`AccountInactive`)
//! 3. normalize kind and amount (`InvalidMovementKind`, `InvalidAmount`)
//! 4. resolve the current balance and project the next one (`BalanceOutOfRange`)
//! 5. debit: overdraft check (`InsufficientFunds`)
//! 6. debit: daily limit (`DailyLimitExceeded`)
//! 7. append the movement and commit
//!
//! Every step runs in one ledger transaction. Any failure rolls it back.

use std::sync::Arc;

use bankdesk_shared::types::AccountNumber;
use chrono_tz::Tz;
use rust_decimal::Decimal;
use tracing::{debug, error, info, warn};

use super::balance::{RunningBalance, current_balance};
use super::clock::{Clock, SystemClock};
use super::error::LedgerError;
use super::limit::{BusinessDay, DailyLimit};
use super::store::{LedgerStore, LedgerTx, LockMode};
use super::types::{AccountSnapshot, BalanceSummary, Movement, MovementKind, NewMovement};
use crate::customer::gate;

/// Largest number of fractional digits a movement amount may carry.
pub const AMOUNT_SCALE: u32 = 2;

/// Largest amount or balance storable in a `NUMERIC(18,2)` column.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(0xA763_FFFF, 0x0DE0_B6B3, 0, false, AMOUNT_SCALE);

/// Business rules applied to every posting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PostingRules {
    /// Daily debit cap.
    pub daily_limit: DailyLimit,
    /// Calendar that defines "today".
    pub business_day: BusinessDay,
}

impl PostingRules {
    /// Creates the rules from configured values.
    #[must_use]
    pub const fn new(daily_debit_limit: Decimal, timezone: Tz) -> Self {
        Self {
            daily_limit: DailyLimit::new(daily_debit_limit),
            business_day: BusinessDay::new(timezone),
        }
    }
}

/// Validates and posts movements through a [`LedgerStore`].
pub struct PostingEngine<S> {
    store: S,
    rules: PostingRules,
    clock: Arc<dyn Clock>,
}

impl<S: std::fmt::Debug> std::fmt::Debug for PostingEngine<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostingEngine")
            .field("store", &self.store)
            .field("rules", &self.rules)
            .finish_non_exhaustive()
    }
}

impl<S: LedgerStore> PostingEngine<S> {
    /// Creates an engine driven by the system clock.
    #[must_use]
    pub fn new(store: S, rules: PostingRules) -> Self {
        Self {
            store,
            rules,
            clock: Arc::new(SystemClock),
        }
    }

    /// Replaces the clock.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// The underlying store.
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// The rules in force.
    pub const fn rules(&self) -> &PostingRules {
        &self.rules
    }

    /// Posts a movement and returns it as committed.
    ///
    /// `kind` is matched case-insensitively against `debit` and `credit`;
    /// `amount` is the positive magnitude.
    pub async fn post(
        &self,
        account_number: AccountNumber,
        kind: &str,
        amount: Decimal,
    ) -> Result<Movement, LedgerError> {
        let mut tx = self.store.begin().await?;

        match self.validate_and_append(&mut tx, account_number, kind, amount).await {
            Ok(movement) => {
                tx.commit().await.inspect_err(|e| {
                    error!(error = %e, account_number = %account_number, "Failed to commit movement");
                })?;
                info!(
                    account_number = %account_number,
                    movement_id = %movement.id,
                    kind = %movement.kind,
                    amount = %movement.amount,
                    balance = %movement.balance,
                    "Movement posted"
                );
                Ok(movement)
            }
            Err(err) => {
                if let Err(rollback_err) = tx.rollback().await {
                    error!(error = %rollback_err, account_number = %account_number, "Rollback failed");
                }
                if err.is_rejection() {
                    warn!(
                        account_number = %account_number,
                        code = err.error_code(),
                        error = %err,
                        "Movement rejected"
                    );
                } else {
                    error!(account_number = %account_number, error = %err, "Movement posting failed");
                }
                Err(err)
            }
        }
    }

    async fn validate_and_append(
        &self,
        tx: &mut S::Tx,
        account_number: AccountNumber,
        kind: &str,
        amount: Decimal,
    ) -> Result<Movement, LedgerError> {
        let account = require_account(tx, account_number, LockMode::Exclusive).await?;
        gate::ensure_account_postable(&account)?;

        let kind = MovementKind::parse(kind)?;
        validate_amount(amount)?;
        let signed = kind.signed(amount);

        let latest = tx.last_movement(account.id).await?;
        let current = current_balance(account.opening_balance, latest.as_ref());
        let next = RunningBalance::next(current, signed)
            .filter(|next| next.current_balance <= MAX_AMOUNT)
            .ok_or(LedgerError::BalanceOutOfRange {
                balance: current,
                requested: amount,
            })?;

        // Keep the chain ordered even if the clock steps backwards.
        let mut now = self.clock.now();
        if let Some(last) = &latest {
            now = now.max(last.created_at);
        }

        if kind == MovementKind::Debit {
            if next.is_overdrawn() {
                return Err(LedgerError::InsufficientFunds {
                    balance: current,
                    requested: amount,
                });
            }
            let window = self.rules.business_day.window_containing(now);
            let debited_today = tx.debited_between(account.id, window).await?;
            self.rules.daily_limit.check(debited_today, amount)?;
            debug!(
                account_number = %account_number,
                debited_today = %debited_today,
                requested = %amount,
                "Daily limit check passed"
            );
        }

        tx.append(NewMovement {
            account_id: account.id,
            kind,
            amount: signed,
            balance: next.current_balance,
            created_at: now,
        })
        .await
    }

    /// Current balance of an account. Read-only, takes no lock.
    pub async fn current_balance(&self, account_number: AccountNumber) -> Result<Decimal, LedgerError> {
        Ok(self.balance_summary(account_number).await?.current_balance)
    }

    /// Debits posted to an account in the current business day.
    pub async fn debited_today(&self, account_number: AccountNumber) -> Result<Decimal, LedgerError> {
        Ok(self.balance_summary(account_number).await?.debited_today)
    }

    /// Balance, today's debits and the remaining daily allowance.
    pub async fn balance_summary(
        &self,
        account_number: AccountNumber,
    ) -> Result<BalanceSummary, LedgerError> {
        let mut tx = self.store.begin().await?;
        let summary = self.read_summary(&mut tx, account_number).await;
        tx.rollback().await?;
        summary
    }

    async fn read_summary(
        &self,
        tx: &mut S::Tx,
        account_number: AccountNumber,
    ) -> Result<BalanceSummary, LedgerError> {
        let account = require_account(tx, account_number, LockMode::None).await?;
        let latest = tx.last_movement(account.id).await?;
        let window = self.rules.business_day.window_containing(self.clock.now());
        let debited_today = tx.debited_between(account.id, window).await?;

        Ok(BalanceSummary {
            account_number,
            current_balance: current_balance(account.opening_balance, latest.as_ref()),
            debited_today,
            daily_limit: self.rules.daily_limit.amount(),
            remaining_today: self.rules.daily_limit.remaining(debited_today),
        })
    }
}

async fn require_account<T: LedgerTx>(
    tx: &mut T,
    account_number: AccountNumber,
    lock: LockMode,
) -> Result<AccountSnapshot, LedgerError> {
    tx.find_account(account_number, lock)
        .await?
        .ok_or(LedgerError::AccountNotFound(account_number))
}

/// Amounts must be positive, storable, and carry at most two fractional digits.
fn validate_amount(amount: Decimal) -> Result<(), LedgerError> {
    if amount <= Decimal::ZERO
        || amount > MAX_AMOUNT
        || amount.normalize().scale() > AMOUNT_SCALE
    {
        return Err(LedgerError::InvalidAmount(amount));
    }
    Ok(())
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
