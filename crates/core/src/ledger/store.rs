//! Storage seam of the posting engine.
//!
//! A [`LedgerStore`] hands out [`LedgerTx`] units of work. Everything the
//! engine reads and writes for one posting goes through a single transaction,
//! which is committed or rolled back as a whole. Dropping a transaction
//! without committing discards its writes.

use async_trait::async_trait;
use bankdesk_shared::types::{AccountId, AccountNumber};
use rust_decimal::Decimal;

use super::error::LedgerError;
use super::limit::DayWindow;
use super::types::{AccountSnapshot, Movement, NewMovement};

/// How an account row is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockMode {
    /// Plain read.
    None,
    /// Exclusive row lock held until the transaction ends.
    Exclusive,
}

/// Factory of ledger transactions.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Transaction type produced by this store.
    type Tx: LedgerTx;

    /// Opens a transaction.
    async fn begin(&self) -> Result<Self::Tx, LedgerError>;
}

/// One unit of work against the ledger.
#[async_trait]
pub trait LedgerTx: Send {
    /// Looks up an account by number, optionally locking it.
    async fn find_account(
        &mut self,
        number: AccountNumber,
        lock: LockMode,
    ) -> Result<Option<AccountSnapshot>, LedgerError>;

    /// Latest movement of the account by `(created_at, id)`.
    async fn last_movement(&mut self, account_id: AccountId) -> Result<Option<Movement>, LedgerError>;

    /// Sum of debit magnitudes with `created_at` inside `window`.
    async fn debited_between(
        &mut self,
        account_id: AccountId,
        window: DayWindow,
    ) -> Result<Decimal, LedgerError>;

    /// Appends a movement and returns it with its assigned id.
    async fn append(&mut self, movement: NewMovement) -> Result<Movement, LedgerError>;

    /// Makes every write of the transaction durable.
    async fn commit(self) -> Result<(), LedgerError>;

    /// Discards every write of the transaction.
    async fn rollback(self) -> Result<(), LedgerError>;
}
