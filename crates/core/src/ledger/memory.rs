//! In-memory ledger store.
//!
//! Backs the posting engine in tests and local tooling. Exclusive account
//! locks are per-account async mutexes held by the transaction, and writes are
//! buffered in the transaction until commit, so concurrent postings observe
//! the same isolation they get from PostgreSQL row locks.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use bankdesk_shared::types::{AccountId, AccountNumber, ClientId, MovementId};
use dashmap::DashMap;
use rust_decimal::Decimal;
use tokio::sync::OwnedMutexGuard;

use super::balance::latest_movement;
use super::error::LedgerError;
use super::limit::DayWindow;
use super::store::{LedgerStore, LedgerTx, LockMode};
use super::types::{AccountSnapshot, Movement, MovementKind, NewMovement};

#[derive(Debug, Default)]
struct LedgerState {
    accounts: HashMap<AccountNumber, AccountSnapshot>,
    movements: Vec<Movement>,
    last_account_id: i64,
    last_movement_id: i64,
}

/// Shared in-memory ledger. Clones share the same data.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLedger {
    state: Arc<Mutex<LedgerState>>,
    locks: Arc<DashMap<AccountNumber, Arc<tokio::sync::Mutex<()>>>>,
}

impl InMemoryLedger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, LedgerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Opens an active account. Returns `None` if the number is taken.
    pub fn open_account(
        &self,
        number: AccountNumber,
        client_id: ClientId,
        opening_balance: Decimal,
    ) -> Option<AccountSnapshot> {
        let mut state = self.state();
        if state.accounts.contains_key(&number) {
            return None;
        }
        state.last_account_id += 1;
        let account = AccountSnapshot {
            id: AccountId::new(state.last_account_id),
            number,
            client_id,
            opening_balance,
            is_active: true,
        };
        state.accounts.insert(number, account.clone());
        Some(account)
    }

    /// Flips the active flag. Returns false if the account does not exist.
    pub fn set_active(&self, number: AccountNumber, is_active: bool) -> bool {
        self.state()
            .accounts
            .get_mut(&number)
            .map(|account| account.is_active = is_active)
            .is_some()
    }

    /// Looks up an account outside any transaction.
    pub fn account(&self, number: AccountNumber) -> Option<AccountSnapshot> {
        self.state().accounts.get(&number).cloned()
    }

    /// Committed movements of an account in `(created_at, id)` order.
    pub fn movements(&self, number: AccountNumber) -> Vec<Movement> {
        let state = self.state();
        let Some(account) = state.accounts.get(&number) else {
            return Vec::new();
        };
        let mut movements: Vec<Movement> = state
            .movements
            .iter()
            .filter(|movement| movement.account_id == account.id)
            .cloned()
            .collect();
        movements.sort_by_key(|movement| (movement.created_at, movement.id));
        movements
    }

    fn account_lock(&self, number: AccountNumber) -> Arc<tokio::sync::Mutex<()>> {
        self.locks.entry(number).or_default().clone()
    }
}

#[async_trait]
impl LedgerStore for InMemoryLedger {
    type Tx = InMemoryTx;

    async fn begin(&self) -> Result<Self::Tx, LedgerError> {
        Ok(InMemoryTx {
            ledger: self.clone(),
            held: Vec::new(),
            pending: Vec::new(),
        })
    }
}

/// Transaction over an [`InMemoryLedger`].
#[derive(Debug)]
pub struct InMemoryTx {
    ledger: InMemoryLedger,
    held: Vec<(AccountNumber, OwnedMutexGuard<()>)>,
    pending: Vec<Movement>,
}

impl InMemoryTx {
    fn holds(&self, number: AccountNumber) -> bool {
        self.held.iter().any(|(held, _)| *held == number)
    }
}

#[async_trait]
impl LedgerTx for InMemoryTx {
    async fn find_account(
        &mut self,
        number: AccountNumber,
        lock: LockMode,
    ) -> Result<Option<AccountSnapshot>, LedgerError> {
        if lock == LockMode::Exclusive && !self.holds(number) {
            let guard = self.ledger.account_lock(number).lock_owned().await;
            self.held.push((number, guard));
        }
        Ok(self.ledger.account(number))
    }

    async fn last_movement(&mut self, account_id: AccountId) -> Result<Option<Movement>, LedgerError> {
        let state = self.ledger.state();
        let latest = latest_movement(
            state
                .movements
                .iter()
                .chain(self.pending.iter())
                .filter(|movement| movement.account_id == account_id),
        );
        Ok(latest.cloned())
    }

    async fn debited_between(
        &mut self,
        account_id: AccountId,
        window: DayWindow,
    ) -> Result<Decimal, LedgerError> {
        let state = self.ledger.state();
        Ok(state
            .movements
            .iter()
            .chain(self.pending.iter())
            .filter(|movement| {
                movement.account_id == account_id
                    && movement.kind == MovementKind::Debit
                    && window.contains(movement.created_at)
            })
            .map(Movement::magnitude)
            .sum())
    }

    async fn append(&mut self, movement: NewMovement) -> Result<Movement, LedgerError> {
        // Suspension point, like a database round trip.
        tokio::task::yield_now().await;

        let id = {
            let mut state = self.ledger.state();
            state.last_movement_id += 1;
            MovementId::new(state.last_movement_id)
        };
        let movement = Movement {
            id,
            account_id: movement.account_id,
            kind: movement.kind,
            amount: movement.amount,
            balance: movement.balance,
            created_at: movement.created_at,
        };
        self.pending.push(movement.clone());
        Ok(movement)
    }

    async fn commit(mut self) -> Result<(), LedgerError> {
        let pending = std::mem::take(&mut self.pending);
        self.ledger.state().movements.extend(pending);
        Ok(())
    }

    async fn rollback(self) -> Result<(), LedgerError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};
    use rust_decimal_macros::dec;
    use std::time::Duration;

    fn number(value: u32) -> AccountNumber {
        AccountNumber::new(value).unwrap()
    }

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap()
    }

    fn credit(account_id: AccountId, amount: Decimal, balance: Decimal) -> NewMovement {
        NewMovement {
            account_id,
            kind: MovementKind::Credit,
            amount,
            balance,
            created_at: at(),
        }
    }

    #[test]
    fn test_open_account_rejects_duplicate_number() {
        let ledger = InMemoryLedger::new();
        assert!(ledger.open_account(number(478_758), ClientId::new(1), dec!(2000)).is_some());
        assert!(ledger.open_account(number(478_758), ClientId::new(2), dec!(0)).is_none());
        assert!(ledger.set_active(number(478_758), false));
        assert!(!ledger.account(number(478_758)).unwrap().is_active);
        assert!(!ledger.set_active(number(225_487), false));
    }

    #[tokio::test]
    async fn test_writes_are_invisible_until_commit() {
        let ledger = InMemoryLedger::new();
        let account = ledger.open_account(number(225_487), ClientId::new(1), dec!(100)).unwrap();

        let mut tx = ledger.begin().await.unwrap();
        let appended = tx.append(credit(account.id, dec!(600), dec!(700))).await.unwrap();
        assert_eq!(
            tx.last_movement(account.id).await.unwrap().map(|m| m.id),
            Some(appended.id)
        );
        assert!(ledger.movements(account.number).is_empty());

        tx.commit().await.unwrap();
        assert_eq!(ledger.movements(account.number), vec![appended]);
    }

    #[tokio::test]
    async fn test_rollback_and_drop_discard_writes() {
        let ledger = InMemoryLedger::new();
        let account = ledger.open_account(number(495_878), ClientId::new(1), dec!(0)).unwrap();

        let mut tx = ledger.begin().await.unwrap();
        tx.append(credit(account.id, dec!(150), dec!(150))).await.unwrap();
        tx.rollback().await.unwrap();

        let mut tx = ledger.begin().await.unwrap();
        tx.append(credit(account.id, dec!(150), dec!(150))).await.unwrap();
        drop(tx);

        assert!(ledger.movements(account.number).is_empty());
    }

    #[tokio::test]
    async fn test_exclusive_lock_blocks_second_transaction() {
        let ledger = InMemoryLedger::new();
        ledger.open_account(number(585_545), ClientId::new(1), dec!(1000)).unwrap();

        let mut first = ledger.begin().await.unwrap();
        first.find_account(number(585_545), LockMode::Exclusive).await.unwrap();
        // Re-locking inside the same transaction does not deadlock.
        first.find_account(number(585_545), LockMode::Exclusive).await.unwrap();

        let mut second = ledger.begin().await.unwrap();
        let blocked = tokio::time::timeout(
            Duration::from_millis(50),
            second.find_account(number(585_545), LockMode::Exclusive),
        )
        .await;
        assert!(blocked.is_err());

        // Plain reads are not blocked.
        let mut reader = ledger.begin().await.unwrap();
        assert!(reader.find_account(number(585_545), LockMode::None).await.unwrap().is_some());

        first.commit().await.unwrap();
        let acquired = tokio::time::timeout(
            Duration::from_millis(500),
            second.find_account(number(585_545), LockMode::Exclusive),
        )
        .await;
        assert!(matches!(acquired, Ok(Ok(Some(_)))));
    }

    #[tokio::test]
    async fn test_debited_between_counts_only_debits_in_window() {
        let ledger = InMemoryLedger::new();
        let account = ledger.open_account(number(100_001), ClientId::new(1), dec!(1000)).unwrap();
        let window = DayWindow {
            start: Utc.with_ymd_and_hms(2026, 3, 10, 0, 0, 0).unwrap(),
            end: Utc.with_ymd_and_hms(2026, 3, 11, 0, 0, 0).unwrap(),
        };

        let mut tx = ledger.begin().await.unwrap();
        let debit = |amount: Decimal, balance: Decimal, created_at| NewMovement {
            account_id: account.id,
            kind: MovementKind::Debit,
            amount,
            balance,
            created_at,
        };
        tx.append(debit(dec!(-100), dec!(900), window.start - chrono::TimeDelta::seconds(1)))
            .await
            .unwrap();
        tx.append(debit(dec!(-200), dec!(700), window.start)).await.unwrap();
        tx.append(credit(account.id, dec!(50), dec!(750))).await.unwrap();
        tx.append(debit(dec!(-25.50), dec!(724.50), window.end - chrono::TimeDelta::seconds(1)))
            .await
            .unwrap();
        tx.append(debit(dec!(-10), dec!(714.50), window.end)).await.unwrap();

        assert_eq!(tx.debited_between(account.id, window).await.unwrap(), dec!(225.50));
    }
}
