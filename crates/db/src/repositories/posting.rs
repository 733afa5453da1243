//! PostgreSQL implementation of the ledger store.
//!
//! Each posting runs in a READ COMMITTED transaction that starts by taking
//! `SELECT ... FOR UPDATE` on the account row. Later statements of the same
//! transaction take fresh snapshots, so they see every movement committed by
//! whoever held the lock before. REPEATABLE READ would pin the snapshot before
//! the lock wait and read a stale last balance.

use async_trait::async_trait;
use bankdesk_core::ledger::{
    AccountSnapshot, DayWindow, LedgerError, LedgerStore, LedgerTx, LockMode, Movement, NewMovement,
};
use bankdesk_shared::types::{AccountId, AccountNumber, ClientId, MovementId};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    IsolationLevel, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};

use crate::entities::{accounts, movements, sea_orm_active_enums::MovementKind};

/// Ledger store backed by PostgreSQL.
#[derive(Debug, Clone)]
pub struct PgLedgerStore {
    db: DatabaseConnection,
}

impl PgLedgerStore {
    /// Creates a new ledger store.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl LedgerStore for PgLedgerStore {
    type Tx = PgLedgerTx;

    async fn begin(&self) -> Result<Self::Tx, LedgerError> {
        let txn = self
            .db
            .begin_with_config(Some(IsolationLevel::ReadCommitted), None)
            .await
            .map_err(persistence)?;
        Ok(PgLedgerTx { txn })
    }
}

/// Ledger transaction over a database transaction.
pub struct PgLedgerTx {
    txn: DatabaseTransaction,
}

#[async_trait]
impl LedgerTx for PgLedgerTx {
    async fn find_account(
        &mut self,
        number: AccountNumber,
        lock: LockMode,
    ) -> Result<Option<AccountSnapshot>, LedgerError> {
        let mut query = accounts::Entity::find().filter(accounts::Column::Number.eq(number.as_i32()));
        if lock == LockMode::Exclusive {
            query = query.lock_exclusive();
        }

        let account = query.one(&self.txn).await.map_err(persistence)?;
        account.map(to_snapshot).transpose()
    }

    async fn last_movement(&mut self, account_id: AccountId) -> Result<Option<Movement>, LedgerError> {
        let latest = movements::Entity::find()
            .filter(movements::Column::AccountId.eq(account_id.into_inner()))
            .order_by_desc(movements::Column::CreatedAt)
            .order_by_desc(movements::Column::Id)
            .one(&self.txn)
            .await
            .map_err(persistence)?;
        Ok(latest.map(to_movement))
    }

    async fn debited_between(
        &mut self,
        account_id: AccountId,
        window: DayWindow,
    ) -> Result<Decimal, LedgerError> {
        let total: Option<Option<Decimal>> = movements::Entity::find()
            .select_only()
            .column_as(movements::Column::Amount.sum(), "total")
            .filter(movements::Column::AccountId.eq(account_id.into_inner()))
            .filter(movements::Column::Kind.eq(MovementKind::Debit))
            .filter(movements::Column::CreatedAt.gte(window.start))
            .filter(movements::Column::CreatedAt.lt(window.end))
            .into_tuple()
            .one(&self.txn)
            .await
            .map_err(persistence)?;

        // Debit amounts are stored negative.
        Ok(total.flatten().unwrap_or_default().abs())
    }

    async fn append(&mut self, movement: NewMovement) -> Result<Movement, LedgerError> {
        let model = movements::ActiveModel {
            account_id: Set(movement.account_id.into_inner()),
            kind: Set(movement.kind.into()),
            amount: Set(movement.amount),
            balance: Set(movement.balance),
            created_at: Set(movement.created_at.into()),
            ..Default::default()
        }
        .insert(&self.txn)
        .await
        .map_err(persistence)?;

        Ok(to_movement(model))
    }

    async fn commit(self) -> Result<(), LedgerError> {
        self.txn.commit().await.map_err(persistence)
    }

    async fn rollback(self) -> Result<(), LedgerError> {
        self.txn.rollback().await.map_err(persistence)
    }
}

fn persistence(err: DbErr) -> LedgerError {
    LedgerError::Persistence(err.to_string())
}

fn to_snapshot(model: accounts::Model) -> Result<AccountSnapshot, LedgerError> {
    let number = AccountNumber::try_from(model.number)
        .map_err(|e| LedgerError::Persistence(format!("account {}: {e}", model.id)))?;
    Ok(AccountSnapshot {
        id: AccountId::new(model.id),
        number,
        client_id: ClientId::new(model.client_id),
        opening_balance: model.opening_balance,
        is_active: model.is_active,
    })
}

/// Converts a movement row into the core type.
pub fn to_movement(model: movements::Model) -> Movement {
    Movement {
        id: MovementId::new(model.id),
        account_id: AccountId::new(model.account_id),
        kind: model.kind.into(),
        amount: model.amount,
        balance: model.balance,
        created_at: model.created_at.with_timezone(&Utc),
    }
}
