//! Movement queries.
//!
//! Movements are written only by the posting engine through
//! [`super::posting::PgLedgerStore`]. This repository reads them.

use bankdesk_core::ledger::{BusinessDay, Movement, MovementKind};
use bankdesk_shared::types::{AccountNumber, MovementId, PageRequest, PageResponse};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect,
};

use super::posting::to_movement;
use crate::entities::{accounts, movements, sea_orm_active_enums};

/// Error types for movement queries.
#[derive(Debug, thiserror::Error)]
pub enum MovementError {
    /// Movement not found.
    #[error("Movement {0} not found")]
    MovementNotFound(MovementId),

    /// A stored account number is outside the valid range.
    #[error("Corrupt account number on movement {0}")]
    CorruptAccountNumber(MovementId),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// A movement together with its account number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovementWithAccount {
    /// The movement.
    pub movement: Movement,
    /// Account number.
    pub account_number: AccountNumber,
}

/// Filter options for listing movements.
#[derive(Debug, Clone, Default)]
pub struct MovementFilter {
    /// Account number.
    pub account_number: Option<AccountNumber>,
    /// Kind.
    pub kind: Option<MovementKind>,
    /// Business day.
    pub date: Option<NaiveDate>,
    /// Exact signed amount.
    pub amount: Option<Decimal>,
    /// Exact balance snapshot.
    pub balance: Option<Decimal>,
}

/// Movement repository for read operations.
#[derive(Debug, Clone)]
pub struct MovementRepository {
    db: DatabaseConnection,
    calendar: BusinessDay,
}

impl MovementRepository {
    /// Creates a new movement repository. `calendar` resolves date filters.
    #[must_use]
    pub const fn new(db: DatabaseConnection, calendar: BusinessDay) -> Self {
        Self { db, calendar }
    }

    /// Finds a movement by id.
    ///
    /// # Errors
    ///
    /// Returns `MovementNotFound` if the movement does not exist.
    pub async fn get(&self, id: MovementId) -> Result<MovementWithAccount, MovementError> {
        let (movement, account) = movements::Entity::find_by_id(id.into_inner())
            .find_also_related(accounts::Entity)
            .one(&self.db)
            .await?
            .ok_or(MovementError::MovementNotFound(id))?;
        with_account(movement, account)
    }

    /// Lists movements, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        filter: MovementFilter,
        page: &PageRequest,
    ) -> Result<PageResponse<MovementWithAccount>, MovementError> {
        let mut query = movements::Entity::find()
            .find_also_related(accounts::Entity)
            .order_by_desc(movements::Column::CreatedAt)
            .order_by_desc(movements::Column::Id);

        if let Some(number) = filter.account_number {
            query = query.filter(accounts::Column::Number.eq(number.as_i32()));
        }
        if let Some(kind) = filter.kind {
            query = query.filter(movements::Column::Kind.eq(sea_orm_active_enums::MovementKind::from(kind)));
        }
        if let Some(date) = filter.date {
            let window = self.calendar.window_for(date);
            query = query
                .filter(movements::Column::CreatedAt.gte(window.start))
                .filter(movements::Column::CreatedAt.lt(window.end));
        }
        if let Some(amount) = filter.amount {
            query = query.filter(movements::Column::Amount.eq(amount));
        }
        if let Some(balance) = filter.balance {
            query = query.filter(movements::Column::Balance.eq(balance));
        }

        let total = query.clone().count(&self.db).await?;
        let rows = query
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await?;

        let data = rows
            .into_iter()
            .map(|(movement, account)| with_account(movement, account))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(PageResponse::new(data, page.page, page.per_page, total))
    }
}

fn with_account(
    movement: movements::Model,
    account: Option<accounts::Model>,
) -> Result<MovementWithAccount, MovementError> {
    let id = MovementId::new(movement.id);
    let account_number = account
        .and_then(|account| AccountNumber::try_from(account.number).ok())
        .ok_or(MovementError::CorruptAccountNumber(id))?;
    Ok(MovementWithAccount {
        movement: to_movement(movement),
        account_number,
    })
}
