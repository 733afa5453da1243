//! Statement report queries.

use bankdesk_core::ledger::BusinessDay;
use bankdesk_core::reports::{
    AccountStatement, ReportError, StatementAccount, StatementBuilder, StatementMovement,
    StatementPeriod,
};
use bankdesk_shared::types::{AccountNumber, ClientId, MovementId};
use chrono::Utc;
use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder};

use crate::entities::{accounts, clients, movements};

/// Error types for statement generation.
#[derive(Debug, thiserror::Error)]
pub enum StatementError {
    /// Report rule violation.
    #[error(transparent)]
    Report(#[from] ReportError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Report repository.
#[derive(Debug, Clone)]
pub struct ReportRepository {
    db: DatabaseConnection,
    calendar: BusinessDay,
}

impl ReportRepository {
    /// Creates a new report repository. `calendar` resolves the period.
    #[must_use]
    pub const fn new(db: DatabaseConnection, calendar: BusinessDay) -> Self {
        Self { db, calendar }
    }

    /// Builds the account statement of a client for a period.
    ///
    /// # Errors
    ///
    /// Returns `ClientNotFound` for an unknown client, `NoMovements` when no
    /// account of the client moved during the period.
    pub async fn statement(
        &self,
        client_id: ClientId,
        period: StatementPeriod,
    ) -> Result<AccountStatement, StatementError> {
        let client = clients::Entity::find_by_id(client_id.into_inner())
            .one(&self.db)
            .await?
            .ok_or(ReportError::ClientNotFound(client_id))?;

        let account_rows = accounts::Entity::find()
            .filter(accounts::Column::ClientId.eq(client.id))
            .order_by_asc(accounts::Column::Number)
            .all(&self.db)
            .await?;

        let window = period.window(&self.calendar);
        let account_ids: Vec<i64> = account_rows.iter().map(|a| a.id).collect();
        let movement_rows = movements::Entity::find()
            .filter(movements::Column::AccountId.is_in(account_ids))
            .filter(movements::Column::CreatedAt.gte(window.start))
            .filter(movements::Column::CreatedAt.lt(window.end))
            .order_by_asc(movements::Column::CreatedAt)
            .order_by_asc(movements::Column::Id)
            .all(&self.db)
            .await?;

        let mut statement_accounts = Vec::with_capacity(account_rows.len());
        let mut numbers = std::collections::HashMap::with_capacity(account_rows.len());
        for account in account_rows {
            let Ok(number) = AccountNumber::try_from(account.number) else {
                continue;
            };
            numbers.insert(account.id, number);
            statement_accounts.push(StatementAccount {
                number,
                account_type: account.account_type.into(),
                opening_balance: account.opening_balance,
                is_active: account.is_active,
            });
        }

        let statement_movements: Vec<StatementMovement> = movement_rows
            .into_iter()
            .filter_map(|movement| {
                Some(StatementMovement {
                    account_number: *numbers.get(&movement.account_id)?,
                    id: MovementId::new(movement.id),
                    amount: movement.amount,
                    balance: movement.balance,
                    created_at: movement.created_at.with_timezone(&Utc),
                })
            })
            .collect();

        Ok(StatementBuilder::build(
            client_id,
            &client.name,
            period,
            &statement_accounts,
            &statement_movements,
        )?)
    }
}
