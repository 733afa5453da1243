//! Account repository.
//!
//! Balances are never stored on the account row: they are read from the
//! latest movement, falling back to the opening balance.

use std::sync::Mutex;

use bankdesk_core::customer::{
    AccountChanges, AccountNumberGenerator, AccountType, CustomerError, gate, numbering,
    validate_opening_balance,
};
use bankdesk_core::ledger::current_balance;
use bankdesk_shared::types::{AccountNumber, ClientId, PageRequest, PageResponse};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction, DbErr,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, SqlErr,
    TransactionTrait,
};
use tracing::info;

use super::posting::to_movement;
use crate::entities::{accounts, clients, movements};

/// Error types for account operations.
#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    /// Domain rule violation.
    #[error(transparent)]
    Customer(#[from] CustomerError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Account with owner name and current balance.
#[derive(Debug, Clone)]
pub struct AccountWithBalance {
    /// The account record.
    pub account: accounts::Model,
    /// Owning client's name.
    pub client_name: String,
    /// Current balance (latest movement snapshot, or opening balance).
    pub balance: Decimal,
}

/// Input for opening an account.
#[derive(Debug, Clone)]
pub struct CreateAccountInput {
    /// Owning client.
    pub client_id: ClientId,
    /// Account type.
    pub account_type: AccountType,
    /// Opening balance (>= 0, two decimals).
    pub opening_balance: Decimal,
}

/// Filter options for listing accounts.
#[derive(Debug, Clone, Default)]
pub struct AccountFilter {
    /// Exact account number.
    pub number: Option<AccountNumber>,
    /// Account type.
    pub account_type: Option<AccountType>,
    /// Active flag.
    pub is_active: Option<bool>,
    /// Owning client.
    pub client_id: Option<ClientId>,
}

/// Account repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct AccountRepository {
    db: DatabaseConnection,
}

impl AccountRepository {
    /// Creates a new account repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Opens an account for an active client with a freshly generated number.
    ///
    /// The client row is share-locked so a concurrent soft delete cannot
    /// slip in between the status check and the insert. A number taken by a
    /// concurrent creation counts as a collision and another one is drawn.
    ///
    /// # Errors
    ///
    /// Returns an error if the client does not exist or is inactive, the
    /// opening balance is invalid, no free number is found, or the database
    /// operation fails.
    pub async fn create(
        &self,
        input: CreateAccountInput,
        numbers: &Mutex<AccountNumberGenerator>,
    ) -> Result<AccountWithBalance, AccountError> {
        validate_opening_balance(input.opening_balance)?;

        let txn = self.db.begin().await?;
        let client = clients::Entity::find_by_id(input.client_id.into_inner())
            .lock_shared()
            .one(&txn)
            .await?
            .ok_or(CustomerError::ClientNotFound(input.client_id))?;
        gate::ensure_client_accepts_accounts(input.client_id, client.is_active)?;

        let now = chrono::Utc::now().into();
        let template = accounts::ActiveModel {
            client_id: Set(client.id),
            account_type: Set(input.account_type.into()),
            opening_balance: Set(input.opening_balance),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        let conn = &txn;
        let account = numbering::allocate(numbers, move |candidate| {
            claim_number(conn, template.clone(), candidate)
        })
        .await?;
        txn.commit().await?;

        info!(account_number = account.number, client_id = client.id, "Account opened");
        Ok(AccountWithBalance {
            balance: account.opening_balance,
            account,
            client_name: client.name,
        })
    }

    /// Finds an account by number, with its current balance.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` if no account has this number.
    pub async fn get(&self, number: AccountNumber) -> Result<AccountWithBalance, AccountError> {
        let (account, client) = accounts::Entity::find()
            .filter(accounts::Column::Number.eq(number.as_i32()))
            .find_also_related(clients::Entity)
            .one(&self.db)
            .await?
            .ok_or(CustomerError::AccountNotFound(number))?;
        self.with_balance(account, client).await
    }

    /// Lists accounts, active first then by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        filter: AccountFilter,
        page: &PageRequest,
    ) -> Result<PageResponse<AccountWithBalance>, AccountError> {
        let mut query = accounts::Entity::find()
            .order_by_desc(accounts::Column::IsActive)
            .order_by_asc(accounts::Column::Id);

        if let Some(number) = filter.number {
            query = query.filter(accounts::Column::Number.eq(number.as_i32()));
        }
        if let Some(account_type) = filter.account_type {
            query = query.filter(
                accounts::Column::AccountType
                    .eq(crate::entities::sea_orm_active_enums::AccountType::from(account_type)),
            );
        }
        if let Some(is_active) = filter.is_active {
            query = query.filter(accounts::Column::IsActive.eq(is_active));
        }
        if let Some(client_id) = filter.client_id {
            query = query.filter(accounts::Column::ClientId.eq(client_id.into_inner()));
        }

        let total = query.clone().count(&self.db).await?;
        let rows = query
            .find_also_related(clients::Entity)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await?;

        let mut data = Vec::with_capacity(rows.len());
        for (account, client) in rows {
            data.push(self.with_balance(account, client).await?);
        }

        Ok(PageResponse::new(data, page.page, page.per_page, total))
    }

    /// Updates the type and/or active flag of an account.
    ///
    /// # Errors
    ///
    /// Returns an error if the account does not exist, or if it would be
    /// re-activated while its client is inactive.
    pub async fn update(
        &self,
        number: AccountNumber,
        changes: AccountChanges,
    ) -> Result<AccountWithBalance, AccountError> {
        let txn = self.db.begin().await?;
        let account = accounts::Entity::find()
            .filter(accounts::Column::Number.eq(number.as_i32()))
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or(CustomerError::AccountNotFound(number))?;
        let client = clients::Entity::find_by_id(account.client_id)
            .lock_shared()
            .one(&txn)
            .await?
            .ok_or(CustomerError::ClientNotFound(ClientId::new(account.client_id)))?;

        gate::ensure_account_update_allowed(
            ClientId::new(client.id),
            client.is_active,
            account.is_active,
            &changes,
        )?;

        let mut active: accounts::ActiveModel = account.into();
        if let Some(account_type) = changes.account_type {
            active.account_type = Set(account_type.into());
        }
        if let Some(is_active) = changes.is_active {
            active.is_active = Set(is_active);
        }
        active.updated_at = Set(chrono::Utc::now().into());
        let updated = active.update(&txn).await?;
        txn.commit().await?;

        info!(account_number = %number, "Account updated");
        self.with_balance(updated, Some(client)).await
    }

    /// Soft-deletes an account. Always succeeds for an existing account.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` if no account has this number.
    pub async fn deactivate(&self, number: AccountNumber) -> Result<(), AccountError> {
        let account = accounts::Entity::find()
            .filter(accounts::Column::Number.eq(number.as_i32()))
            .one(&self.db)
            .await?
            .ok_or(CustomerError::AccountNotFound(number))?;

        let mut active: accounts::ActiveModel = account.into();
        active.is_active = Set(false);
        active.updated_at = Set(chrono::Utc::now().into());
        active.update(&self.db).await?;

        info!(account_number = %number, "Account deactivated");
        Ok(())
    }

    async fn with_balance(
        &self,
        account: accounts::Model,
        client: Option<clients::Model>,
    ) -> Result<AccountWithBalance, AccountError> {
        let latest = movements::Entity::find()
            .filter(movements::Column::AccountId.eq(account.id))
            .order_by_desc(movements::Column::CreatedAt)
            .order_by_desc(movements::Column::Id)
            .one(&self.db)
            .await?
            .map(to_movement);

        Ok(AccountWithBalance {
            balance: current_balance(account.opening_balance, latest.as_ref()),
            client_name: client.map(|c| c.name).unwrap_or_default(),
            account,
        })
    }
}

async fn number_taken<C: ConnectionTrait>(db: &C, number: AccountNumber) -> Result<bool, CustomerError> {
    let count = accounts::Entity::find()
        .filter(accounts::Column::Number.eq(number.as_i32()))
        .count(db)
        .await
        .map_err(persistence)?;
    Ok(count > 0)
}

/// Inserts `account` under `number` inside a savepoint.
///
/// Yields `None` if the number is assigned already, including when a
/// concurrent creation inserts it first and trips `uq_accounts_number`.
async fn claim_number(
    txn: &DatabaseTransaction,
    mut account: accounts::ActiveModel,
    number: AccountNumber,
) -> Result<Option<accounts::Model>, CustomerError> {
    if number_taken(txn, number).await? {
        return Ok(None);
    }
    account.number = Set(number.as_i32());

    let savepoint = txn.begin().await.map_err(persistence)?;
    match account.insert(&savepoint).await {
        Ok(model) => {
            savepoint.commit().await.map_err(persistence)?;
            Ok(Some(model))
        }
        Err(err) if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
            savepoint.rollback().await.map_err(persistence)?;
            Ok(None)
        }
        Err(err) => Err(persistence(err)),
    }
}

fn persistence(err: DbErr) -> CustomerError {
    CustomerError::Persistence(err.to_string())
}
