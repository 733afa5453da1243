//! Client repository.
//!
//! Clients are never hard-deleted. Deactivating a client deactivates all of
//! its accounts in the same database transaction.

use bankdesk_core::customer::{ClientChanges, CustomerError, NewClient, hash_password};
use bankdesk_shared::types::{ClientId, PageRequest, PageResponse};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, DbErr,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, SqlErr,
    TransactionTrait, sea_query::Expr,
};
use tracing::info;

use crate::entities::{accounts, clients};

/// Error types for client operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Domain rule violation.
    #[error(transparent)]
    Customer(#[from] CustomerError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Filter options for listing clients.
#[derive(Debug, Clone, Default)]
pub struct ClientFilter {
    /// Name contains.
    pub name: Option<String>,
    /// Exact gender.
    pub gender: Option<String>,
    /// Exact age.
    pub age: Option<i16>,
    /// Identification contains.
    pub identification: Option<String>,
    /// Active flag.
    pub is_active: Option<bool>,
    /// Free text across name, identification, address and phone.
    pub q: Option<String>,
}

/// Client repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct ClientRepository {
    db: DatabaseConnection,
}

impl ClientRepository {
    /// Creates a new client repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Registers a client. The password is stored as an Argon2id hash.
    ///
    /// # Errors
    ///
    /// Returns an error if a field is invalid, the identification is taken,
    /// or the database operation fails.
    pub async fn create(&self, input: NewClient) -> Result<clients::Model, ClientError> {
        input.validate()?;
        ensure_identification_free(&self.db, &input.identification, None).await?;

        let password_hash = hash_password(&input.password).map_err(CustomerError::from)?;
        let now = chrono::Utc::now().into();
        let identification = input.identification.clone();

        let client = clients::ActiveModel {
            name: Set(input.name),
            gender: Set(input.gender),
            age: Set(input.age),
            identification: Set(input.identification),
            address: Set(input.address),
            phone: Set(input.phone),
            password_hash: Set(password_hash),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(|e| duplicate_or_db(e, &identification))?;

        info!(client_id = client.id, "Client created");
        Ok(client)
    }

    /// Finds a client by id.
    ///
    /// # Errors
    ///
    /// Returns `ClientNotFound` if the client does not exist.
    pub async fn get(&self, id: ClientId) -> Result<clients::Model, ClientError> {
        clients::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await?
            .ok_or_else(|| CustomerError::ClientNotFound(id).into())
    }

    /// Lists clients, active first then by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        filter: ClientFilter,
        page: &PageRequest,
    ) -> Result<PageResponse<clients::Model>, ClientError> {
        let mut query = clients::Entity::find()
            .order_by_desc(clients::Column::IsActive)
            .order_by_asc(clients::Column::Name)
            .order_by_asc(clients::Column::Id);

        if let Some(name) = filter.name {
            query = query.filter(clients::Column::Name.contains(name));
        }
        if let Some(gender) = filter.gender {
            query = query.filter(clients::Column::Gender.eq(gender));
        }
        if let Some(age) = filter.age {
            query = query.filter(clients::Column::Age.eq(age));
        }
        if let Some(identification) = filter.identification {
            query = query.filter(clients::Column::Identification.contains(identification));
        }
        if let Some(is_active) = filter.is_active {
            query = query.filter(clients::Column::IsActive.eq(is_active));
        }
        if let Some(q) = filter.q.filter(|q| !q.trim().is_empty()) {
            query = query.filter(
                Condition::any()
                    .add(clients::Column::Name.contains(&q))
                    .add(clients::Column::Identification.contains(&q))
                    .add(clients::Column::Address.contains(&q))
                    .add(clients::Column::Phone.contains(&q)),
            );
        }

        let paginator = query.paginate(&self.db, page.limit());
        let total = paginator.num_items().await?;
        let data = paginator
            .fetch_page(u64::from(page.page.saturating_sub(1)))
            .await?;

        Ok(PageResponse::new(data, page.page, page.per_page, total))
    }

    /// Replaces every editable field of a client.
    ///
    /// # Errors
    ///
    /// Same as [`Self::update`].
    pub async fn replace(&self, id: ClientId, input: NewClient) -> Result<clients::Model, ClientError> {
        input.validate()?;
        self.update(id, ClientChanges::from(input)).await
    }

    /// Applies a partial update. Blank text fields are ignored.
    ///
    /// Turning a client inactive cascades to its accounts.
    ///
    /// # Errors
    ///
    /// Returns an error if the client does not exist, a field is invalid,
    /// the new identification is taken, or the database operation fails.
    pub async fn update(&self, id: ClientId, changes: ClientChanges) -> Result<clients::Model, ClientError> {
        let changes = changes.normalized();
        changes.validate()?;

        let txn = self.db.begin().await?;
        let client = clients::Entity::find_by_id(id.into_inner())
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or(CustomerError::ClientNotFound(id))?;

        if let Some(identification) = &changes.identification
            && *identification != client.identification
        {
            ensure_identification_free(&txn, identification, Some(id)).await?;
        }

        let deactivating = client.is_active && changes.is_active == Some(false);
        let identification = changes
            .identification
            .clone()
            .unwrap_or_else(|| client.identification.clone());
        let now = chrono::Utc::now();
        let mut active: clients::ActiveModel = client.into();

        if let Some(name) = changes.name {
            active.name = Set(name);
        }
        if let Some(gender) = changes.gender {
            active.gender = Set(gender);
        }
        if let Some(age) = changes.age {
            active.age = Set(age);
        }
        if let Some(identification) = changes.identification {
            active.identification = Set(identification);
        }
        if let Some(address) = changes.address {
            active.address = Set(address);
        }
        if let Some(phone) = changes.phone {
            active.phone = Set(phone);
        }
        if let Some(password) = changes.password {
            active.password_hash = Set(hash_password(&password).map_err(CustomerError::from)?);
        }
        if let Some(is_active) = changes.is_active {
            active.is_active = Set(is_active);
        }
        active.updated_at = Set(now.into());

        let updated = active
            .update(&txn)
            .await
            .map_err(|e| duplicate_or_db(e, &identification))?;
        if deactivating {
            deactivate_accounts(&txn, id).await?;
        }
        txn.commit().await?;

        info!(client_id = updated.id, "Client updated");
        Ok(updated)
    }

    /// Soft-deletes a client and deactivates all of its accounts.
    ///
    /// Returns the number of accounts that were deactivated.
    ///
    /// # Errors
    ///
    /// Returns `ClientNotFound` if the client does not exist.
    pub async fn deactivate(&self, id: ClientId) -> Result<u64, ClientError> {
        let txn = self.db.begin().await?;
        let client = clients::Entity::find_by_id(id.into_inner())
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or(CustomerError::ClientNotFound(id))?;

        let mut active: clients::ActiveModel = client.into();
        active.is_active = Set(false);
        active.updated_at = Set(chrono::Utc::now().into());
        active.update(&txn).await?;

        let accounts_deactivated = deactivate_accounts(&txn, id).await?;
        txn.commit().await?;

        info!(client_id = %id, accounts_deactivated, "Client deactivated");
        Ok(accounts_deactivated)
    }
}

async fn deactivate_accounts<C: ConnectionTrait>(db: &C, client_id: ClientId) -> Result<u64, DbErr> {
    let result = accounts::Entity::update_many()
        .col_expr(accounts::Column::IsActive, Expr::value(false))
        .col_expr(accounts::Column::UpdatedAt, Expr::value(chrono::Utc::now()))
        .filter(accounts::Column::ClientId.eq(client_id.into_inner()))
        .filter(accounts::Column::IsActive.eq(true))
        .exec(db)
        .await?;
    Ok(result.rows_affected)
}

async fn ensure_identification_free<C: ConnectionTrait>(
    db: &C,
    identification: &str,
    except: Option<ClientId>,
) -> Result<(), ClientError> {
    let mut query = clients::Entity::find().filter(clients::Column::Identification.eq(identification));
    if let Some(id) = except {
        query = query.filter(clients::Column::Id.ne(id.into_inner()));
    }
    if query.one(db).await?.is_some() {
        return Err(CustomerError::DuplicateIdentification(identification.to_string()).into());
    }
    Ok(())
}

/// A concurrent insert can still hit the unique index after the pre-check.
fn duplicate_or_db(err: DbErr, identification: &str) -> ClientError {
    if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
        return CustomerError::DuplicateIdentification(identification.to_string()).into();
    }
    err.into()
}
