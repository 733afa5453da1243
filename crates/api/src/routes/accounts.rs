//! Account management routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use bankdesk_core::customer::{AccountChanges, AccountType};
use bankdesk_db::repositories::{AccountFilter, AccountWithBalance, CreateAccountInput};
use bankdesk_shared::types::{AccountNumber, ClientId, PageRequest};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use validator::Validate;

use crate::{
    AppState,
    error::{ApiError, ApiResult},
    extractors::{QueryParams, ValidatedJson},
};

/// Creates the account routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/accounts", get(list_accounts).post(create_account))
        .route(
            "/accounts/{number}",
            get(get_account)
                .put(update_account)
                .patch(update_account)
                .delete(delete_account),
        )
        .route("/accounts/{number}/balance", get(get_balance))
}

/// Parses a path or query account number.
pub(crate) fn account_number(raw: i64) -> ApiResult<AccountNumber> {
    AccountNumber::try_from(raw).map_err(|e| ApiError::validation(e.to_string()))
}

fn account_type(raw: &str) -> ApiResult<AccountType> {
    Ok(AccountType::parse(raw)?)
}

/// Query parameters for listing accounts.
#[derive(Debug, Default, Deserialize)]
pub struct ListAccountsQuery {
    /// Exact account number.
    pub number: Option<i64>,
    /// Account type: `savings` or `checking`.
    #[serde(rename = "type")]
    pub account_type: Option<String>,
    /// Active flag.
    pub is_active: Option<bool>,
    /// Owning client.
    pub client_id: Option<i64>,
    /// Page number (1-indexed).
    pub page: Option<u32>,
    /// Page size (max 100).
    pub per_page: Option<u32>,
}

/// Request body for opening an account.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateAccountRequest {
    /// Owning client.
    #[validate(range(min = 1))]
    pub client_id: i64,
    /// Account type: `savings` or `checking`.
    #[serde(rename = "type")]
    #[validate(length(min = 1))]
    pub account_type: String,
    /// Opening balance, defaults to zero.
    #[serde(default)]
    pub opening_balance: Decimal,
}

/// Request body for updating an account.
///
/// The opening balance is immutable and not accepted here.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct UpdateAccountRequest {
    /// Account type.
    #[serde(rename = "type")]
    pub account_type: Option<String>,
    /// Active flag. Re-activation requires an active client.
    pub is_active: Option<bool>,
}

/// Response for an account.
#[derive(Debug, Serialize)]
pub struct AccountResponse {
    /// Account number.
    pub number: i32,
    /// Owning client id.
    pub client_id: i64,
    /// Owning client name.
    pub client_name: String,
    /// Account type.
    #[serde(rename = "type")]
    pub account_type: AccountType,
    /// Opening balance.
    pub opening_balance: Decimal,
    /// Current balance.
    pub balance: Decimal,
    /// Active flag.
    pub is_active: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl From<AccountWithBalance> for AccountResponse {
    fn from(a: AccountWithBalance) -> Self {
        Self {
            number: a.account.number,
            client_id: a.account.client_id,
            client_name: a.client_name,
            account_type: a.account.account_type.into(),
            opening_balance: a.account.opening_balance,
            balance: a.balance,
            is_active: a.account.is_active,
            created_at: a.account.created_at.with_timezone(&Utc),
        }
    }
}

/// GET `/accounts` - List accounts with balances.
async fn list_accounts(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<ListAccountsQuery>,
) -> ApiResult<impl IntoResponse> {
    let page = PageRequest::from_query(query.page, query.per_page);
    let filter = AccountFilter {
        number: query.number.map(account_number).transpose()?,
        account_type: query.account_type.as_deref().map(account_type).transpose()?,
        is_active: query.is_active,
        client_id: query.client_id.map(ClientId::new),
    };

    let accounts = state.accounts().list(filter, &page).await?;
    Ok(Json(accounts.map(AccountResponse::from)))
}

/// POST `/accounts` - Open an account for an active client.
async fn create_account(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateAccountRequest>,
) -> ApiResult<impl IntoResponse> {
    let input = CreateAccountInput {
        client_id: ClientId::new(payload.client_id),
        account_type: account_type(&payload.account_type)?,
        opening_balance: payload.opening_balance,
    };

    let account = state.accounts().create(input, &state.numbers).await?;
    Ok((StatusCode::CREATED, Json(AccountResponse::from(account))))
}

/// GET `/accounts/{number}` - Get an account with its current balance.
async fn get_account(
    State(state): State<AppState>,
    Path(number): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    let account = state.accounts().get(account_number(number)?).await?;
    Ok(Json(AccountResponse::from(account)))
}

/// PUT/PATCH `/accounts/{number}` - Change the type or active flag.
async fn update_account(
    State(state): State<AppState>,
    Path(number): Path<i64>,
    ValidatedJson(payload): ValidatedJson<UpdateAccountRequest>,
) -> ApiResult<impl IntoResponse> {
    let changes = AccountChanges {
        account_type: payload.account_type.as_deref().map(account_type).transpose()?,
        is_active: payload.is_active,
    };

    let account = state.accounts().update(account_number(number)?, changes).await?;
    Ok(Json(AccountResponse::from(account)))
}

/// DELETE `/accounts/{number}` - Deactivate an account.
async fn delete_account(
    State(state): State<AppState>,
    Path(number): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    let number = account_number(number)?;
    state.accounts().deactivate(number).await?;
    Ok(Json(json!({ "number": number, "is_active": false })))
}

/// GET `/accounts/{number}/balance` - Balance and today's debit allowance.
async fn get_balance(
    State(state): State<AppState>,
    Path(number): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    let summary = state.posting.balance_summary(account_number(number)?).await?;
    Ok(Json(summary))
}
