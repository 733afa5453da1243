//! Movement routes: posting and queries.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use bankdesk_core::ledger::{Movement, MovementKind};
use bankdesk_db::repositories::{MovementFilter, MovementWithAccount};
use bankdesk_shared::types::{AccountNumber, MovementId, PageRequest};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

use super::accounts::account_number;
use crate::{
    AppState,
    error::ApiResult,
    extractors::{QueryParams, ValidatedJson},
};

/// Creates the movement routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/movements", get(list_movements).post(create_movement))
        .route("/movements/{id}", get(get_movement))
}

/// Request body for posting a movement.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateMovementRequest {
    /// Target account number.
    pub account_number: i64,
    /// `debit` or `credit`, case-insensitive.
    #[serde(rename = "type")]
    #[validate(length(min = 1, max = 20))]
    pub kind: String,
    /// Positive amount with at most two decimals.
    pub amount: Decimal,
}

/// Query parameters for listing movements.
#[derive(Debug, Default, Deserialize)]
pub struct ListMovementsQuery {
    /// Account number.
    pub account_number: Option<i64>,
    /// `debit` or `credit`.
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// Business day (YYYY-MM-DD).
    pub date: Option<NaiveDate>,
    /// Exact signed amount.
    pub amount: Option<Decimal>,
    /// Exact balance after the movement.
    pub balance: Option<Decimal>,
    /// Page number (1-indexed).
    pub page: Option<u32>,
    /// Page size (max 100).
    pub per_page: Option<u32>,
}

/// Response for a movement.
#[derive(Debug, Serialize)]
pub struct MovementResponse {
    /// Movement id.
    pub id: MovementId,
    /// Account number.
    pub account_number: AccountNumber,
    /// Direction.
    #[serde(rename = "type")]
    pub kind: MovementKind,
    /// Signed amount: negative for debits.
    pub amount: Decimal,
    /// Balance right after the movement.
    pub balance: Decimal,
    /// Server timestamp.
    pub created_at: DateTime<Utc>,
}

impl MovementResponse {
    fn new(movement: Movement, account_number: AccountNumber) -> Self {
        Self {
            id: movement.id,
            account_number,
            kind: movement.kind,
            amount: movement.amount,
            balance: movement.balance,
            created_at: movement.created_at,
        }
    }
}

impl From<MovementWithAccount> for MovementResponse {
    fn from(m: MovementWithAccount) -> Self {
        Self::new(m.movement, m.account_number)
    }
}

/// POST `/movements` - Post a debit or credit through the posting engine.
async fn create_movement(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateMovementRequest>,
) -> ApiResult<impl IntoResponse> {
    let number = account_number(payload.account_number)?;
    let movement = state.posting.post(number, &payload.kind, payload.amount).await?;

    info!(account_number = %number, movement_id = %movement.id, "Movement accepted");
    Ok((StatusCode::CREATED, Json(MovementResponse::new(movement, number))))
}

/// GET `/movements` - List movements, newest first.
async fn list_movements(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<ListMovementsQuery>,
) -> ApiResult<impl IntoResponse> {
    let page = PageRequest::from_query(query.page, query.per_page);
    let filter = MovementFilter {
        account_number: query.account_number.map(account_number).transpose()?,
        kind: query.kind.as_deref().map(MovementKind::parse).transpose()?,
        date: query.date,
        amount: query.amount,
        balance: query.balance,
    };

    let movements = state.movements().list(filter, &page).await?;
    Ok(Json(movements.map(MovementResponse::from)))
}

/// GET `/movements/{id}` - Get a movement.
async fn get_movement(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    let movement = state.movements().get(MovementId::new(id)).await?;
    Ok(Json(MovementResponse::from(movement)))
}
