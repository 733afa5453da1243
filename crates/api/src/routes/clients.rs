//! Client management routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use bankdesk_core::customer::{ClientChanges, NewClient};
use bankdesk_db::entities::clients;
use bankdesk_db::repositories::ClientFilter;
use bankdesk_shared::types::{ClientId, PageRequest};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use validator::Validate;

use crate::{
    AppState,
    error::ApiResult,
    extractors::{QueryParams, ValidatedJson},
};

/// Creates the client routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/clients", get(list_clients).post(create_client))
        .route(
            "/clients/{id}",
            get(get_client)
                .put(replace_client)
                .patch(update_client)
                .delete(delete_client),
        )
}

/// Query parameters for listing clients.
#[derive(Debug, Default, Deserialize)]
pub struct ListClientsQuery {
    /// Name contains (case-insensitive).
    pub name: Option<String>,
    /// Exact gender.
    pub gender: Option<String>,
    /// Exact age.
    pub age: Option<i16>,
    /// Identification contains.
    pub identification: Option<String>,
    /// Active flag.
    pub is_active: Option<bool>,
    /// Free-text search.
    pub q: Option<String>,
    /// Page number (1-indexed).
    pub page: Option<u32>,
    /// Page size (max 100).
    pub per_page: Option<u32>,
}

/// Request body for creating or replacing a client.
#[derive(Debug, Deserialize, Validate)]
pub struct ClientRequest {
    /// Full name.
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    /// Single-letter gender code.
    #[validate(length(equal = 1))]
    pub gender: String,
    /// Age in years.
    #[validate(range(min = 0, max = 110))]
    pub age: i16,
    /// National identification.
    #[validate(length(min = 1, max = 20))]
    pub identification: String,
    /// Postal address.
    #[validate(length(max = 200))]
    pub address: String,
    /// Phone number.
    #[validate(length(max = 20))]
    pub phone: String,
    /// Clear-text password.
    #[validate(length(min = 4, max = 128))]
    pub password: String,
}

impl From<ClientRequest> for NewClient {
    fn from(r: ClientRequest) -> Self {
        Self {
            name: r.name,
            gender: r.gender,
            age: r.age,
            identification: r.identification,
            address: r.address,
            phone: r.phone,
            password: r.password,
        }
    }
}

/// Request body for a partial client update. Blank strings are ignored.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateClientRequest {
    /// Full name.
    #[validate(length(max = 100))]
    pub name: Option<String>,
    /// Single-letter gender code.
    pub gender: Option<String>,
    /// Age in years.
    #[validate(range(min = 0, max = 110))]
    pub age: Option<i16>,
    /// National identification.
    #[validate(length(max = 20))]
    pub identification: Option<String>,
    /// Postal address.
    #[validate(length(max = 200))]
    pub address: Option<String>,
    /// Phone number.
    #[validate(length(max = 20))]
    pub phone: Option<String>,
    /// New password.
    #[validate(length(max = 128))]
    pub password: Option<String>,
    /// Active flag. `false` cascades to the client's accounts.
    pub is_active: Option<bool>,
}

impl From<UpdateClientRequest> for ClientChanges {
    fn from(r: UpdateClientRequest) -> Self {
        Self {
            name: r.name,
            gender: r.gender,
            age: r.age,
            identification: r.identification,
            address: r.address,
            phone: r.phone,
            password: r.password,
            is_active: r.is_active,
        }
    }
}

/// Response for a client. The password hash is never exposed.
#[derive(Debug, Serialize)]
pub struct ClientResponse {
    /// Client id.
    pub id: i64,
    /// Full name.
    pub name: String,
    /// Gender code.
    pub gender: String,
    /// Age.
    pub age: i16,
    /// Identification.
    pub identification: String,
    /// Address.
    pub address: String,
    /// Phone.
    pub phone: String,
    /// Active flag.
    pub is_active: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl From<clients::Model> for ClientResponse {
    fn from(m: clients::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            gender: m.gender,
            age: m.age,
            identification: m.identification,
            address: m.address,
            phone: m.phone,
            is_active: m.is_active,
            created_at: m.created_at.with_timezone(&Utc),
            updated_at: m.updated_at.with_timezone(&Utc),
        }
    }
}

/// GET `/clients` - List clients, active first then by name.
async fn list_clients(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<ListClientsQuery>,
) -> ApiResult<impl IntoResponse> {
    let page = PageRequest::from_query(query.page, query.per_page);
    let filter = ClientFilter {
        name: query.name,
        gender: query.gender,
        age: query.age,
        identification: query.identification,
        is_active: query.is_active,
        q: query.q,
    };

    let clients = state.clients().list(filter, &page).await?;
    Ok(Json(clients.map(ClientResponse::from)))
}

/// POST `/clients` - Register a client.
async fn create_client(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<ClientRequest>,
) -> ApiResult<impl IntoResponse> {
    let client = state.clients().create(payload.into()).await?;
    Ok((StatusCode::CREATED, Json(ClientResponse::from(client))))
}

/// GET `/clients/{id}` - Get a client.
async fn get_client(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    let client = state.clients().get(ClientId::new(id)).await?;
    Ok(Json(ClientResponse::from(client)))
}

/// PUT `/clients/{id}` - Replace every editable field of a client.
async fn replace_client(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ValidatedJson(payload): ValidatedJson<ClientRequest>,
) -> ApiResult<impl IntoResponse> {
    let client = state.clients().replace(ClientId::new(id), payload.into()).await?;
    Ok(Json(ClientResponse::from(client)))
}

/// PATCH `/clients/{id}` - Update the provided fields of a client.
async fn update_client(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ValidatedJson(payload): ValidatedJson<UpdateClientRequest>,
) -> ApiResult<impl IntoResponse> {
    let client = state.clients().update(ClientId::new(id), payload.into()).await?;
    Ok(Json(ClientResponse::from(client)))
}

/// DELETE `/clients/{id}` - Deactivate a client and all of its accounts.
async fn delete_client(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    let accounts_deactivated = state.clients().deactivate(ClientId::new(id)).await?;
    Ok(Json(json!({
        "id": id,
        "is_active": false,
        "accounts_deactivated": accounts_deactivated,
    })))
}
