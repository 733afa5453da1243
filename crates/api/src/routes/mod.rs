//! API route definitions.

use axum::Router;

use crate::AppState;

pub mod accounts;
pub mod clients;
pub mod health;
pub mod movements;
pub mod reports;

/// Creates the API router with all routes.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .merge(clients::routes())
        .merge(accounts::routes())
        .merge(movements::routes())
        .merge(reports::routes())
}
