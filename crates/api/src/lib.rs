//! HTTP API layer with Axum routes and extractors.
//!
//! This crate provides:
//! - REST API routes for clients, accounts, movements and reports
//! - Request extractors with validation
//! - Uniform JSON error rendering

pub mod error;
pub mod extractors;
pub mod routes;

use std::sync::{Arc, Mutex};

use axum::{Router, http::Uri};
use bankdesk_core::customer::AccountNumberGenerator;
use bankdesk_core::ledger::{BusinessDay, PostingEngine, PostingRules};
use bankdesk_db::repositories::{
    AccountRepository, ClientRepository, MovementRepository, PgLedgerStore, ReportRepository,
};
use bankdesk_shared::AppError;
use sea_orm::DatabaseConnection;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use error::{ApiError, ApiResult};

async fn not_found(uri: Uri) -> ApiError {
    AppError::NotFound(uri.path().to_string()).into()
}

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: Arc<DatabaseConnection>,
    /// Posting engine backed by PostgreSQL.
    pub posting: Arc<PostingEngine<PgLedgerStore>>,
    /// Account number generator shared by account creation.
    pub numbers: Arc<Mutex<AccountNumberGenerator>>,
}

impl AppState {
    /// Wires the state from a connection pool and the configured business rules.
    pub fn new(db: DatabaseConnection, rules: PostingRules, numbers: AccountNumberGenerator) -> Self {
        let posting = PostingEngine::new(PgLedgerStore::new(db.clone()), rules);
        Self {
            db: Arc::new(db),
            posting: Arc::new(posting),
            numbers: Arc::new(Mutex::new(numbers)),
        }
    }

    /// Business calendar used for dates in filters and reports.
    pub fn calendar(&self) -> BusinessDay {
        self.posting.rules().business_day
    }

    /// Client repository.
    pub fn clients(&self) -> ClientRepository {
        ClientRepository::new((*self.db).clone())
    }

    /// Account repository.
    pub fn accounts(&self) -> AccountRepository {
        AccountRepository::new((*self.db).clone())
    }

    /// Movement repository.
    pub fn movements(&self) -> MovementRepository {
        MovementRepository::new((*self.db).clone(), self.calendar())
    }

    /// Report repository.
    pub fn reports(&self) -> ReportRepository {
        ReportRepository::new((*self.db).clone(), self.calendar())
    }
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes())
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
