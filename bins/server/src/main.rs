//! Bankdesk API Server
//!
//! Main entry point for the Bankdesk back-office service.

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bankdesk_api::{AppState, create_router};
use bankdesk_core::customer::AccountNumberGenerator;
use bankdesk_core::ledger::PostingRules;
use bankdesk_db::connect_with;
use bankdesk_shared::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bankdesk=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load().context("Failed to load configuration")?;
    let rules = &config.business_rules;
    let timezone = rules.timezone()?;

    let db = connect_with(&config.database).await?;
    info!(
        max_connections = config.database.max_connections,
        "Connected to database"
    );

    let posting_rules = PostingRules::new(rules.daily_debit_limit, timezone);
    info!(
        daily_debit_limit = %rules.daily_debit_limit,
        timezone = %timezone,
        "Posting rules configured"
    );

    let numbers = AccountNumberGenerator::from_seed(rules.account_number_seed);
    let state = AppState::new(db, posting_rules, numbers);
    let app = create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
