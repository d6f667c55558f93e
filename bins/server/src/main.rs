//! Bonusmart API Server
//!
//! Main entry point for the loyalty-points backend service.

use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bonusmart_api::{AppState, create_router};
use bonusmart_core::accrual::AccrualClient;
use bonusmart_core::ledger::OrderLedgerService;
use bonusmart_db::{LedgerRepository, connect};
use bonusmart_shared::{AppConfig, JwtService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bonusmart=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = AppConfig::load().expect("Failed to load configuration");

    // Connect to database
    let db = connect(&config.database).await?;
    info!("Connected to database");

    let jwt_service = JwtService::new(config.jwt.clone());

    // Wire the ledger service: PostgreSQL store plus the live accrual
    // client, with the accrual deadline kept under the request deadline.
    let accrual = AccrualClient::new(
        &config.accrual.base_url,
        Duration::from_secs(config.accrual.request_timeout_secs),
    )?;
    let ledger = OrderLedgerService::new(
        LedgerRepository::new(db.clone()),
        accrual,
        Duration::from_secs(config.accrual.request_timeout_secs),
    );
    info!(accrual_url = %config.accrual.base_url, "Accrual client configured");

    // Create application state
    let state = AppState {
        db: Arc::new(db),
        jwt_service: Arc::new(jwt_service),
        ledger: Arc::new(ledger),
    };

    // Create router
    let app = create_router(
        state,
        Duration::from_secs(config.server.request_timeout_secs),
    );

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
