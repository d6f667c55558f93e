//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - REST API routes
//! - Authentication middleware
//! - Error-to-response mapping

pub mod middleware;
pub mod routes;

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use sea_orm::DatabaseConnection;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use bonusmart_core::accrual::AccrualClient;
use bonusmart_core::ledger::OrderLedgerService;
use bonusmart_db::LedgerRepository;
use bonusmart_shared::JwtService;

/// The concrete ledger service wired against PostgreSQL and the live
/// accrual client.
pub type LedgerService = OrderLedgerService<LedgerRepository, AccrualClient>;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: Arc<DatabaseConnection>,
    /// JWT service for token operations.
    pub jwt_service: Arc<JwtService>,
    /// Ledger orchestration service.
    pub ledger: Arc<LedgerService>,
}

/// Creates the main application router.
///
/// `request_timeout` bounds every request; a handler that outlives it
/// answers 408 instead of holding the connection open.
pub fn create_router(state: AppState, request_timeout: Duration) -> Router {
    Router::new()
        .nest("/api", routes::api_routes_with_state(state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(request_timeout))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
