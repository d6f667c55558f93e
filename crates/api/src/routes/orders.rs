//! Order submission and listing routes.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde_json::json;
use tracing::error;

use crate::middleware::auth::AuthUser;
use crate::{AppState, routes::error_response};
use bonusmart_core::ledger::SubmitOutcome;
use bonusmart_shared::AppError;

/// Creates the order routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/user/orders", post(submit_order))
        .route("/user/orders", get(list_orders))
}

/// POST /api/user/orders - Submit an order number for accrual.
///
/// The body is the raw order number as plain text. Answers 202 when the
/// order is newly accepted and 200 when this user already submitted it.
async fn submit_order(
    State(state): State<AppState>,
    user: AuthUser,
    body: String,
) -> impl IntoResponse {
    let number = body.trim();
    if number.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "VALIDATION_ERROR",
                "message": "request body must contain an order number"
            })),
        )
            .into_response();
    }

    match state.ledger.submit_order(user.user_id(), number).await {
        Ok(SubmitOutcome::Accepted) => StatusCode::ACCEPTED.into_response(),
        Ok(SubmitOutcome::AlreadyUploaded) => StatusCode::OK.into_response(),
        Err(e) => {
            let app_err = AppError::from(e);
            if app_err.status_code() == 500 {
                error!(error = %app_err, "Order submission failed");
            }
            error_response(&app_err)
        }
    }
}

/// GET /api/user/orders - List the user's orders, newest first.
///
/// Answers 204 when the user has not submitted any orders.
async fn list_orders(State(state): State<AppState>, user: AuthUser) -> impl IntoResponse {
    match state.ledger.list_orders(user.user_id()).await {
        Ok(orders) if orders.is_empty() => StatusCode::NO_CONTENT.into_response(),
        Ok(orders) => (StatusCode::OK, Json(orders)).into_response(),
        Err(e) => {
            let app_err = AppError::from(e);
            error!(error = %app_err, "Failed to list orders");
            error_response(&app_err)
        }
    }
}
