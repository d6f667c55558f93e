//! API route definitions.

use axum::{
    Json, Router,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::{AppState, middleware::auth::auth_middleware};
use bonusmart_shared::AppError;

pub mod auth;
pub mod balance;
pub mod health;
pub mod orders;

/// Creates the API router: public health and auth routes plus the
/// token-protected ledger routes.
#[allow(clippy::needless_pass_by_value)]
pub fn api_routes_with_state(state: AppState) -> Router<AppState> {
    let protected_routes = Router::new()
        .merge(orders::routes())
        .merge(balance::routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .merge(health::routes())
        .merge(auth::routes())
        .merge(protected_routes)
}

/// Maps an application error to its HTTP response.
///
/// Server-side failures answer with a generic message; everything else
/// carries the error's own description.
pub(crate) fn error_response(err: &AppError) -> Response {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let message = if status.is_server_error() && err.status_code() == 500 {
        "An internal error occurred".to_string()
    } else {
        err.to_string()
    };

    (
        status,
        Json(json!({ "error": err.error_code(), "message": message })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_internal_errors_hide_details() {
        let response = error_response(&AppError::Database("connection reset".into()));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_business_errors_keep_status() {
        let response = error_response(&AppError::InsufficientFunds("too low".into()));
        assert_eq!(response.status(), StatusCode::PAYMENT_REQUIRED);

        let response = error_response(&AppError::RateLimited("retry after 30s".into()));
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    }
}
