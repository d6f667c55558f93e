//! Balance and withdrawal routes.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::error;

use crate::middleware::auth::AuthUser;
use crate::{AppState, routes::error_response};
use bonusmart_shared::AppError;

/// Withdrawal request payload.
#[derive(Debug, Deserialize)]
pub struct WithdrawalRequest {
    /// Order number to spend points against.
    pub order: String,
    /// Amount of points to withdraw.
    pub sum: Decimal,
}

/// Creates the balance routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/user/balance", get(balance))
        .route("/user/balance/withdraw", post(withdraw))
        .route("/user/withdrawals", get(list_withdrawals))
}

/// GET /api/user/balance - Current and lifetime-withdrawn balance.
async fn balance(State(state): State<AppState>, user: AuthUser) -> impl IntoResponse {
    match state.ledger.balance(user.user_id()).await {
        Ok(summary) => (StatusCode::OK, Json(summary)).into_response(),
        Err(e) => {
            let app_err = AppError::from(e);
            error!(error = %app_err, "Failed to read balance");
            error_response(&app_err)
        }
    }
}

/// POST /api/user/balance/withdraw - Spend points against an order number.
async fn withdraw(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<WithdrawalRequest>,
) -> impl IntoResponse {
    match state
        .ledger
        .request_withdrawal(user.user_id(), &payload.order, payload.sum)
        .await
    {
        Ok(()) => StatusCode::OK.into_response(),
        Err(e) => {
            let app_err = AppError::from(e);
            if app_err.status_code() == 500 {
                error!(error = %app_err, "Withdrawal failed");
            }
            error_response(&app_err)
        }
    }
}

/// GET /api/user/withdrawals - List the user's withdrawals, newest first.
///
/// Answers 204 when the user has no withdrawals.
async fn list_withdrawals(State(state): State<AppState>, user: AuthUser) -> impl IntoResponse {
    match state.ledger.list_withdrawals(user.user_id()).await {
        Ok(withdrawals) if withdrawals.is_empty() => StatusCode::NO_CONTENT.into_response(),
        Ok(withdrawals) => (StatusCode::OK, Json(withdrawals)).into_response(),
        Err(e) => {
            let app_err = AppError::from(e);
            error!(error = %app_err, "Failed to list withdrawals");
            error_response(&app_err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_withdrawal_request_accepts_integral_and_fractional_sums() {
        let req: WithdrawalRequest =
            serde_json::from_str(r#"{"order":"2377225624","sum":751}"#).unwrap();
        assert_eq!(req.order, "2377225624");
        assert_eq!(req.sum, dec!(751));

        let req: WithdrawalRequest =
            serde_json::from_str(r#"{"order":"2377225624","sum":100.5}"#).unwrap();
        assert_eq!(req.sum, dec!(100.5));
    }

    #[test]
    fn test_withdrawal_request_rejects_missing_fields() {
        assert!(serde_json::from_str::<WithdrawalRequest>(r#"{"order":"2377225624"}"#).is_err());
        assert!(serde_json::from_str::<WithdrawalRequest>(r#"{"sum":751}"#).is_err());
    }
}
