//! Authentication routes for registration and login.

use axum::{Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::post};
use sea_orm::SqlErr;
use serde_json::json;
use tracing::{error, info};

use crate::AppState;
use bonusmart_core::auth::{hash_password, verify_password};
use bonusmart_db::UserRepository;
use bonusmart_shared::auth::{CredentialsRequest, TokenResponse};

/// Creates the auth router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/user/register", post(register))
        .route("/user/login", post(login))
}

/// POST /api/user/register - Register a new user and log them in.
async fn register(
    State(state): State<AppState>,
    Json(payload): Json<CredentialsRequest>,
) -> impl IntoResponse {
    if let Err(message) = payload.validate() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "VALIDATION_ERROR", "message": message })),
        )
            .into_response();
    }

    let user_repo = UserRepository::new((*state.db).clone());

    match user_repo.login_exists(&payload.login).await {
        Ok(true) => {
            return (
                StatusCode::CONFLICT,
                Json(json!({
                    "error": "LOGIN_TAKEN",
                    "message": "This login is already registered"
                })),
            )
                .into_response();
        }
        Ok(false) => {}
        Err(e) => {
            error!(error = %e, "Database error during registration");
            return internal_error();
        }
    }

    let password_hash = match hash_password(&payload.password) {
        Ok(h) => h,
        Err(e) => {
            error!(error = %e, "Password hashing failed");
            return internal_error();
        }
    };

    let user = match user_repo.create(&payload.login, &password_hash).await {
        Ok(u) => u,
        // A racing registration of the same login loses here.
        Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
            return (
                StatusCode::CONFLICT,
                Json(json!({
                    "error": "LOGIN_TAKEN",
                    "message": "This login is already registered"
                })),
            )
                .into_response();
        }
        Err(e) => {
            error!(error = %e, "Failed to create user");
            return internal_error();
        }
    };

    info!(user_id = %user.id, "User registered");
    issue_token(&state, user.id)
}

/// POST /api/user/login - Authenticate and return a bearer token.
async fn login(
    State(state): State<AppState>,
    Json(payload): Json<CredentialsRequest>,
) -> impl IntoResponse {
    if let Err(message) = payload.validate() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "VALIDATION_ERROR", "message": message })),
        )
            .into_response();
    }

    let user_repo = UserRepository::new((*state.db).clone());

    let user = match user_repo.find_by_login(&payload.login).await {
        Ok(Some(u)) => u,
        Ok(None) => {
            info!(login = %payload.login, "Login attempt for unknown user");
            return invalid_credentials();
        }
        Err(e) => {
            error!(error = %e, "Database error during login");
            return internal_error();
        }
    };

    match verify_password(&payload.password, &user.password_hash) {
        Ok(true) => {}
        Ok(false) => {
            info!(user_id = %user.id, "Failed login attempt");
            return invalid_credentials();
        }
        Err(e) => {
            error!(error = %e, "Password verification error");
            return internal_error();
        }
    }

    info!(user_id = %user.id, "User logged in");
    issue_token(&state, user.id)
}

/// Generates a bearer token response, surfacing signing failures.
fn issue_token(state: &AppState, user_id: uuid::Uuid) -> axum::response::Response {
    match state.jwt_service.generate_token(user_id) {
        Ok(access_token) => (
            StatusCode::OK,
            Json(TokenResponse {
                access_token,
                expires_in: state.jwt_service.token_expires_in(),
            }),
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "Failed to generate token");
            internal_error()
        }
    }
}

fn invalid_credentials() -> axum::response::Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({
            "error": "INVALID_CREDENTIALS",
            "message": "Invalid login or password"
        })),
    )
        .into_response()
}

fn internal_error() -> axum::response::Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "error": "INTERNAL_ERROR",
            "message": "An internal error occurred"
        })),
    )
        .into_response()
}
