//! Authentication handlers: registration, email verification and login.

use axum::{extract::State, http::StatusCode, response::Json, routing::post, Router};
use serde::Deserialize;
use validator::Validate;

use account_service_lib::token::TokenResponse;
use common::AppResult;
use domain::UserResponse;

use crate::extractors::ValidatedJson;
use crate::state::AppState;

/// User registration request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// User email address
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,
    /// Password, checked against the strength policy by the service
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// User login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Email verification request
#[derive(Debug, Deserialize, Validate)]
pub struct VerifyEmailRequest {
    #[validate(length(min = 1, message = "Token is required"))]
    pub token: String,
}

/// Create authentication routes
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/verify-email", post(verify_email))
}

/// Register a new user
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RegisterRequest>,
) -> AppResult<(StatusCode, Json<UserResponse>)> {
    let registration = state
        .accounts
        .register(payload.email, payload.password)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(UserResponse::from(registration.user)),
    ))
}

/// Login and get an access token
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> AppResult<Json<TokenResponse>> {
    let token = state
        .accounts
        .login(payload.email, payload.password)
        .await?;

    Ok(Json(token))
}

/// Redeem an email verification token
pub async fn verify_email(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<VerifyEmailRequest>,
) -> AppResult<Json<UserResponse>> {
    let user = state.accounts.verify_email(&payload.token).await?;
    Ok(Json(UserResponse::from(user)))
}
