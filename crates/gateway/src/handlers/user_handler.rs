//! User handlers: self-service profile, password reset and admin management.

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    middleware,
    response::Json,
    routing::{get, post, put},
    Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use common::{AppError, AppResult, Paginated, PaginationParams};
use domain::{ProfileUpdate, UserResponse, UserRole};

use crate::extractors::ValidatedJson;
use crate::middleware::{require_admin, require_user, CurrentUser};
use crate::state::AppState;

/// Acknowledgement returned whether or not the account exists
const RESET_ACCEPTED_MESSAGE: &str =
    "If an account exists for that email, a password reset link has been sent";

/// Profile update request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    #[validate(length(min = 3, max = 50, message = "Nickname must be 3 to 50 characters"))]
    pub nickname: Option<String>,
    #[validate(length(max = 100, message = "First name is too long"))]
    pub first_name: Option<String>,
    #[validate(length(max = 100, message = "Last name is too long"))]
    pub last_name: Option<String>,
    #[validate(length(max = 500, message = "Bio is too long"))]
    pub bio: Option<String>,
    #[validate(url(message = "Invalid profile picture URL"))]
    pub profile_picture_url: Option<String>,
    #[validate(url(message = "Invalid LinkedIn profile URL"))]
    pub linkedin_profile_url: Option<String>,
    #[validate(url(message = "Invalid GitHub profile URL"))]
    pub github_profile_url: Option<String>,
}

impl From<UpdateProfileRequest> for ProfileUpdate {
    fn from(request: UpdateProfileRequest) -> Self {
        ProfileUpdate {
            email: request.email,
            nickname: request.nickname,
            first_name: request.first_name,
            last_name: request.last_name,
            bio: request.bio,
            profile_picture_url: request.profile_picture_url,
            linkedin_profile_url: request.linkedin_profile_url,
            github_profile_url: request.github_profile_url,
        }
    }
}

/// Password reset request
#[derive(Debug, Deserialize, Validate)]
pub struct ResetPasswordRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
}

/// Password reset confirmation
#[derive(Debug, Deserialize, Validate)]
pub struct ConfirmResetRequest {
    #[validate(length(min = 1, message = "Token is required"))]
    pub token: String,
    #[validate(length(min = 1, message = "New password is required"))]
    pub new_password: String,
}

/// Role change request (admin only)
#[derive(Debug, Deserialize, Validate)]
pub struct ChangeRoleRequest {
    #[validate(length(min = 1, message = "Role is required"))]
    pub role: String,
}

/// Professional status request (admin only)
#[derive(Debug, Deserialize, Validate)]
pub struct ProfessionalStatusRequest {
    pub is_professional: bool,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Create user routes.
///
/// `/me` needs any access token, the id-addressed routes need an admin
/// token and the password reset routes are public.
pub fn user_routes(state: AppState) -> Router<AppState> {
    let self_service = Router::new()
        .route("/me", get(get_current_user).put(update_current_user))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_user));

    let admin = Router::new()
        .route("/", get(list_users))
        .route("/:id", get(get_user).delete(delete_user))
        .route("/:id/role", put(change_role))
        .route("/:id/unlock", post(unlock_user))
        .route("/:id/professional", put(set_professional_status))
        .route_layer(middleware::from_fn_with_state(state, require_admin));

    Router::new()
        .route("/reset-password", post(request_password_reset))
        .route("/reset-password/confirm", post(confirm_password_reset))
        .merge(self_service)
        .merge(admin)
}

/// Get current authenticated user
pub async fn get_current_user(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
) -> AppResult<Json<UserResponse>> {
    let user = state.accounts.get_user(current_user.id).await?;
    Ok(Json(UserResponse::from(user)))
}

/// Update the current user's profile
pub async fn update_current_user(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<UpdateProfileRequest>,
) -> AppResult<Json<UserResponse>> {
    let user = state
        .accounts
        .update_profile(current_user.id, payload.into())
        .await?;
    Ok(Json(UserResponse::from(user)))
}

/// Start a password reset. Always answers 202 so accounts cannot be enumerated.
pub async fn request_password_reset(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<ResetPasswordRequest>,
) -> AppResult<(StatusCode, Json<MessageResponse>)> {
    match state.accounts.reset_password(payload.email).await {
        Ok(_) | Err(AppError::NotFound) => {}
        Err(e) => return Err(e),
    }

    Ok((
        StatusCode::ACCEPTED,
        Json(MessageResponse {
            message: RESET_ACCEPTED_MESSAGE.to_string(),
        }),
    ))
}

/// Finish a password reset with the emailed token
pub async fn confirm_password_reset(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<ConfirmResetRequest>,
) -> AppResult<StatusCode> {
    state
        .accounts
        .confirm_reset(&payload.token, payload.new_password)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// List users (admin only)
pub async fn list_users(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<Paginated<UserResponse>>> {
    let page = state.accounts.list_users(params).await?;
    Ok(Json(page))
}

/// Get user by ID (admin only)
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<UserResponse>> {
    let user = state.accounts.get_user(id).await?;
    Ok(Json(UserResponse::from(user)))
}

/// Delete user (admin only)
pub async fn delete_user(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state.accounts.delete_user(current_user.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Change a user's role (admin only)
pub async fn change_role(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<ChangeRoleRequest>,
) -> AppResult<Json<UserResponse>> {
    let role: UserRole = payload.role.parse()?;
    let user = state.accounts.change_role(id, role).await?;
    Ok(Json(UserResponse::from(user)))
}

/// Unlock a locked account (admin only)
pub async fn unlock_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<UserResponse>> {
    let user = state.accounts.unlock_user(id).await?;
    Ok(Json(UserResponse::from(user)))
}

/// Set a user's professional status (admin only)
pub async fn set_professional_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<ProfessionalStatusRequest>,
) -> AppResult<Json<UserResponse>> {
    let user = state
        .accounts
        .set_professional_status(id, payload.is_professional)
        .await?;
    Ok(Json(UserResponse::from(user)))
}
