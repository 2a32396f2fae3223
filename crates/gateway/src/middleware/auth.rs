//! Authentication middleware backed by the authorization gate.

use axum::{
    body::Body,
    extract::State,
    http::{header::AUTHORIZATION, Request},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use common::{AppError, AppResult};
use domain::{UserRole, BEARER_TOKEN_PREFIX};

use crate::state::AppState;

/// Current authenticated user extracted from the access token.
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser {
    pub id: Uuid,
}

/// Require any valid access token.
pub async fn require_user(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    authorize(&state, request, next, UserRole::Standard).await
}

/// Require an access token carrying the admin role.
pub async fn require_admin(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    authorize(&state, request, next, UserRole::Admin).await
}

async fn authorize(
    state: &AppState,
    mut request: Request<Body>,
    next: Next,
    required: UserRole,
) -> Result<Response, AppError> {
    let token = extract_token(&request)?.to_owned();
    let principal = state.gate.authorize(&token, required).await?;

    request.extensions_mut().insert(CurrentUser {
        id: principal.user_id,
    });

    Ok(next.run(request).await)
}

/// Extract bearer token from Authorization header.
fn extract_token(request: &Request<Body>) -> AppResult<&str> {
    request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|value| value.strip_prefix(BEARER_TOKEN_PREFIX))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(AppError::Unauthorized)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request_with(header: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri("/users/me");
        if let Some(value) = header {
            builder = builder.header(AUTHORIZATION, value);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[test]
    fn test_extract_token() {
        assert_eq!(
            extract_token(&request_with(Some("Bearer abc.def.ghi"))).unwrap(),
            "abc.def.ghi"
        );
        assert!(extract_token(&request_with(None)).is_err());
        assert!(extract_token(&request_with(Some("Basic dXNlcjpwYXNz"))).is_err());
        assert!(extract_token(&request_with(Some("Bearer "))).is_err());
    }
}
