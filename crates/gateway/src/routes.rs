//! Route configuration.

use axum::Router;
use tower_http::trace::TraceLayer;

use crate::handlers::{auth_routes, health_routes, user_routes};
use crate::state::AppState;

/// Create the main router with all routes.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/health", health_routes())
        .nest("/auth", auth_routes())
        .nest("/users", user_routes(state.clone()))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
