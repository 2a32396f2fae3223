//! API Gateway Library
//!
//! HTTP REST surface over the embedded account service.

pub mod config;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;

use tracing::info;

use account_service_lib::Accounts;
use domain::User;

use crate::config::GatewayConfig;
use crate::routes::create_router;
use crate::state::AppState;

/// Connect the account service and serve HTTP until Ctrl+C.
pub async fn run(config: GatewayConfig) -> Result<(), Box<dyn std::error::Error>> {
    let accounts = Accounts::connect(&config.accounts).await?;
    let app = create_router(AppState::new(accounts));

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Gateway listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Gateway stopped");
    Ok(())
}

/// Create a verified administrator account.
pub async fn create_admin(
    config: GatewayConfig,
    email: String,
    password: String,
) -> Result<User, Box<dyn std::error::Error>> {
    let accounts = Accounts::connect(&config.accounts).await?;
    let admin = accounts.service.create_admin(email, password).await?;
    Ok(admin)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        return;
    }
    info!("Received shutdown signal, stopping server...");
}
