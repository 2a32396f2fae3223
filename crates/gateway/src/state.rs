//! Application state for dependency injection.

use std::sync::Arc;

use account_service_lib::gate::AuthorizationGate;
use account_service_lib::infra::Database;
use account_service_lib::service::AccountService;
use account_service_lib::Accounts;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub accounts: Arc<dyn AccountService>,
    pub gate: Arc<AuthorizationGate>,
    pub database: Database,
}

impl AppState {
    /// Create new app state.
    pub fn new(accounts: Accounts) -> Self {
        Self {
            accounts: accounts.service,
            gate: accounts.gate,
            database: accounts.database,
        }
    }
}
