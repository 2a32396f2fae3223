//! Gateway configuration.

use account_service_lib::config::AccountServiceConfig;
use common::{ConfigError, ServerConfig};

/// Gateway configuration.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// HTTP listener
    pub server: ServerConfig,
    /// Embedded account service
    pub accounts: AccountServiceConfig,
}

impl GatewayConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            server: ServerConfig::from_env()?,
            accounts: AccountServiceConfig::from_env()?,
        })
    }

    /// Address the HTTP listener binds to.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
