//! Account service configuration.

use common::{AccountPolicyConfig, CacheConfig, ConfigError, DatabaseConfig, TokenConfig};

/// Account service configuration.
#[derive(Debug, Clone)]
pub struct AccountServiceConfig {
    /// Credential store connection
    pub database: DatabaseConfig,
    /// Optional Redis for one-time token tracking
    pub cache: CacheConfig,
    /// Token signing secret and lifetimes
    pub tokens: TokenConfig,
    /// Lockout threshold and email settings
    pub accounts: AccountPolicyConfig,
}

impl AccountServiceConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            database: DatabaseConfig::from_env()?,
            cache: CacheConfig::from_env(),
            tokens: TokenConfig::from_env()?,
            accounts: AccountPolicyConfig::from_env()?,
        })
    }
}
