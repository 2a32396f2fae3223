//! Account Service Library
//!
//! Credential store, token issuer, account use cases and the authorization
//! gate. The HTTP gateway embeds this crate in-process.

pub mod config;
pub mod gate;
pub mod infra;
pub mod mailer;
pub mod repository;
pub mod service;
pub mod token;

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{info, warn};

use common::AppResult;

use crate::config::AccountServiceConfig;
use crate::gate::AuthorizationGate;
use crate::infra::Database;
use crate::mailer::{BackgroundMailer, LogMailer, Mailer};
use crate::repository::UserStore;
use crate::service::{AccountManager, AccountPolicy, AccountService};
use crate::token::{InMemoryTokenStore, OneTimeTokenStore, RedisTokenStore, TokenIssuer};

/// Fully wired account components.
#[derive(Clone)]
pub struct Accounts {
    pub service: Arc<dyn AccountService>,
    pub gate: Arc<AuthorizationGate>,
    pub database: Database,
}

impl Accounts {
    /// Connect to storage and wire every component from configuration.
    ///
    /// With `REDIS_URL` set one-time tokens are tracked in Redis, otherwise
    /// in process with a periodic sweeper.
    pub async fn connect(config: &AccountServiceConfig) -> AppResult<Self> {
        let database = Database::connect(&config.database).await?;

        let store: Arc<dyn OneTimeTokenStore> = match &config.cache.url {
            Some(url) => {
                info!("Tracking one-time tokens in Redis");
                Arc::new(RedisTokenStore::connect(url).await?)
            }
            None => {
                info!("Tracking one-time tokens in process");
                let store = Arc::new(InMemoryTokenStore::new());
                spawn_token_sweeper(
                    store.clone(),
                    Duration::from_secs(config.tokens.sweep_interval_seconds.max(1)),
                );
                store
            }
        };

        let mailer: Arc<dyn Mailer> = Arc::new(BackgroundMailer::spawn(Arc::new(LogMailer::new(
            config.accounts.mail_from.clone(),
        ))));

        Ok(Self::assemble(database, store, mailer, config))
    }

    /// Wire components around already constructed infrastructure.
    pub fn assemble(
        database: Database,
        store: Arc<dyn OneTimeTokenStore>,
        mailer: Arc<dyn Mailer>,
        config: &AccountServiceConfig,
    ) -> Self {
        let issuer = Arc::new(TokenIssuer::new(config.tokens.secret_bytes(), store));
        let users = Arc::new(UserStore::new(database.get_connection()));
        let policy = AccountPolicy::new(&config.tokens, &config.accounts);

        let service: Arc<dyn AccountService> =
            Arc::new(AccountManager::new(users, issuer.clone(), mailer, policy));
        let gate = Arc::new(AuthorizationGate::new(issuer));

        Self {
            service,
            gate,
            database,
        }
    }
}

/// Periodically drop expired entries from a one-time token store.
pub fn spawn_token_sweeper(
    store: Arc<dyn OneTimeTokenStore>,
    every: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.tick().await;
        loop {
            ticker.tick().await;
            if let Err(e) = store.purge_expired().await {
                warn!(error = %e, "One-time token sweep failed");
            }
        }
    })
}
