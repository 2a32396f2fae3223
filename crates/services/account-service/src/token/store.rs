//! One-time token tracking.
//!
//! A one-time token is registered as outstanding when issued and removed on
//! its first redemption. Removal is a single atomic operation in both
//! backends, so concurrent redemptions of the same token produce exactly one
//! winner.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use redis::{aio::ConnectionManager, AsyncCommands};
use tracing::debug;

use common::AppResult;

/// Key prefix for outstanding one-time tokens in Redis
const REDIS_PREFIX_ONE_TIME: &str = "one_time_token:";

/// Atomic check-and-set store for one-time token identifiers.
#[async_trait]
pub trait OneTimeTokenStore: Send + Sync {
    /// Track `jti` as outstanding until `expires_at`.
    async fn register(&self, jti: &str, expires_at: DateTime<Utc>) -> AppResult<()>;

    /// Consume `jti`. Returns `true` for the single caller that removed it.
    async fn redeem(&self, jti: &str) -> AppResult<bool>;

    /// Drop entries whose tokens have expired. Returns how many were dropped.
    async fn purge_expired(&self) -> AppResult<usize>;
}

/// In-process store for single-instance deployments and tests.
#[derive(Default)]
pub struct InMemoryTokenStore {
    outstanding: DashMap<String, DateTime<Utc>>,
}

impl InMemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tokens still outstanding.
    pub fn len(&self) -> usize {
        self.outstanding.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outstanding.is_empty()
    }
}

#[async_trait]
impl OneTimeTokenStore for InMemoryTokenStore {
    async fn register(&self, jti: &str, expires_at: DateTime<Utc>) -> AppResult<()> {
        self.outstanding.insert(jti.to_string(), expires_at);
        Ok(())
    }

    async fn redeem(&self, jti: &str) -> AppResult<bool> {
        Ok(match self.outstanding.remove(jti) {
            Some((_, expires_at)) => expires_at > Utc::now(),
            None => false,
        })
    }

    async fn purge_expired(&self) -> AppResult<usize> {
        let now = Utc::now();
        let before = self.outstanding.len();
        self.outstanding.retain(|_, expires_at| *expires_at > now);
        let purged = before.saturating_sub(self.outstanding.len());
        if purged > 0 {
            debug!(purged, "Purged expired one-time tokens");
        }
        Ok(purged)
    }
}

/// Redis-backed store shared by every gateway instance.
///
/// Entries carry a Redis expiry equal to the token lifetime, so purging is
/// left to Redis.
pub struct RedisTokenStore {
    conn: ConnectionManager,
}

impl RedisTokenStore {
    /// Connect to Redis.
    pub async fn connect(url: &str) -> AppResult<Self> {
        debug!("Connecting to Redis for one-time token tracking");
        let client = redis::Client::open(url)?;
        let conn = ConnectionManager::new(client).await?;
        Ok(Self { conn })
    }

    fn key(jti: &str) -> String {
        format!("{}{}", REDIS_PREFIX_ONE_TIME, jti)
    }
}

#[async_trait]
impl OneTimeTokenStore for RedisTokenStore {
    async fn register(&self, jti: &str, expires_at: DateTime<Utc>) -> AppResult<()> {
        let ttl = (expires_at - Utc::now()).num_seconds().max(1) as u64;
        let mut conn = self.conn.clone();
        conn.set_ex::<_, _, ()>(Self::key(jti), 1u8, ttl).await?;
        Ok(())
    }

    async fn redeem(&self, jti: &str) -> AppResult<bool> {
        let mut conn = self.conn.clone();
        let removed: u64 = conn.del(Self::key(jti)).await?;
        Ok(removed == 1)
    }

    async fn purge_expired(&self) -> AppResult<usize> {
        Ok(0)
    }
}
