//! Token issuance, verification and one-time redemption tracking.

mod issuer;
mod store;

pub use issuer::{Claims, IssuedToken, TokenIssuer, TokenSubject};
pub use store::{InMemoryTokenStore, OneTimeTokenStore, RedisTokenStore};

use serde::{Deserialize, Serialize};

use domain::TOKEN_TYPE_BEARER;

/// Token response returned after successful authentication
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    /// JWT access token
    pub access_token: String,
    /// Token type (always "Bearer")
    pub token_type: String,
    /// Token lifetime in seconds
    pub expires_in: i64,
}

impl TokenResponse {
    pub fn bearer(access_token: String, expires_in: i64) -> Self {
        Self {
            access_token,
            token_type: TOKEN_TYPE_BEARER.to_string(),
            expires_in,
        }
    }
}
