//! Token issuer - signs and verifies HS256 JWTs for every token purpose.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use common::{AppError, AppResult};
use domain::{TokenPurpose, UserRole};

use super::store::OneTimeTokenStore;

/// JWT claims payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub role: UserRole,
    pub purpose: TokenPurpose,
    pub jti: Uuid,
    /// Address a verification token was mailed to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub iat: i64,
    pub exp: i64,
}

/// A freshly signed token.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub jti: Uuid,
    pub purpose: TokenPurpose,
    pub expires_at: DateTime<Utc>,
}

/// Identity carried by a verified token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenSubject {
    pub user_id: Uuid,
    pub role: UserRole,
    pub purpose: TokenPurpose,
    pub email: Option<String>,
}

impl From<&Claims> for TokenSubject {
    fn from(claims: &Claims) -> Self {
        Self {
            user_id: claims.sub,
            role: claims.role,
            purpose: claims.purpose,
            email: claims.email.clone(),
        }
    }
}

/// Creates and validates signed, time-bounded tokens.
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    one_time: Arc<dyn OneTimeTokenStore>,
}

impl TokenIssuer {
    pub fn new(secret: &[u8], one_time: Arc<dyn OneTimeTokenStore>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            one_time,
        }
    }

    /// Sign a token for `user_id` valid for `ttl`.
    ///
    /// One-time purposes are registered as outstanding until they expire.
    pub async fn issue(
        &self,
        user_id: Uuid,
        role: UserRole,
        purpose: TokenPurpose,
        ttl: Duration,
    ) -> AppResult<IssuedToken> {
        self.sign(user_id, role, purpose, None, ttl).await
    }

    /// Sign an email verification token bound to the address it is mailed to.
    pub async fn issue_verification(
        &self,
        user_id: Uuid,
        role: UserRole,
        email: &str,
        ttl: Duration,
    ) -> AppResult<IssuedToken> {
        self.sign(
            user_id,
            role,
            TokenPurpose::EmailVerification,
            Some(email.to_string()),
            ttl,
        )
        .await
    }

    async fn sign(
        &self,
        user_id: Uuid,
        role: UserRole,
        purpose: TokenPurpose,
        email: Option<String>,
        ttl: Duration,
    ) -> AppResult<IssuedToken> {
        let now = Utc::now();
        let expires_at = now + ttl;
        let claims = Claims {
            sub: user_id,
            role,
            purpose,
            jti: Uuid::new_v4(),
            email,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Token signing failed: {}", e)))?;

        if purpose.is_one_time() {
            self.one_time
                .register(&claims.jti.to_string(), expires_at)
                .await?;
        }

        Ok(IssuedToken {
            token,
            jti: claims.jti,
            purpose,
            expires_at,
        })
    }

    /// Check signature and expiry without consuming anything.
    pub fn decode(&self, token: &str) -> AppResult<Claims> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation)?;
        Ok(data.claims)
    }

    /// Verify any token, consuming it when its purpose is one-time.
    pub async fn verify(&self, token: &str) -> AppResult<TokenSubject> {
        let claims = self.decode(token)?;
        self.consume(&claims).await?;
        Ok(TokenSubject::from(&claims))
    }

    /// Verify a token that must carry `purpose`.
    ///
    /// A purpose mismatch is rejected before anything is consumed, so a
    /// reset token presented to the verification endpoint stays usable.
    pub async fn verify_for(&self, token: &str, purpose: TokenPurpose) -> AppResult<TokenSubject> {
        let claims = self.decode(token)?;
        if claims.purpose != purpose {
            warn!(
                expected = %purpose,
                presented = %claims.purpose,
                "Token presented for the wrong purpose"
            );
            return Err(AppError::InvalidToken);
        }
        self.consume(&claims).await?;
        Ok(TokenSubject::from(&claims))
    }

    async fn consume(&self, claims: &Claims) -> AppResult<()> {
        if !claims.purpose.is_one_time() {
            return Ok(());
        }
        if self.one_time.redeem(&claims.jti.to_string()).await? {
            Ok(())
        } else {
            Err(AppError::TokenAlreadyUsed)
        }
    }
}
