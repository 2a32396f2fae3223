//! Authorization gate - turns a bearer token into an authorized principal.

use std::sync::Arc;

use tracing::{debug, warn};
use uuid::Uuid;

use common::{AppError, AppResult};
use domain::{TokenPurpose, UserRole};

use crate::token::TokenIssuer;

/// Caller identity established by the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Principal {
    pub user_id: Uuid,
    pub role: UserRole,
}

/// Checks access tokens against a required role.
pub struct AuthorizationGate {
    issuer: Arc<TokenIssuer>,
}

impl AuthorizationGate {
    pub fn new(issuer: Arc<TokenIssuer>) -> Self {
        Self { issuer }
    }

    /// Authorize `token` for an operation requiring `required`.
    ///
    /// Only access tokens are accepted. Any token failure is reported as
    /// `Unauthorized`; a valid token with an insufficient role is `Forbidden`.
    pub async fn authorize(&self, token: &str, required: UserRole) -> AppResult<Principal> {
        let subject = match self.issuer.verify_for(token, TokenPurpose::Access).await {
            Ok(subject) => subject,
            Err(AppError::TokenExpired | AppError::InvalidToken) => {
                debug!("Rejected bearer token");
                return Err(AppError::Unauthorized);
            }
            Err(other) => return Err(other),
        };

        if !subject.role.can_access(required) {
            warn!(
                user_id = %subject.user_id,
                role = %subject.role,
                required = %required,
                "Insufficient role"
            );
            return Err(AppError::Forbidden);
        }

        Ok(Principal {
            user_id: subject.user_id,
            role: subject.role,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::token::InMemoryTokenStore;

    fn setup() -> (Arc<TokenIssuer>, AuthorizationGate) {
        let issuer = Arc::new(TokenIssuer::new(
            b"gate-unit-test-secret-0123456789abcdef",
            Arc::new(InMemoryTokenStore::new()),
        ));
        let gate = AuthorizationGate::new(issuer.clone());
        (issuer, gate)
    }

    async fn token(
        issuer: &TokenIssuer,
        role: UserRole,
        purpose: TokenPurpose,
        ttl: Duration,
    ) -> String {
        issuer
            .issue(Uuid::new_v4(), role, purpose, ttl)
            .await
            .unwrap()
            .token
    }

    #[tokio::test]
    async fn test_role_ordering() {
        let (issuer, gate) = setup();
        let hour = Duration::hours(1);
        let standard = token(&issuer, UserRole::Standard, TokenPurpose::Access, hour).await;
        let admin = token(&issuer, UserRole::Admin, TokenPurpose::Access, hour).await;

        assert!(gate.authorize(&standard, UserRole::Standard).await.is_ok());
        assert!(matches!(
            gate.authorize(&standard, UserRole::Admin).await,
            Err(AppError::Forbidden)
        ));

        let principal = gate.authorize(&admin, UserRole::Standard).await.unwrap();
        assert_eq!(principal.role, UserRole::Admin);
        assert!(gate.authorize(&admin, UserRole::Admin).await.is_ok());
    }

    #[tokio::test]
    async fn test_rejects_non_access_tokens() {
        let (issuer, gate) = setup();
        let reset = token(
            &issuer,
            UserRole::Admin,
            TokenPurpose::PasswordReset,
            Duration::minutes(30),
        )
        .await;

        assert!(matches!(
            gate.authorize(&reset, UserRole::Standard).await,
            Err(AppError::Unauthorized)
        ));
        // The reset token was not consumed by the failed attempt
        assert!(issuer
            .verify_for(&reset, TokenPurpose::PasswordReset)
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_rejects_expired_and_garbage() {
        let (issuer, gate) = setup();
        let past = Duration::seconds(-5);
        let expired = token(&issuer, UserRole::Admin, TokenPurpose::Access, past).await;

        assert!(matches!(
            gate.authorize(&expired, UserRole::Standard).await,
            Err(AppError::Unauthorized)
        ));
        assert!(matches!(
            gate.authorize("garbage", UserRole::Standard).await,
            Err(AppError::Unauthorized)
        ));
    }
}
