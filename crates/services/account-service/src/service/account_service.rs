//! Account service - registration, verification, login, password reset,
//! profile maintenance and admin user management.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use tracing::{error, info, warn};
use uuid::Uuid;

use common::{
    AccountPolicyConfig, AppError, AppResult, OptionExt, Paginated, PaginationParams, TokenConfig,
};
use domain::{
    generate_nickname, validation, NewUser, Password, ProfileUpdate, TokenPurpose, User,
    UserChanges, UserResponse, UserRole,
};

use crate::mailer::{EmailMessage, Mailer};
use crate::repository::UserRepository;
use crate::token::{IssuedToken, TokenIssuer, TokenResponse};

/// Attempts at finding a free generated nickname before giving up
const MAX_NICKNAME_ATTEMPTS: usize = 10;

/// Outcome of a successful registration.
#[derive(Debug, Clone)]
pub struct Registration {
    pub user: User,
    pub verification: IssuedToken,
}

/// Lifetimes and limits applied by the account service.
#[derive(Debug, Clone)]
pub struct AccountPolicy {
    pub max_login_attempts: i32,
    pub app_base_url: String,
    pub access_ttl: Duration,
    pub verification_ttl: Duration,
    pub reset_ttl: Duration,
}

impl AccountPolicy {
    pub fn new(tokens: &TokenConfig, accounts: &AccountPolicyConfig) -> Self {
        Self {
            max_login_attempts: accounts.max_login_attempts,
            app_base_url: accounts.app_base_url.clone(),
            access_ttl: Duration::hours(tokens.access_expiration_hours),
            verification_ttl: Duration::hours(tokens.verification_expiration_hours),
            reset_ttl: Duration::minutes(tokens.reset_expiration_minutes),
        }
    }
}

/// Account service trait for dependency injection.
#[async_trait]
pub trait AccountService: Send + Sync {
    /// Create an unverified standard account and mail a verification link
    async fn register(&self, email: String, password: String) -> AppResult<Registration>;

    /// Redeem an email verification token
    async fn verify_email(&self, token: &str) -> AppResult<User>;

    /// Check credentials and issue an access token
    async fn login(&self, email: String, password: String) -> AppResult<TokenResponse>;

    /// Issue a password reset token and mail it to the account owner
    async fn reset_password(&self, email: String) -> AppResult<IssuedToken>;

    /// Redeem a password reset token and set a new password
    async fn confirm_reset(&self, token: &str, new_password: String) -> AppResult<()>;

    /// Get user by ID
    async fn get_user(&self, id: Uuid) -> AppResult<User>;

    /// Apply a self-service profile update
    async fn update_profile(&self, id: Uuid, update: ProfileUpdate) -> AppResult<User>;

    /// List users one page at a time
    async fn list_users(&self, params: PaginationParams) -> AppResult<Paginated<UserResponse>>;

    /// Permanently delete a user. `actor` cannot delete themselves.
    async fn delete_user(&self, actor: Uuid, id: Uuid) -> AppResult<()>;

    /// Change a user's role
    async fn change_role(&self, id: Uuid, role: UserRole) -> AppResult<User>;

    /// Clear a lockout
    async fn unlock_user(&self, id: Uuid) -> AppResult<User>;

    /// Set whether a user is a verified professional
    async fn set_professional_status(&self, id: Uuid, status: bool) -> AppResult<User>;

    /// Create a verified administrator account
    async fn create_admin(&self, email: String, password: String) -> AppResult<User>;
}

/// Concrete implementation of AccountService.
pub struct AccountManager {
    users: Arc<dyn UserRepository>,
    issuer: Arc<TokenIssuer>,
    mailer: Arc<dyn Mailer>,
    policy: AccountPolicy,
}

impl AccountManager {
    pub fn new(
        users: Arc<dyn UserRepository>,
        issuer: Arc<TokenIssuer>,
        mailer: Arc<dyn Mailer>,
        policy: AccountPolicy,
    ) -> Self {
        Self {
            users,
            issuer,
            mailer,
            policy,
        }
    }

    /// Insert a user under a freshly generated, unused nickname.
    async fn create_with_nickname(
        &self,
        email: String,
        password_hash: String,
        role: UserRole,
        email_verified: bool,
    ) -> AppResult<User> {
        for _ in 0..MAX_NICKNAME_ATTEMPTS {
            let nickname = generate_nickname();
            if self.users.find_by_nickname(&nickname).await?.is_some() {
                continue;
            }

            let new_user = NewUser {
                email: email.clone(),
                password_hash: password_hash.clone(),
                nickname,
                role,
                email_verified,
            };
            match self.users.create(new_user).await {
                // Lost a race for the nickname
                Err(AppError::Conflict(_)) => continue,
                result => return result,
            }
        }

        Err(AppError::internal("Could not generate a unique nickname"))
    }

    async fn send_verification(&self, user: &User) -> AppResult<IssuedToken> {
        let issued = self
            .issuer
            .issue_verification(user.id, user.role, &user.email, self.policy.verification_ttl)
            .await?;

        let message =
            EmailMessage::verification(&user.email, &self.policy.app_base_url, &issued.token);
        self.deliver(message).await;

        Ok(issued)
    }

    /// Mail delivery never fails the operation that triggered it.
    async fn deliver(&self, message: EmailMessage) {
        let to = message.to.clone();
        if let Err(e) = self.mailer.send(message).await {
            error!(to = %to, error = %e, "Failed to hand off email");
        }
    }

    async fn record_failed_login(&self, id: Uuid) -> AppResult<()> {
        let user = self
            .users
            .record_failed_login(id, self.policy.max_login_attempts)
            .await?;

        let attempts = user.failed_login_attempts;
        if user.is_locked {
            warn!(user_id = %id, attempts, "Account locked after repeated failed logins");
        } else {
            warn!(user_id = %id, attempts, "Failed login attempt");
        }
        Ok(())
    }
}

#[async_trait]
impl AccountService for AccountManager {
    async fn register(&self, email: String, password: String) -> AppResult<Registration> {
        let email = validation::normalize_email(&email)?;
        let password_hash = Password::new(&password)?.into_string();

        if self.users.find_by_email(&email).await?.is_some() {
            return Err(AppError::DuplicateEmail);
        }

        let user = self
            .create_with_nickname(email, password_hash, UserRole::Standard, false)
            .await?;
        let verification = self.send_verification(&user).await?;

        info!(user_id = %user.id, "User registered");
        Ok(Registration { user, verification })
    }

    async fn verify_email(&self, token: &str) -> AppResult<User> {
        let subject = self
            .issuer
            .verify_for(token, TokenPurpose::EmailVerification)
            .await?;

        // Only the address the token was mailed to can be confirmed by it
        let confirmed = match subject.email.as_deref() {
            Some(email) => self.users.confirm_email(subject.user_id, email).await?,
            None => false,
        };
        let user = self.get_user(subject.user_id).await?;
        if !confirmed {
            warn!(user_id = %user.id, "Verification token does not match the current email");
            return Err(AppError::InvalidToken);
        }

        info!(user_id = %user.id, "Email verified");
        Ok(user)
    }

    async fn login(&self, email: String, password: String) -> AppResult<TokenResponse> {
        let user = match validation::normalize_email(&email) {
            Ok(email) => self.users.find_by_email(&email).await?,
            Err(_) => None,
        };

        let Some(user) = user else {
            // Same hashing work as a real account
            Password::dummy().verify(&password);
            return Err(AppError::InvalidCredentials);
        };

        if user.is_locked {
            warn!(user_id = %user.id, "Login attempt on locked account");
            return Err(AppError::AccountLocked);
        }

        if !Password::from_hash(user.password_hash.as_str()).verify(&password) {
            self.record_failed_login(user.id).await?;
            return Err(AppError::InvalidCredentials);
        }

        if !user.email_verified {
            warn!(user_id = %user.id, "Login attempt with unverified email");
            return Err(AppError::EmailNotVerified);
        }

        self.users
            .update(
                user.id,
                UserChanges {
                    failed_login_attempts: Some(0),
                    last_login_at: Some(Utc::now()),
                    ..UserChanges::default()
                },
            )
            .await?;

        let issued = self
            .issuer
            .issue(user.id, user.role, TokenPurpose::Access, self.policy.access_ttl)
            .await?;

        info!(user_id = %user.id, "User logged in");
        Ok(TokenResponse::bearer(
            issued.token,
            self.policy.access_ttl.num_seconds(),
        ))
    }

    async fn reset_password(&self, email: String) -> AppResult<IssuedToken> {
        let email = validation::normalize_email(&email)?;
        let user = self.users.find_by_email(&email).await?.ok_or_not_found()?;

        let issued = self
            .issuer
            .issue(
                user.id,
                user.role,
                TokenPurpose::PasswordReset,
                self.policy.reset_ttl,
            )
            .await?;

        let message =
            EmailMessage::password_reset(&user.email, &self.policy.app_base_url, &issued.token);
        self.deliver(message).await;

        info!(user_id = %user.id, "Password reset requested");
        Ok(issued)
    }

    async fn confirm_reset(&self, token: &str, new_password: String) -> AppResult<()> {
        // A weak password must not burn the token
        let password = Password::new(&new_password)?;

        let subject = self
            .issuer
            .verify_for(token, TokenPurpose::PasswordReset)
            .await?;

        self.users
            .update(
                subject.user_id,
                UserChanges {
                    password_hash: Some(password.into_string()),
                    failed_login_attempts: Some(0),
                    is_locked: Some(false),
                    ..UserChanges::default()
                },
            )
            .await?;

        info!(user_id = %subject.user_id, "Password reset completed");
        Ok(())
    }

    async fn get_user(&self, id: Uuid) -> AppResult<User> {
        self.users.find_by_id(id).await?.ok_or_not_found()
    }

    async fn update_profile(&self, id: Uuid, update: ProfileUpdate) -> AppResult<User> {
        let update = update.validate()?;
        let current = self.get_user(id).await?;

        let new_email = update.email.clone().filter(|email| *email != current.email);
        if let Some(email) = &new_email {
            if self.users.find_by_email(email).await?.is_some() {
                return Err(AppError::DuplicateEmail);
            }
        }
        if let Some(nickname) = update.nickname.as_deref() {
            if nickname != current.nickname
                && self.users.find_by_nickname(nickname).await?.is_some()
            {
                return Err(AppError::conflict("Nickname"));
            }
        }

        let mut changes = update.into_changes();
        if let Some(email) = &new_email {
            changes.email = Some(email.clone());
            changes.email_verified = Some(false);
        }

        let user = self.users.update(id, changes).await?;

        if new_email.is_some() {
            info!(user_id = %user.id, "Email changed, verification required");
            self.send_verification(&user).await?;
        }

        info!(user_id = %user.id, "Profile updated");
        Ok(user)
    }

    async fn list_users(&self, params: PaginationParams) -> AppResult<Paginated<UserResponse>> {
        let users = self.users.list(params.offset(), params.limit()).await?;
        let total = self.users.count().await?;

        let data = users.into_iter().map(UserResponse::from).collect();
        Ok(Paginated::new(data, params, total))
    }

    async fn delete_user(&self, actor: Uuid, id: Uuid) -> AppResult<()> {
        if actor == id {
            return Err(AppError::Forbidden);
        }

        self.users.delete(id).await?;
        info!(user_id = %id, deleted_by = %actor, "User deleted");
        Ok(())
    }

    async fn change_role(&self, id: Uuid, role: UserRole) -> AppResult<User> {
        let user = self
            .users
            .update(
                id,
                UserChanges {
                    role: Some(role),
                    ..UserChanges::default()
                },
            )
            .await?;

        info!(user_id = %id, role = %role, "Role changed");
        Ok(user)
    }

    async fn unlock_user(&self, id: Uuid) -> AppResult<User> {
        let user = self
            .users
            .update(
                id,
                UserChanges {
                    failed_login_attempts: Some(0),
                    is_locked: Some(false),
                    ..UserChanges::default()
                },
            )
            .await?;

        info!(user_id = %id, "Account unlocked");
        Ok(user)
    }

    async fn set_professional_status(&self, id: Uuid, status: bool) -> AppResult<User> {
        let user = self
            .users
            .update(id, UserChanges::professional_status(status, Utc::now()))
            .await?;

        info!(user_id = %id, is_professional = status, "Professional status updated");
        Ok(user)
    }

    async fn create_admin(&self, email: String, password: String) -> AppResult<User> {
        let email = validation::normalize_email(&email)?;
        let password_hash = Password::new(&password)?.into_string();

        if self.users.find_by_email(&email).await?.is_some() {
            return Err(AppError::DuplicateEmail);
        }

        let user = self
            .create_with_nickname(email, password_hash, UserRole::Admin, true)
            .await?;

        info!(user_id = %user.id, "Administrator created");
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use mockall::predicate::*;

    use super::*;
    use crate::mailer::MockMailer;
    use crate::repository::MockUserRepository;
    use crate::token::InMemoryTokenStore;

    const PASSWORD: &str = "Str0ng!Pass";

    fn policy() -> AccountPolicy {
        let tokens = TokenConfig::with_secret("service-unit-test-secret-0123456789");
        AccountPolicy::new(&tokens, &AccountPolicyConfig::default())
    }

    fn issuer() -> Arc<TokenIssuer> {
        Arc::new(TokenIssuer::new(
            b"service-unit-test-secret-0123456789",
            Arc::new(InMemoryTokenStore::new()),
        ))
    }

    fn quiet_mailer() -> MockMailer {
        let mut mailer = MockMailer::new();
        mailer.expect_send().returning(|_| Ok(()));
        mailer
    }

    fn user(verified: bool, failed_login_attempts: i32, is_locked: bool) -> User {
        let now = Utc::now();
        User {
            id: Uuid::new_v4(),
            nickname: "cleverfox1".to_string(),
            email: "jane@example.com".to_string(),
            password_hash: Password::new(PASSWORD).unwrap().into_string(),
            role: UserRole::Standard,
            email_verified: verified,
            first_name: None,
            last_name: None,
            bio: None,
            profile_picture_url: None,
            linkedin_profile_url: None,
            github_profile_url: None,
            failed_login_attempts,
            is_locked,
            last_login_at: None,
            is_professional: false,
            professional_status_updated_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn manager(repo: MockUserRepository, mailer: MockMailer) -> AccountManager {
        AccountManager::new(Arc::new(repo), issuer(), Arc::new(mailer), policy())
    }

    #[tokio::test]
    async fn test_login_unknown_user() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_email().returning(|_| Ok(None));
        repo.expect_update().never();

        let service = manager(repo, quiet_mailer());
        let result = service
            .login("nobody@example.com".into(), PASSWORD.into())
            .await;
        assert!(matches!(result, Err(AppError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_login_malformed_email_is_invalid_credentials() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_email().never();

        let service = manager(repo, quiet_mailer());
        let result = service.login("not-an-email".into(), PASSWORD.into()).await;
        assert!(matches!(result, Err(AppError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_login_wrong_password_counts_attempt() {
        let existing = user(true, 1, false);
        let id = existing.id;

        let mut repo = MockUserRepository::new();
        repo.expect_find_by_email()
            .withf(|email| email == "jane@example.com")
            .returning(move |_| Ok(Some(existing.clone())));
        repo.expect_record_failed_login()
            .with(eq(id), eq(5))
            .times(1)
            .returning(|_, _| Ok(user(true, 2, false)));
        repo.expect_update().never();

        let service = manager(repo, quiet_mailer());
        let result = service
            .login("Jane@Example.com ".into(), "Wr0ng!Pass".into())
            .await;
        assert!(matches!(result, Err(AppError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_login_locking_failure_is_still_invalid_credentials() {
        let existing = user(true, 4, false);

        let mut repo = MockUserRepository::new();
        repo.expect_find_by_email()
            .returning(move |_| Ok(Some(existing.clone())));
        repo.expect_record_failed_login()
            .times(1)
            .returning(|_, _| Ok(user(true, 5, true)));

        let service = manager(repo, quiet_mailer());
        let result = service
            .login("jane@example.com".into(), "Wr0ng!Pass".into())
            .await;
        assert!(matches!(result, Err(AppError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_login_locked_account() {
        let existing = user(true, 5, true);

        let mut repo = MockUserRepository::new();
        repo.expect_find_by_email()
            .returning(move |_| Ok(Some(existing.clone())));
        repo.expect_update().never();
        repo.expect_record_failed_login().never();

        let service = manager(repo, quiet_mailer());
        let result = service.login("jane@example.com".into(), PASSWORD.into()).await;
        assert!(matches!(result, Err(AppError::AccountLocked)));
    }

    #[tokio::test]
    async fn test_login_unverified() {
        let existing = user(false, 0, false);

        let mut repo = MockUserRepository::new();
        repo.expect_find_by_email()
            .returning(move |_| Ok(Some(existing.clone())));
        repo.expect_update().never();

        let service = manager(repo, quiet_mailer());
        let result = service.login("jane@example.com".into(), PASSWORD.into()).await;
        assert!(matches!(result, Err(AppError::EmailNotVerified)));
    }

    #[tokio::test]
    async fn test_login_success_resets_counter() {
        let existing = user(true, 3, false);
        let refreshed = user(true, 0, false);

        let mut repo = MockUserRepository::new();
        repo.expect_find_by_email()
            .returning(move |_| Ok(Some(existing.clone())));
        repo.expect_update()
            .withf(|_, changes| {
                changes.failed_login_attempts == Some(0) && changes.last_login_at.is_some()
            })
            .times(1)
            .returning(move |_, _| Ok(refreshed.clone()));

        let service = manager(repo, quiet_mailer());
        let token = service
            .login("jane@example.com".into(), PASSWORD.into())
            .await
            .unwrap();
        assert_eq!(token.token_type, "Bearer");
        assert_eq!(token.expires_in, 24 * 3600);
        assert!(!token.access_token.is_empty());
    }

    #[tokio::test]
    async fn test_register_rejects_weak_password_before_lookup() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_email().never();
        repo.expect_create().never();

        let service = manager(repo, quiet_mailer());
        let result = service
            .register("jane@example.com".into(), "weakpass".into())
            .await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_register_duplicate_email() {
        let existing = user(true, 0, false);

        let mut repo = MockUserRepository::new();
        repo.expect_find_by_email()
            .returning(move |_| Ok(Some(existing.clone())));
        repo.expect_create().never();

        let service = manager(repo, quiet_mailer());
        let result = service
            .register("jane@example.com".into(), PASSWORD.into())
            .await;
        assert!(matches!(result, Err(AppError::DuplicateEmail)));
    }

    #[tokio::test]
    async fn test_register_survives_mail_failure() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_email().returning(|_| Ok(None));
        repo.expect_find_by_nickname().returning(|_| Ok(None));
        repo.expect_create().times(1).returning(|new_user| {
            let mut created = user(false, 0, false);
            created.email = new_user.email;
            created.nickname = new_user.nickname;
            created.password_hash = new_user.password_hash;
            Ok(created)
        });

        let mut mailer = MockMailer::new();
        mailer
            .expect_send()
            .withf(|message| {
                message.to == "jane@example.com"
                    && message
                        .action_url
                        .as_deref()
                        .is_some_and(|url| url.contains("/verify-email?token="))
            })
            .times(1)
            .returning(|_| Err(AppError::internal("queue closed")));

        let service = manager(repo, mailer);
        let registration = service
            .register("JANE@example.com".into(), PASSWORD.into())
            .await
            .unwrap();

        assert_eq!(registration.user.email, "jane@example.com");
        assert_ne!(registration.user.password_hash, PASSWORD);
        assert_eq!(
            registration.verification.purpose,
            TokenPurpose::EmailVerification
        );
    }

    #[tokio::test]
    async fn test_register_retries_taken_nickname() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_email().returning(|_| Ok(None));
        let mut calls = 0;
        repo.expect_find_by_nickname().returning(move |_| {
            calls += 1;
            Ok((calls == 1).then(|| user(true, 0, false)))
        });
        repo.expect_create()
            .times(1)
            .returning(|_| Ok(user(false, 0, false)));

        let service = manager(repo, quiet_mailer());
        assert!(service
            .register("jane@example.com".into(), PASSWORD.into())
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_confirm_reset_weak_password_keeps_token() {
        let issuer = issuer();
        let id = Uuid::new_v4();
        let issued = issuer
            .issue(
                id,
                UserRole::Standard,
                TokenPurpose::PasswordReset,
                Duration::minutes(5),
            )
            .await
            .unwrap();

        let mut repo = MockUserRepository::new();
        repo.expect_update()
            .withf(|_, changes| {
                changes.password_hash.is_some()
                    && changes.is_locked == Some(false)
                    && changes.failed_login_attempts == Some(0)
            })
            .times(1)
            .returning(|_, _| Ok(user(true, 0, false)));

        let service = AccountManager::new(
            Arc::new(repo),
            issuer,
            Arc::new(quiet_mailer()),
            policy(),
        );

        let weak = service.confirm_reset(&issued.token, "short".into()).await;
        assert!(matches!(weak, Err(AppError::Validation(_))));

        service
            .confirm_reset(&issued.token, "N3w!Password".into())
            .await
            .unwrap();

        let again = service
            .confirm_reset(&issued.token, "N3w!Password".into())
            .await;
        assert!(matches!(again, Err(AppError::TokenAlreadyUsed)));
    }

    #[tokio::test]
    async fn test_reset_password_unknown_email() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_email().returning(|_| Ok(None));

        let mut mailer = MockMailer::new();
        mailer.expect_send().never();

        let service = manager(repo, mailer);
        let result = service.reset_password("ghost@example.com".into()).await;
        assert!(matches!(result, Err(AppError::NotFound)));
    }

    #[tokio::test]
    async fn test_verify_email_rejects_superseded_address() {
        let issuer = issuer();
        let current = user(false, 0, false);
        let id = current.id;
        let issued = issuer
            .issue_verification(
                id,
                UserRole::Standard,
                "old@example.com",
                Duration::hours(1),
            )
            .await
            .unwrap();

        let mut repo = MockUserRepository::new();
        repo.expect_confirm_email()
            .withf(move |uid, email| *uid == id && email == "old@example.com")
            .times(1)
            .returning(|_, _| Ok(false));
        repo.expect_find_by_id()
            .returning(move |_| Ok(Some(current.clone())));
        repo.expect_update().never();

        let service = AccountManager::new(
            Arc::new(repo),
            issuer,
            Arc::new(quiet_mailer()),
            policy(),
        );
        assert!(matches!(
            service.verify_email(&issued.token).await,
            Err(AppError::InvalidToken)
        ));
    }

    #[tokio::test]
    async fn test_set_professional_status_stamps_time() {
        let id = Uuid::new_v4();

        let mut repo = MockUserRepository::new();
        repo.expect_update()
            .withf(move |uid, changes| {
                *uid == id
                    && changes.is_professional == Some(true)
                    && changes.professional_status_updated_at.is_some()
            })
            .times(1)
            .returning(|_, changes| {
                let mut updated = user(true, 0, false);
                updated.is_professional = true;
                updated.professional_status_updated_at = changes.professional_status_updated_at;
                Ok(updated)
            });

        let service = manager(repo, quiet_mailer());
        let updated = service.set_professional_status(id, true).await.unwrap();
        assert!(updated.is_professional);
        assert!(updated.professional_status_updated_at.is_some());
    }

    #[tokio::test]
    async fn test_cannot_delete_self() {
        let mut repo = MockUserRepository::new();
        repo.expect_delete().never();

        let service = manager(repo, quiet_mailer());
        let id = Uuid::new_v4();
        assert!(matches!(
            service.delete_user(id, id).await,
            Err(AppError::Forbidden)
        ));
    }

    #[tokio::test]
    async fn test_empty_profile_update_rejected() {
        let mut repo = MockUserRepository::new();
        repo.expect_update().never();

        let service = manager(repo, quiet_mailer());
        let result = service
            .update_profile(Uuid::new_v4(), ProfileUpdate::default())
            .await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_profile_email_taken() {
        let current = user(true, 0, false);
        let id = current.id;

        let mut repo = MockUserRepository::new();
        repo.expect_find_by_id()
            .with(eq(id))
            .returning(move |_| Ok(Some(current.clone())));
        repo.expect_find_by_email()
            .withf(|email| email == "taken@example.com")
            .returning(|_| Ok(Some(user(true, 0, false))));
        repo.expect_update().never();

        let service = manager(repo, quiet_mailer());
        let update = ProfileUpdate {
            email: Some("Taken@Example.com".into()),
            ..ProfileUpdate::default()
        };
        assert!(matches!(
            service.update_profile(id, update).await,
            Err(AppError::DuplicateEmail)
        ));
    }
}
