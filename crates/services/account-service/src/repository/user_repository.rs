//! Credential store: user persistence on SeaORM.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, SqlErr,
};
use uuid::Uuid;

use super::entities::user::{self, ActiveModel, Entity as UserEntity};
use common::{AppError, AppResult};
use domain::{NewUser, User, UserChanges};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// User repository trait for dependency injection.
///
/// Uniqueness of email and nickname is enforced by the storage itself, so a
/// lost race between two writers still surfaces as a conflict.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find user by ID
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>>;

    /// Find user by (normalized) email address
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;

    /// Find user by nickname
    async fn find_by_nickname(&self, nickname: &str) -> AppResult<Option<User>>;

    /// Insert a new user. Fails with `DuplicateEmail` or `Conflict("Nickname")`.
    async fn create(&self, new_user: NewUser) -> AppResult<User>;

    /// Apply a partial update. Fails with `NotFound`.
    async fn update(&self, id: Uuid, changes: UserChanges) -> AppResult<User>;

    /// Mark the user verified only while their email is still `email`.
    /// Returns `false` when no row matched.
    async fn confirm_email(&self, id: Uuid, email: &str) -> AppResult<bool>;

    /// Count a failed login in a single statement and lock the account once
    /// the counter reaches `max_attempts`. Fails with `NotFound`.
    async fn record_failed_login(&self, id: Uuid, max_attempts: i32) -> AppResult<User>;

    /// Permanently delete a user. Fails with `NotFound`.
    async fn delete(&self, id: Uuid) -> AppResult<()>;

    /// List users ordered by creation time
    async fn list(&self, offset: u64, limit: u64) -> AppResult<Vec<User>>;

    /// Count all users
    async fn count(&self) -> AppResult<u64>;
}

/// Concrete implementation of UserRepository
pub struct UserStore {
    db: DatabaseConnection,
}

impl UserStore {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

/// Translate unique-index violations into domain conflicts.
fn map_write_error(err: DbErr) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(detail)) => {
            if detail.contains("email") {
                AppError::DuplicateEmail
            } else {
                AppError::conflict("Nickname")
            }
        }
        _ => AppError::from(err),
    }
}

#[async_trait]
impl UserRepository for UserStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        let result = UserEntity::find_by_id(id).one(&self.db).await?;
        Ok(result.map(User::from))
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let result = UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await?;

        Ok(result.map(User::from))
    }

    async fn find_by_nickname(&self, nickname: &str) -> AppResult<Option<User>> {
        let result = UserEntity::find()
            .filter(user::Column::Nickname.eq(nickname))
            .one(&self.db)
            .await?;

        Ok(result.map(User::from))
    }

    async fn create(&self, new_user: NewUser) -> AppResult<User> {
        let now = Utc::now();
        let active_model = ActiveModel {
            id: Set(Uuid::new_v4()),
            nickname: Set(new_user.nickname),
            email: Set(new_user.email),
            password_hash: Set(new_user.password_hash),
            role: Set(new_user.role.to_string()),
            email_verified: Set(new_user.email_verified),
            first_name: Set(None),
            last_name: Set(None),
            bio: Set(None),
            profile_picture_url: Set(None),
            linkedin_profile_url: Set(None),
            github_profile_url: Set(None),
            failed_login_attempts: Set(0),
            is_locked: Set(false),
            last_login_at: Set(None),
            is_professional: Set(false),
            professional_status_updated_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = active_model.insert(&self.db).await.map_err(map_write_error)?;
        Ok(User::from(model))
    }

    async fn update(&self, id: Uuid, changes: UserChanges) -> AppResult<User> {
        let existing = UserEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;

        let mut active: ActiveModel = existing.into();

        if let Some(email) = changes.email {
            active.email = Set(email);
        }
        if let Some(nickname) = changes.nickname {
            active.nickname = Set(nickname);
        }
        if let Some(password_hash) = changes.password_hash {
            active.password_hash = Set(password_hash);
        }
        if let Some(role) = changes.role {
            active.role = Set(role.to_string());
        }
        if let Some(verified) = changes.email_verified {
            active.email_verified = Set(verified);
        }
        if let Some(first_name) = changes.first_name {
            active.first_name = Set(Some(first_name));
        }
        if let Some(last_name) = changes.last_name {
            active.last_name = Set(Some(last_name));
        }
        if let Some(bio) = changes.bio {
            active.bio = Set(Some(bio));
        }
        if let Some(url) = changes.profile_picture_url {
            active.profile_picture_url = Set(Some(url));
        }
        if let Some(url) = changes.linkedin_profile_url {
            active.linkedin_profile_url = Set(Some(url));
        }
        if let Some(url) = changes.github_profile_url {
            active.github_profile_url = Set(Some(url));
        }
        if let Some(attempts) = changes.failed_login_attempts {
            active.failed_login_attempts = Set(attempts);
        }
        if let Some(locked) = changes.is_locked {
            active.is_locked = Set(locked);
        }
        if let Some(at) = changes.last_login_at {
            active.last_login_at = Set(Some(at));
        }
        if let Some(professional) = changes.is_professional {
            active.is_professional = Set(professional);
        }
        if let Some(at) = changes.professional_status_updated_at {
            active.professional_status_updated_at = Set(Some(at));
        }
        active.updated_at = Set(Utc::now());

        let model = active.update(&self.db).await.map_err(|err| match err {
            DbErr::RecordNotUpdated => AppError::NotFound,
            other => map_write_error(other),
        })?;
        Ok(User::from(model))
    }

    async fn confirm_email(&self, id: Uuid, email: &str) -> AppResult<bool> {
        let result = UserEntity::update_many()
            .col_expr(user::Column::EmailVerified, Expr::value(true))
            .col_expr(user::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(user::Column::Id.eq(id))
            .filter(user::Column::Email.eq(email))
            .exec(&self.db)
            .await?;

        Ok(result.rows_affected == 1)
    }

    async fn record_failed_login(&self, id: Uuid, max_attempts: i32) -> AppResult<User> {
        let counted = UserEntity::update_many()
            .col_expr(
                user::Column::FailedLoginAttempts,
                Expr::col(user::Column::FailedLoginAttempts).add(1),
            )
            .col_expr(user::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(user::Column::Id.eq(id))
            .exec(&self.db)
            .await?;
        if counted.rows_affected == 0 {
            return Err(AppError::NotFound);
        }

        // Conditional on the stored counter, so racing failures cannot skip it
        UserEntity::update_many()
            .col_expr(user::Column::IsLocked, Expr::value(true))
            .filter(user::Column::Id.eq(id))
            .filter(user::Column::FailedLoginAttempts.gte(max_attempts))
            .exec(&self.db)
            .await?;

        self.find_by_id(id).await?.ok_or(AppError::NotFound)
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = UserEntity::delete_by_id(id).exec(&self.db).await?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }

        Ok(())
    }

    async fn list(&self, offset: u64, limit: u64) -> AppResult<Vec<User>> {
        let models = UserEntity::find()
            .order_by_asc(user::Column::CreatedAt)
            .order_by_asc(user::Column::Id)
            .offset(offset)
            .limit(limit)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(User::from).collect())
    }

    async fn count(&self) -> AppResult<u64> {
        Ok(UserEntity::find().count(&self.db).await?)
    }
}
