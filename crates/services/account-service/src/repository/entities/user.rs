//! User database entity for SeaORM.

use sea_orm::entity::prelude::*;

use domain::{User, UserRole};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub nickname: String,
    #[sea_orm(unique)]
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub email_verified: bool,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
    pub profile_picture_url: Option<String>,
    pub linkedin_profile_url: Option<String>,
    pub github_profile_url: Option<String>,
    pub failed_login_attempts: i32,
    pub is_locked: bool,
    pub last_login_at: Option<DateTimeUtc>,
    pub is_professional: bool,
    pub professional_status_updated_at: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Convert database model to domain entity
impl From<Model> for User {
    fn from(model: Model) -> Self {
        User {
            id: model.id,
            nickname: model.nickname,
            email: model.email,
            password_hash: model.password_hash,
            role: UserRole::from(model.role.as_str()),
            email_verified: model.email_verified,
            first_name: model.first_name,
            last_name: model.last_name,
            bio: model.bio,
            profile_picture_url: model.profile_picture_url,
            linkedin_profile_url: model.linkedin_profile_url,
            github_profile_url: model.github_profile_url,
            failed_login_attempts: model.failed_login_attempts,
            is_locked: model.is_locked,
            last_login_at: model.last_login_at,
            is_professional: model.is_professional,
            professional_status_updated_at: model.professional_status_updated_at,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
