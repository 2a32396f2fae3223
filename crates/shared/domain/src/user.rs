//! User domain entity and related types.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::{ROLE_ADMIN, ROLE_STANDARD};
use crate::error::{DomainError, DomainResult};
use crate::validation;

/// Authorization tier gating endpoint access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Standard,
    Admin,
}

impl UserRole {
    /// Check if this role satisfies a required role
    pub fn can_access(&self, required: UserRole) -> bool {
        match self {
            UserRole::Admin => true,
            UserRole::Standard => matches!(required, UserRole::Standard),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => ROLE_ADMIN,
            UserRole::Standard => ROLE_STANDARD,
        }
    }
}

/// Lenient conversion used when loading stored rows: anything unknown
/// degrades to the least privileged role.
impl From<&str> for UserRole {
    fn from(s: &str) -> Self {
        match s {
            ROLE_ADMIN => UserRole::Admin,
            _ => UserRole::Standard,
        }
    }
}

/// Strict conversion used for client input.
impl FromStr for UserRole {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            ROLE_ADMIN => Ok(UserRole::Admin),
            ROLE_STANDARD => Ok(UserRole::Standard),
            other => Err(DomainError::InvalidRole(other.to_string())),
        }
    }
}

impl From<UserRole> for String {
    fn from(role: UserRole) -> Self {
        role.as_str().to_string()
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User domain entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub nickname: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: UserRole,
    pub email_verified: bool,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
    pub profile_picture_url: Option<String>,
    pub linkedin_profile_url: Option<String>,
    pub github_profile_url: Option<String>,
    pub failed_login_attempts: i32,
    pub is_locked: bool,
    pub last_login_at: Option<DateTime<Utc>>,
    pub is_professional: bool,
    pub professional_status_updated_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Data needed to persist a brand new account.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub nickname: String,
    pub role: UserRole,
    pub email_verified: bool,
}

/// Partial update applied by the credential store.
///
/// `None` leaves a column untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserChanges {
    pub email: Option<String>,
    pub nickname: Option<String>,
    pub password_hash: Option<String>,
    pub role: Option<UserRole>,
    pub email_verified: Option<bool>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
    pub profile_picture_url: Option<String>,
    pub linkedin_profile_url: Option<String>,
    pub github_profile_url: Option<String>,
    pub failed_login_attempts: Option<i32>,
    pub is_locked: Option<bool>,
    pub last_login_at: Option<DateTime<Utc>>,
    pub is_professional: Option<bool>,
    pub professional_status_updated_at: Option<DateTime<Utc>>,
}

impl UserChanges {
    /// Set the professional flag and stamp when it changed.
    pub fn professional_status(status: bool, at: DateTime<Utc>) -> Self {
        Self {
            is_professional: Some(status),
            professional_status_updated_at: Some(at),
            ..Self::default()
        }
    }
}

/// Self-service profile update submitted by the account owner.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileUpdate {
    pub email: Option<String>,
    pub nickname: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
    pub profile_picture_url: Option<String>,
    pub linkedin_profile_url: Option<String>,
    pub github_profile_url: Option<String>,
}

impl ProfileUpdate {
    /// Validate every provided field and normalize the email.
    ///
    /// An update that sets nothing is rejected.
    pub fn validate(mut self) -> DomainResult<Self> {
        if self.is_empty() {
            return Err(DomainError::validation(
                "At least one field must be provided for update",
            ));
        }

        if let Some(email) = self.email.take() {
            self.email = Some(validation::normalize_email(&email)?);
        }
        if let Some(nickname) = &self.nickname {
            validation::validate_nickname(nickname)?;
        }
        validation::validate_name("first_name", self.first_name.as_deref())?;
        validation::validate_name("last_name", self.last_name.as_deref())?;
        validation::validate_bio(self.bio.as_deref())?;
        for (field, url) in [
            ("profile_picture_url", &self.profile_picture_url),
            ("linkedin_profile_url", &self.linkedin_profile_url),
            ("github_profile_url", &self.github_profile_url),
        ] {
            if let Some(url) = url {
                validation::validate_profile_url(field, url)?;
            }
        }

        Ok(self)
    }

    pub fn is_empty(&self) -> bool {
        self.email.is_none()
            && self.nickname.is_none()
            && self.first_name.is_none()
            && self.last_name.is_none()
            && self.bio.is_none()
            && self.profile_picture_url.is_none()
            && self.linkedin_profile_url.is_none()
            && self.github_profile_url.is_none()
    }

    /// Profile columns of this update (email handled separately by the caller).
    pub fn into_changes(self) -> UserChanges {
        UserChanges {
            nickname: self.nickname,
            first_name: self.first_name,
            last_name: self.last_name,
            bio: self.bio,
            profile_picture_url: self.profile_picture_url,
            linkedin_profile_url: self.linkedin_profile_url,
            github_profile_url: self.github_profile_url,
            ..UserChanges::default()
        }
    }
}

/// User response (safe to return to client)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub nickname: String,
    pub email: String,
    pub role: UserRole,
    pub email_verified: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_picture_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linkedin_profile_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub github_profile_url: Option<String>,
    pub is_locked: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_login_at: Option<DateTime<Utc>>,
    pub is_professional: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub professional_status_updated_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            nickname: user.nickname,
            email: user.email,
            role: user.role,
            email_verified: user.email_verified,
            first_name: user.first_name,
            last_name: user.last_name,
            bio: user.bio,
            profile_picture_url: user.profile_picture_url,
            linkedin_profile_url: user.linkedin_profile_url,
            github_profile_url: user.github_profile_url,
            is_locked: user.is_locked,
            last_login_at: user.last_login_at,
            is_professional: user.is_professional,
            professional_status_updated_at: user.professional_status_updated_at,
            created_at: user.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_access_ordering() {
        assert!(UserRole::Admin.can_access(UserRole::Standard));
        assert!(UserRole::Admin.can_access(UserRole::Admin));
        assert!(UserRole::Standard.can_access(UserRole::Standard));
        assert!(!UserRole::Standard.can_access(UserRole::Admin));
    }

    #[test]
    fn test_role_parsing() {
        assert_eq!("admin".parse::<UserRole>().unwrap(), UserRole::Admin);
        assert_eq!("standard".parse::<UserRole>().unwrap(), UserRole::Standard);
        assert!(matches!(
            "root".parse::<UserRole>(),
            Err(DomainError::InvalidRole(_))
        ));
        // Stored garbage degrades to the least privileged role
        assert_eq!(UserRole::from("root"), UserRole::Standard);
        assert_eq!(UserRole::Admin.to_string(), "admin");
    }

    #[test]
    fn test_profile_update_requires_a_field() {
        let err = ProfileUpdate::default().validate().unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn test_profile_update_valid() {
        let update = ProfileUpdate {
            email: Some("  New.Email@Example.com ".to_string()),
            nickname: Some("NewNickname".to_string()),
            bio: Some("Updated bio".to_string()),
            ..ProfileUpdate::default()
        }
        .validate()
        .unwrap();

        assert_eq!(update.email.as_deref(), Some("new.email@example.com"));
        assert_eq!(update.nickname.as_deref(), Some("NewNickname"));
        assert_eq!(update.bio.as_deref(), Some("Updated bio"));
    }

    #[test]
    fn test_profile_update_rejects_bad_urls() {
        for url in ["htp://example", "www.example.com", "https:/example.com"] {
            let update = ProfileUpdate {
                profile_picture_url: Some(url.to_string()),
                ..ProfileUpdate::default()
            };
            assert!(update.validate().is_err(), "{url}");
        }
    }

    #[test]
    fn test_into_changes_leaves_email_out() {
        let changes = ProfileUpdate {
            email: Some("a@x.com".to_string()),
            first_name: Some("Ada".to_string()),
            ..ProfileUpdate::default()
        }
        .into_changes();

        assert!(changes.email.is_none());
        assert_eq!(changes.first_name.as_deref(), Some("Ada"));
        assert_ne!(changes, UserChanges::default());
    }

    #[test]
    fn test_professional_status_changes() {
        let at = Utc::now();
        let changes = UserChanges::professional_status(true, at);

        assert_eq!(changes.is_professional, Some(true));
        assert_eq!(changes.professional_status_updated_at, Some(at));
        assert!(changes.email_verified.is_none());
    }
}
