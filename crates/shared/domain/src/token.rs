//! Token purposes.

use serde::{Deserialize, Serialize};

/// What a signed token may be used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenPurpose {
    Access,
    EmailVerification,
    PasswordReset,
}

impl TokenPurpose {
    /// One-time tokens are valid for exactly one successful redemption.
    pub fn is_one_time(&self) -> bool {
        !matches!(self, TokenPurpose::Access)
    }
}

impl std::fmt::Display for TokenPurpose {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TokenPurpose::Access => "access",
            TokenPurpose::EmailVerification => "email_verification",
            TokenPurpose::PasswordReset => "password_reset",
        };
        f.write_str(name)
    }
}
