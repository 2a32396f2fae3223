//! Domain-level constants.
//!
//! These constants define business rules and validation requirements.

// =============================================================================
// User Roles
// =============================================================================

/// Default role assigned to new users
pub const ROLE_STANDARD: &str = "standard";

/// Administrator role with elevated privileges
pub const ROLE_ADMIN: &str = "admin";

// =============================================================================
// Validation
// =============================================================================

/// Minimum password length requirement
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Characters accepted as the "special" class of the password policy
pub const PASSWORD_SPECIAL_CHARS: &str = "!@#$%^&*()_+-=";

/// Nickname length bounds (inclusive)
pub const MIN_NICKNAME_LENGTH: usize = 3;
pub const MAX_NICKNAME_LENGTH: usize = 50;

/// Maximum email length stored
pub const MAX_EMAIL_LENGTH: usize = 255;

/// Profile field limits
pub const MAX_NAME_LENGTH: usize = 100;
pub const MAX_BIO_LENGTH: usize = 500;
pub const MAX_URL_LENGTH: usize = 255;

// =============================================================================
// Authentication
// =============================================================================

/// Default access token expiration in hours
pub const DEFAULT_JWT_EXPIRATION_HOURS: i64 = 24;

/// Default email verification token expiration in hours
pub const DEFAULT_VERIFICATION_TOKEN_EXPIRATION_HOURS: i64 = 24;

/// Default password reset token expiration in minutes
pub const DEFAULT_RESET_TOKEN_EXPIRATION_MINUTES: i64 = 60;

/// Consecutive failed logins before an account is locked
pub const DEFAULT_MAX_LOGIN_ATTEMPTS: i32 = 5;

/// Minimum JWT secret length (security requirement)
pub const MIN_JWT_SECRET_LENGTH: usize = 32;

/// Authorization header prefix for Bearer tokens
pub const BEARER_TOKEN_PREFIX: &str = "Bearer ";

/// JWT token type identifier
pub const TOKEN_TYPE_BEARER: &str = "Bearer";
