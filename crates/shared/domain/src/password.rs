//! Password value object.
//!
//! Owns the strength policy and the Argon2id hashing configuration so that
//! no other layer ever handles a plaintext password beyond passing it in.

use std::sync::OnceLock;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::constants::{MIN_PASSWORD_LENGTH, PASSWORD_SPECIAL_CHARS};
use crate::error::{DomainError, DomainResult};

/// Hashed password. The plaintext is never stored.
#[derive(Clone)]
pub struct Password {
    hash: String,
}

impl std::fmt::Debug for Password {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Password")
            .field("hash", &"[REDACTED]")
            .finish()
    }
}

impl Password {
    /// Validate `plain_text` against the strength policy and hash it.
    ///
    /// # Errors
    /// Returns [`DomainError::Password`] naming the first rule that failed.
    pub fn new(plain_text: &str) -> DomainResult<Self> {
        Self::check_strength(plain_text)?;
        let hash = Self::hash(plain_text)?;
        Ok(Self { hash })
    }

    /// Wrap a hash loaded from storage.
    pub fn from_hash(hash: impl Into<String>) -> Self {
        Self { hash: hash.into() }
    }

    /// A real Argon2 hash of a random secret, computed once.
    ///
    /// Login verifies against it when the account does not exist so that
    /// unknown and known emails cost the same amount of work.
    pub fn dummy() -> Self {
        static DUMMY: OnceLock<String> = OnceLock::new();
        let hash = DUMMY.get_or_init(|| {
            let secret = uuid::Uuid::new_v4().to_string();
            Self::hash(&secret).unwrap_or_default()
        });
        Self::from_hash(hash.clone())
    }

    /// Strength policy: minimum length plus upper, lower, digit and special.
    pub fn check_strength(plain_text: &str) -> DomainResult<()> {
        if plain_text.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(DomainError::password(format!(
                "Password must be at least {} characters long",
                MIN_PASSWORD_LENGTH
            )));
        }
        if !plain_text.chars().any(|c| c.is_uppercase()) {
            return Err(DomainError::password(
                "Password must contain at least one uppercase letter",
            ));
        }
        if !plain_text.chars().any(|c| c.is_lowercase()) {
            return Err(DomainError::password(
                "Password must contain at least one lowercase letter",
            ));
        }
        if !plain_text.chars().any(|c| c.is_ascii_digit()) {
            return Err(DomainError::password(
                "Password must contain at least one digit",
            ));
        }
        if !plain_text.chars().any(|c| PASSWORD_SPECIAL_CHARS.contains(c)) {
            return Err(DomainError::password(format!(
                "Password must contain at least one special character ({})",
                PASSWORD_SPECIAL_CHARS
            )));
        }
        Ok(())
    }

    pub fn as_str(&self) -> &str {
        &self.hash
    }

    pub fn into_string(self) -> String {
        self.hash
    }

    /// Verify a plain text password against this hash.
    pub fn verify(&self, plain_text: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(&self.hash) else {
            return false;
        };
        Self::argon2()
            .verify_password(plain_text.as_bytes(), &parsed)
            .is_ok()
    }

    fn hash(plain_text: &str) -> DomainResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Self::argon2()
            .hash_password(plain_text.as_bytes(), &salt)
            .map_err(|e| DomainError::internal(format!("Password hash failed: {}", e)))?;
        Ok(hash.to_string())
    }

    #[inline]
    fn argon2() -> Argon2<'static> {
        Argon2::default()
    }
}

impl From<Password> for String {
    fn from(password: Password) -> Self {
        password.hash
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash_and_verify() {
        let plain = "SecurePassword123!";
        let password = Password::new(plain).unwrap();

        assert_ne!(password.as_str(), plain);
        assert!(password.verify(plain));
        assert!(!password.verify("WrongPassword123!"));
    }

    #[test]
    fn test_password_from_hash() {
        let plain = "Passw0rd!";
        let hash = Password::new(plain).unwrap().into_string();

        let restored = Password::from_hash(hash);
        assert!(restored.verify(plain));
    }

    #[test]
    fn test_same_password_different_salts() {
        let plain = "SamePassword123!";
        let pass1 = Password::new(plain).unwrap();
        let pass2 = Password::new(plain).unwrap();

        assert_ne!(pass1.as_str(), pass2.as_str());
        assert!(pass1.verify(plain));
        assert!(pass2.verify(plain));
    }

    #[test]
    fn test_valid_password() {
        assert!(Password::check_strength("Strong*Password123").is_ok());
    }

    #[test]
    fn test_invalid_passwords() {
        for invalid in [
            "short",
            "alllowercase123!",
            "ALLUPPERCASE123!",
            "NoSpecial123",
            "NoNumbers!",
        ] {
            let err = Password::check_strength(invalid).unwrap_err();
            assert!(matches!(err, DomainError::Password(_)), "{invalid}");
        }
    }

    #[test]
    fn test_dummy_never_verifies_guesses() {
        let dummy = Password::dummy();
        assert!(!dummy.verify("Passw0rd!"));
        assert!(!dummy.verify(""));
    }

    #[test]
    fn test_garbage_hash_does_not_verify() {
        assert!(!Password::from_hash("not-a-phc-string").verify("Passw0rd!"));
    }
}
