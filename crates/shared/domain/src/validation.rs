//! Field validation rules shared by the service and the HTTP layer.

use url::Url;
use validator::ValidateEmail;

use crate::constants::{
    MAX_BIO_LENGTH, MAX_EMAIL_LENGTH, MAX_NAME_LENGTH, MAX_NICKNAME_LENGTH, MAX_URL_LENGTH,
    MIN_NICKNAME_LENGTH,
};
use crate::error::{DomainError, DomainResult};

/// Trim, lower-case and validate an email address.
pub fn normalize_email(email: &str) -> DomainResult<String> {
    let normalized = email.trim().to_lowercase();
    if normalized.len() > MAX_EMAIL_LENGTH || !normalized.validate_email() {
        return Err(DomainError::validation("Invalid email format"));
    }
    Ok(normalized)
}

/// Nicknames are alphanumeric and 3 to 50 characters long.
pub fn validate_nickname(nickname: &str) -> DomainResult<()> {
    let len = nickname.chars().count();
    if !(MIN_NICKNAME_LENGTH..=MAX_NICKNAME_LENGTH).contains(&len) {
        return Err(DomainError::validation(format!(
            "Nickname must be between {} and {} characters long",
            MIN_NICKNAME_LENGTH, MAX_NICKNAME_LENGTH
        )));
    }
    if !nickname.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(DomainError::validation(
            "Nickname must contain only alphanumeric characters",
        ));
    }
    Ok(())
}

pub fn validate_name(field: &str, value: Option<&str>) -> DomainResult<()> {
    match value {
        Some(v) if v.chars().count() > MAX_NAME_LENGTH => Err(DomainError::validation(format!(
            "{} must be at most {} characters",
            field, MAX_NAME_LENGTH
        ))),
        _ => Ok(()),
    }
}

pub fn validate_bio(value: Option<&str>) -> DomainResult<()> {
    match value {
        Some(v) if v.chars().count() > MAX_BIO_LENGTH => Err(DomainError::validation(format!(
            "bio must be at most {} characters",
            MAX_BIO_LENGTH
        ))),
        _ => Ok(()),
    }
}

/// Profile links must be absolute http(s) URLs with a dotted host.
pub fn validate_profile_url(field: &str, url: &str) -> DomainResult<()> {
    let invalid = || DomainError::validation(format!("{} must be a valid http(s) URL", field));

    // The parser trims surrounding spaces instead of rejecting them
    if url.len() > MAX_URL_LENGTH || url.chars().any(char::is_whitespace) {
        return Err(invalid());
    }
    let parsed = Url::parse(url).map_err(|_| invalid())?;

    // The parser repairs `https:/host`, so the raw text must carry `//` itself
    let scheme_ok = matches!(parsed.scheme(), "http" | "https")
        && url
            .get(..parsed.scheme().len() + 3)
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(&format!("{}://", parsed.scheme())));
    let host_ok = parsed
        .host_str()
        .is_some_and(|host| host.contains('.') && host.split('.').all(|label| !label.is_empty()));

    if !scheme_ok || !host_ok {
        return Err(invalid());
    }
    Ok(())
}
