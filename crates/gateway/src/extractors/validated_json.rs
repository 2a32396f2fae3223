//! JSON extractor that runs `validator` rules before the handler.

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors};

use common::AppError;

/// Request body that has been deserialized and validated.
///
/// Malformed JSON and rule violations both surface as `400 VALIDATION_ERROR`.
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::validation(rejection.body_text()))?;

        value
            .validate()
            .map_err(|errors| AppError::validation(first_message(&errors)))?;

        Ok(ValidatedJson(value))
    }
}

/// Message of the first failing field, in field name order.
fn first_message(errors: &ValidationErrors) -> String {
    let field_errors = errors.field_errors();
    let mut fields: Vec<_> = field_errors.keys().collect();
    fields.sort();

    fields
        .first()
        .and_then(|field| {
            let error = field_errors.get(*field)?.first()?;
            Some(match &error.message {
                Some(message) => message.to_string(),
                None => format!("{} is invalid", field),
            })
        })
        .unwrap_or_else(|| "Validation failed".to_string())
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Deserialize, Validate)]
    struct SignupForm {
        #[validate(email(message = "Invalid email format"))]
        email: String,
        #[validate(length(min = 3))]
        name: String,
    }

    #[test]
    fn test_first_message_prefers_custom_text() {
        let form = SignupForm {
            email: "nope".into(),
            name: "ok-name".into(),
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(first_message(&errors), "Invalid email format");
    }

    #[test]
    fn test_first_message_falls_back_to_field() {
        let form = SignupForm {
            email: "a@example.com".into(),
            name: "x".into(),
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(first_message(&errors), "name is invalid");
    }
}
