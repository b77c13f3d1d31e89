//! Base contract system

use hb_core::error::ValidationErrors;

/// Result of contract validation
pub type ValidationResult = Result<(), ValidationErrors>;

/// Base contract trait
pub trait Contract<T>: Send + Sync {
    /// Validate the entity
    fn validate(&self, entity: &T) -> ValidationResult;
}

/// Collect the field errors produced by a `validator` derive into our error collection.
///
/// Errors without a message fall back to their code.
pub fn from_validator(source: &validator::ValidationErrors) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    for (field, field_errors) in source.field_errors() {
        for error in field_errors {
            let message = error
                .message
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_else(|| format!("is invalid ({})", error.code));
            errors.add(field, message);
        }
    }
    errors
}

/// Run the derived validations of `value`, converting failures
pub fn validate_derived<T: validator::Validate>(value: &T) -> ValidationResult {
    value.validate().map_err(|e| from_validator(&e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Payload {
        #[validate(email)]
        email: String,
        #[validate(length(min = 1, message = "can't be blank"))]
        name: String,
    }

    #[test]
    fn test_validate_derived_maps_fields() {
        let payload = Payload {
            email: "nope".to_string(),
            name: String::new(),
        };

        let errors = validate_derived(&payload).unwrap_err();
        assert!(errors.has_error("email"));
        assert_eq!(errors.get("name"), Some(&vec!["can't be blank".to_string()]));
    }

    #[test]
    fn test_validate_derived_ok() {
        let payload = Payload {
            email: "ok@example.com".to_string(),
            name: "x".to_string(),
        };
        assert!(validate_derived(&payload).is_ok());
    }
}
