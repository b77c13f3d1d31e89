//! User contract

use hb_core::error::ValidationErrors;
use hb_models::User;

use crate::base::{validate_derived, Contract, ValidationResult};
use crate::rules::{Rule, UserNameRule};

/// Validates user attributes: the derived model rules plus the name rule
#[derive(Debug, Default)]
pub struct UserContract;

impl UserContract {
    pub fn new() -> Self {
        Self
    }
}

impl Contract<User> for UserContract {
    fn validate(&self, entity: &User) -> ValidationResult {
        let mut errors = match validate_derived(entity) {
            Ok(()) => ValidationErrors::new(),
            Err(errors) => errors,
        };

        if !entity.first_name.is_empty() {
            UserNameRule.check("first_name", &entity.first_name, &mut errors);
        }
        if !entity.last_name.is_empty() {
            UserNameRule.check("last_name", &entity.last_name, &mut errors);
        }

        errors.into_result()
    }
}
