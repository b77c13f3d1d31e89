//! Field rules shared by several contracts

use hb_core::error::ValidationErrors;
use regex::Regex;
use std::sync::LazyLock;

/// Letters, digits, spaces, dashes and underscores
static PROJECT_NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^[a-z0-9 \-_]+$").unwrap());

/// Letters and spaces
static USER_NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^[a-z ]+$").unwrap());

/// A single-value rule
pub trait Rule {
    fn passes(&self, value: &str) -> bool;

    fn message(&self) -> &'static str;

    /// Record the rule's message under `field` when `value` fails
    fn check(&self, field: &str, value: &str, errors: &mut ValidationErrors) {
        if !self.passes(value) {
            errors.add(field, self.message());
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ProjectNameRule;

impl Rule for ProjectNameRule {
    fn passes(&self, value: &str) -> bool {
        PROJECT_NAME_PATTERN.is_match(value)
    }

    fn message(&self) -> &'static str {
        "may only contains letters, numbers, spaces, underscores, and dashes."
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct UserNameRule;

impl Rule for UserNameRule {
    fn passes(&self, value: &str) -> bool {
        USER_NAME_PATTERN.is_match(value)
    }

    fn message(&self) -> &'static str {
        "may only contains letters and spaces."
    }
}
