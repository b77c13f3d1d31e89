//! Core error types for Hourbook

use std::collections::HashMap;
use thiserror::Error;

/// Core error type for all Hourbook operations
#[derive(Error, Debug)]
pub enum HbError {
    #[error("Not found: {entity} with {field}={value}")]
    NotFound {
        entity: &'static str,
        field: &'static str,
        value: String,
    },

    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("{message}")]
    Conflict { message: String },

    #[error("{message}")]
    InUse { message: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Standard Result type for Hourbook operations
pub type HbResult<T> = Result<T, HbError>;

impl HbError {
    pub fn not_found(entity: &'static str, value: impl ToString) -> Self {
        HbError::NotFound {
            entity,
            field: "id",
            value: value.to_string(),
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            HbError::NotFound { .. } => 404,
            HbError::Unauthorized { .. } => 401,
            HbError::Forbidden { .. } => 403,
            HbError::Validation(_) => 422,
            HbError::Conflict { .. } | HbError::InUse { .. } => 409,
            HbError::Database(_) | HbError::Internal(_) | HbError::Config(_) => 500,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            HbError::NotFound { .. } => "not_found",
            HbError::Unauthorized { .. } => "unauthorized",
            HbError::Forbidden { .. } => "forbidden",
            HbError::Validation(_) => "validation_failed",
            HbError::Conflict { .. } => "conflict",
            HbError::InUse { .. } => "in_use",
            HbError::Database(_) => "database_error",
            HbError::Internal(_) => "internal_error",
            HbError::Config(_) => "configuration_error",
        }
    }
}

/// Validation errors collection, keyed by field name
#[derive(Error, Debug, Default, Clone, PartialEq)]
#[error("Validation errors: {errors:?}")]
pub struct ValidationErrors {
    /// Field-specific errors: field_name -> Vec<error_messages>
    pub errors: HashMap<String, Vec<String>>,
    /// Base errors not tied to a specific field
    pub base_errors: Vec<String>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors
            .entry(field.into())
            .or_default()
            .push(message.into());
    }

    pub fn add_base(&mut self, message: impl Into<String>) {
        self.base_errors.push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty() && self.base_errors.is_empty()
    }

    /// Check if there are errors for a specific field
    pub fn has_error(&self, field: &str) -> bool {
        self.errors.contains_key(field)
    }

    pub fn get(&self, field: &str) -> Option<&Vec<String>> {
        self.errors.get(field)
    }

    pub fn merge(&mut self, other: ValidationErrors) {
        for (field, messages) in other.errors {
            self.errors.entry(field).or_default().extend(messages);
        }
        self.base_errors.extend(other.base_errors);
    }

    /// Field errors are rendered as "<field> <message>", sorted by field name
    pub fn full_messages(&self) -> Vec<String> {
        let mut messages = self.base_errors.clone();
        let mut fields: Vec<_> = self.errors.iter().collect();
        fields.sort_by(|a, b| a.0.cmp(b.0));
        for (field, field_messages) in fields {
            for msg in field_messages {
                messages.push(format!("{} {}", field, msg));
            }
        }
        messages
    }

    /// Convert into a `Result`, failing when any error was collected
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}
