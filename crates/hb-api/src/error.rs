//! API error handling
//!
//! Every failure leaves the API as a JSON body `{ "_type": "Error", "errorIdentifier", "message" }`.

use std::collections::HashMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use hb_core::error::{HbError, ValidationErrors};
use hb_db::RepositoryError;
use hb_notifications::EmailError;
use serde::Serialize;

/// API error types
#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    Validation(ValidationErrors),
    Unauthorized(String),
    Forbidden(String),
    BadRequest(String),
    Conflict(String),
    Internal(String),
}

impl ApiError {
    pub fn not_found(resource: &'static str, id: impl std::fmt::Display) -> Self {
        ApiError::NotFound(format!("{} with id {} not found", resource, id))
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        ApiError::Unauthorized(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        ApiError::Forbidden(msg.into())
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        ApiError::BadRequest(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        ApiError::Internal(msg.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn identifier(&self) -> &'static str {
        match self {
            ApiError::NotFound(_) => "urn:hourbook:api:errors:NotFound",
            ApiError::Validation(_) => "urn:hourbook:api:errors:PropertyConstraintViolation",
            ApiError::Unauthorized(_) => "urn:hourbook:api:errors:Unauthenticated",
            ApiError::Forbidden(_) => "urn:hourbook:api:errors:MissingPermission",
            ApiError::BadRequest(_) => "urn:hourbook:api:errors:InvalidRequestBody",
            ApiError::Conflict(_) => "urn:hourbook:api:errors:Conflict",
            ApiError::Internal(_) => "urn:hourbook:api:errors:InternalError",
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    #[serde(rename = "_type")]
    type_name: &'static str,
    #[serde(rename = "errorIdentifier")]
    error_identifier: &'static str,
    message: String,
    /// Field errors, only for validation failures
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<HashMap<String, Vec<String>>>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_identifier = self.identifier();
        let (message, errors) = match self {
            ApiError::Validation(errors) => (errors.full_messages().join(", "), Some(errors.errors)),
            ApiError::NotFound(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::Forbidden(msg)
            | ApiError::BadRequest(msg)
            | ApiError::Conflict(msg)
            | ApiError::Internal(msg) => (msg, None),
        };

        let body = ErrorBody {
            type_name: "Error",
            error_identifier,
            message,
            errors,
        };
        (status, Json(body)).into_response()
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        ApiError::Validation(errors)
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound(what) => ApiError::NotFound(what),
            RepositoryError::Conflict(msg) | RepositoryError::InUse(msg) => ApiError::Conflict(msg),
            RepositoryError::Database(e) => {
                tracing::error!(error = %e, "Database error");
                ApiError::internal("A database error occurred")
            }
        }
    }
}

impl From<HbError> for ApiError {
    fn from(err: HbError) -> Self {
        match err {
            HbError::NotFound { .. } => ApiError::NotFound(err.to_string()),
            HbError::Unauthorized { message } => ApiError::Unauthorized(message),
            HbError::Forbidden { message } => ApiError::Forbidden(message),
            HbError::Validation(errors) => ApiError::Validation(errors),
            HbError::Conflict { message } | HbError::InUse { message } => ApiError::Conflict(message),
            HbError::Database(_) | HbError::Internal(_) | HbError::Config(_) => {
                tracing::error!(error = %err, "Internal error");
                ApiError::internal("An internal error occurred")
            }
        }
    }
}

impl From<EmailError> for ApiError {
    fn from(err: EmailError) -> Self {
        match err {
            EmailError::InvalidRecipient(_) | EmailError::NoRecipients => {
                ApiError::bad_request(err.to_string())
            }
            EmailError::SendFailed(_) => {
                tracing::error!(error = %err, "Email delivery failed");
                ApiError::internal("The email could not be sent")
            }
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use hb_db::{DUPLICATE_MESSAGE, IN_USE_MESSAGE};

    #[test]
    fn test_integrity_errors_are_conflicts() {
        let err = ApiError::from(RepositoryError::Conflict(DUPLICATE_MESSAGE.to_string()));
        assert_eq!(err.status_code(), StatusCode::CONFLICT);

        let err = ApiError::from(RepositoryError::InUse(IN_USE_MESSAGE.to_string()));
        assert!(matches!(&err, ApiError::Conflict(m) if m == IN_USE_MESSAGE));
    }

    #[test]
    fn test_hb_error_mapping() {
        let err = ApiError::from(HbError::not_found("Project", 3));
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);

        let err = ApiError::from(HbError::Database("connection reset".into()));
        assert!(matches!(&err, ApiError::Internal(m) if !m.contains("connection")));
    }

    #[test]
    fn test_email_error_mapping() {
        assert_eq!(
            ApiError::from(EmailError::NoRecipients).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(EmailError::SendFailed("smtp down".into())).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_validation_body() {
        let mut errors = ValidationErrors::new();
        errors.add("start", "is required");

        let response = ApiError::from(errors).into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["_type"], "Error");
        assert_eq!(body["message"], "start is required");
        assert_eq!(body["errors"]["start"][0], "is required");
    }
}
