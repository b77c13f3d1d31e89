//! # hb-api
//!
//! HTTP API for Hourbook.
//!
//! JSON endpoints over axum for the dashboard, project access, charts, summaries, the project
//! log, rebates, and user roles. Every handler works against a shared `Store` and an
//! `EmailSender`, both held by `AppState`.

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod routes;

pub use error::{ApiError, ApiResult};
pub use extractors::{ApiConfig, AppState, AuthenticatedUser, USER_ID_HEADER};
pub use routes::router;
