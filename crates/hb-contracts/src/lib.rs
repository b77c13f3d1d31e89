//! # hb-contracts
//!
//! Input validation for Hourbook.
//!
//! Contracts validate entities and request payloads before they reach a store or a report.
//! Failures are collected into `hb_core::ValidationErrors`, keyed by field.

pub mod base;
pub mod projects;
pub mod rules;
pub mod summary;
pub mod users;

pub use base::*;
pub use projects::ProjectContract;
pub use rules::{ProjectNameRule, Rule, UserNameRule};
pub use summary::{
    parse_date, EmailProjectSummaryInput, EmailProjectSummaryRequest, ViewProjectSummaryRequest,
    DEFAULT_SUMMARY_DAYS,
};
pub use users::UserContract;
