//! API request handlers

pub mod dashboard;
pub mod projects;
pub mod summary;
pub mod time_entries;
pub mod users;
