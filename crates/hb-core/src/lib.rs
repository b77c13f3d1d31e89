//! # hb-core
//!
//! Core types, traits, and utilities for Hourbook.
//!
//! This crate provides the foundational building blocks used across all other crates:
//! - Common error types and the `HbResult` alias
//! - Core traits (Entity, Identifiable, Timestamped)
//! - Date range and chart policy types
//! - Configuration types

pub mod config;
pub mod error;
pub mod traits;
pub mod types;

pub use error::*;
pub use traits::*;
pub use types::*;
