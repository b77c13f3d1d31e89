//! # hb-auth
//!
//! Authorization for Hourbook.
//!
//! ## Features
//!
//! - Static role to permission table
//! - `CurrentUser`, the authenticated user with its resolved permissions
//! - `ProjectVisibility`, which decides the projects a user may see and access

pub mod permissions;
pub mod visibility;

pub use permissions::{permissions_for, role_table, CurrentUser, RoleEntry};
pub use visibility::ProjectVisibility;
