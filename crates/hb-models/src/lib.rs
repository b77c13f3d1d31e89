//! # hb-models
//!
//! Domain models for Hourbook.
//!
//! Each model mirrors one table of the data store and implements the core traits from
//! `hb-core` (Entity, Identifiable, Timestamped).

pub use hb_core::traits::{Entity, Id, Identifiable, ProjectScoped, Timestamped};

pub mod order;
pub mod project;
pub mod role;
pub mod time_entry;
pub mod user;
pub mod work_item;

pub use order::Order;
pub use project::Project;
pub use role::{Permission, Role};
pub use time_entry::{NewTimeEntry, TimeEntry};
pub use user::User;
pub use work_item::WorkItem;
