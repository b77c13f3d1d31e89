//! # hb-db
//!
//! Data store for Hourbook.
//!
//! - Connection pool management (`Database`)
//! - One repository trait per entity, bundled by `Store`
//! - A PostgreSQL implementation on `Database` and an in-memory `MemoryStore`
//! - Translation of integrity violations into client-safe errors
//!
//! ## Example
//!
//! ```ignore
//! use hb_core::config::AppConfig;
//! use hb_db::{Database, ProjectRepository};
//!
//! let config = AppConfig::from_env()?;
//! let db = Database::connect(&config.database).await?;
//! db.migrate().await?;
//!
//! let project = db.find_project(1).await?;
//! ```

pub mod memory;
pub mod orders;
pub mod pool;
pub mod projects;
pub mod repository;
pub mod time_entries;
pub mod users;
pub mod work_items;

pub use memory::MemoryStore;
pub use pool::{Database, PoolStats};
pub use repository::{
    CreateOrderDto, CreateProjectDto, CreateUserDto, CreateWorkItemDto, OrderRepository,
    ProjectRepository, RepositoryError, RepositoryResult, Store, TimeEntryRepository,
    UserRepository, WorkItemRepository, DUPLICATE_MESSAGE, IN_USE_MESSAGE,
};
