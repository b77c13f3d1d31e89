//! Repository traits
//!
//! Every entity gets a small async trait describing the predicates the rest of the system
//! queries by. `Database` and `MemoryStore` both implement all of them, and `Store` bundles
//! them so callers can hold one `Arc<dyn Store>`.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use hb_core::error::HbError;
use hb_core::traits::Id;
use hb_core::types::DateRange;
use hb_models::{NewTimeEntry, Order, Project, Role, TimeEntry, User, WorkItem};

/// Client-facing message for a duplicate-key violation
pub const DUPLICATE_MESSAGE: &str = "Another item like this already exist.";

/// Client-facing message for a foreign-key restriction
pub const IN_USE_MESSAGE: &str = "This item is in use.";

/// Error type for repository operations
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    InUse(String),

    #[error("Database error: {0}")]
    Database(sqlx::Error),
}

/// Result type for repository operations
pub type RepositoryResult<T> = Result<T, RepositoryError>;

impl From<sqlx::Error> for RepositoryError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                return RepositoryError::Conflict(DUPLICATE_MESSAGE.to_string());
            }
            if db_err.is_foreign_key_violation() {
                return RepositoryError::InUse(IN_USE_MESSAGE.to_string());
            }
        }
        RepositoryError::Database(err)
    }
}

impl From<RepositoryError> for HbError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound(what) => HbError::NotFound {
                entity: "Record",
                field: "id",
                value: what,
            },
            RepositoryError::Conflict(message) => HbError::Conflict { message },
            RepositoryError::InUse(message) => HbError::InUse { message },
            RepositoryError::Database(e) => HbError::Database(e.to_string()),
        }
    }
}

/// DTO for creating a user
#[derive(Debug, Clone)]
pub struct CreateUserDto {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: Option<Role>,
}

/// DTO for creating a project
#[derive(Debug, Clone)]
pub struct CreateProjectDto {
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub customer_id: Id,
    pub project_manager_id: Id,
    /// Normally `None` (the store stamps the row); set by fixtures that need a fixed order
    pub created_at: Option<DateTime<Utc>>,
}

/// DTO for creating a work item
#[derive(Debug, Clone)]
pub struct CreateWorkItemDto {
    pub project_id: Id,
    pub owner_id: Id,
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub ticket_data: Option<serde_json::Value>,
}

/// DTO for creating an order
#[derive(Debug, Clone)]
pub struct CreateOrderDto {
    pub project_id: Option<Id>,
    pub reference_number: Option<String>,
    pub email: String,
    pub hours: f64,
    pub date: DateTime<Utc>,
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_user(&self, id: Id) -> RepositoryResult<Option<User>>;

    /// Every user, ordered by id
    async fn all_users(&self) -> RepositoryResult<Vec<User>>;

    async fn create_user(&self, dto: CreateUserDto) -> RepositoryResult<User>;

    /// Replace the user's role set with `role`
    async fn set_role(&self, user_id: Id, role: Role) -> RepositoryResult<()>;
}

#[async_trait]
pub trait ProjectRepository: Send + Sync {
    async fn find_project(&self, id: Id) -> RepositoryResult<Option<Project>>;

    /// Every project, or only the active ones
    async fn all_projects(&self, include_inactive: bool) -> RepositoryResult<Vec<Project>>;

    /// Projects whose manager is `user_id`
    async fn projects_managed_by(
        &self,
        user_id: Id,
        include_inactive: bool,
    ) -> RepositoryResult<Vec<Project>>;

    /// Projects `user_id` is attached to as a project user
    async fn projects_attached_to(
        &self,
        user_id: Id,
        include_inactive: bool,
    ) -> RepositoryResult<Vec<Project>>;

    /// Projects holding a work item owned by `user_id`
    async fn projects_with_owned_work_items(
        &self,
        user_id: Id,
        include_inactive: bool,
    ) -> RepositoryResult<Vec<Project>>;

    /// Projects holding a work item `user_id` is assigned to
    async fn projects_with_assigned_work_items(
        &self,
        user_id: Id,
        include_inactive: bool,
    ) -> RepositoryResult<Vec<Project>>;

    /// Ids of the users attached to the project
    async fn project_user_ids(&self, project_id: Id) -> RepositoryResult<Vec<Id>>;

    async fn create_project(&self, dto: CreateProjectDto) -> RepositoryResult<Project>;

    async fn attach_user(&self, project_id: Id, user_id: Id) -> RepositoryResult<()>;

    async fn delete_project(&self, id: Id) -> RepositoryResult<()>;
}

#[async_trait]
pub trait WorkItemRepository: Send + Sync {
    async fn find_work_item(&self, id: Id) -> RepositoryResult<Option<WorkItem>>;

    /// Work items of a project, ordered by id
    async fn work_items_for_project(&self, project_id: Id) -> RepositoryResult<Vec<WorkItem>>;

    async fn create_work_item(&self, dto: CreateWorkItemDto) -> RepositoryResult<WorkItem>;

    async fn assign_user(&self, work_item_id: Id, user_id: Id) -> RepositoryResult<()>;
}

#[async_trait]
pub trait TimeEntryRepository: Send + Sync {
    async fn find_time_entry(&self, id: Id) -> RepositoryResult<Option<TimeEntry>>;

    /// Every time entry of the project, through its work items
    async fn time_entries_for_project(&self, project_id: Id) -> RepositoryResult<Vec<TimeEntry>>;

    /// Entries of the project dated within `range` (inclusive), ordered by date ascending
    async fn time_entries_between(
        &self,
        project_id: Id,
        range: DateRange,
    ) -> RepositoryResult<Vec<TimeEntry>>;

    async fn create_time_entry(&self, entry: NewTimeEntry) -> RepositoryResult<TimeEntry>;
}

#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn orders_for_project(&self, project_id: Id) -> RepositoryResult<Vec<Order>>;

    async fn create_order(&self, dto: CreateOrderDto) -> RepositoryResult<Order>;
}

/// The whole data store
pub trait Store:
    UserRepository + ProjectRepository + WorkItemRepository + TimeEntryRepository + OrderRepository
{
}

impl<T> Store for T where
    T: UserRepository
        + ProjectRepository
        + WorkItemRepository
        + TimeEntryRepository
        + OrderRepository
{
}
