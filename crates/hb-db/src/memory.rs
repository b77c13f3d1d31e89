//! In-memory store
//!
//! Implements every repository trait over plain collections behind a `parking_lot::RwLock`.
//! Integrity rules match the SQL schema: unique names and e-mails raise `Conflict`, dangling
//! references and deletes of referenced rows raise `InUse`.

use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use chrono::Utc;
use hb_core::traits::{Id, ProjectScoped};
use hb_core::types::DateRange;
use hb_models::{NewTimeEntry, Order, Project, Role, TimeEntry, User, WorkItem};
use parking_lot::RwLock;

use crate::repository::{
    CreateOrderDto, CreateProjectDto, CreateUserDto, CreateWorkItemDto, OrderRepository,
    ProjectRepository, RepositoryError, RepositoryResult, TimeEntryRepository, UserRepository,
    WorkItemRepository, DUPLICATE_MESSAGE, IN_USE_MESSAGE,
};

#[derive(Debug, Default)]
struct Tables {
    users: BTreeMap<Id, User>,
    projects: BTreeMap<Id, Project>,
    project_users: BTreeSet<(Id, Id)>,
    work_items: BTreeMap<Id, WorkItem>,
    work_item_users: BTreeSet<(Id, Id)>,
    time_entries: BTreeMap<Id, TimeEntry>,
    orders: BTreeMap<Id, Order>,
}

impl Tables {
    fn next_id<T>(map: &BTreeMap<Id, T>) -> Id {
        map.keys().next_back().copied().unwrap_or(0) + 1
    }

    fn projects_where(
        &self,
        include_inactive: bool,
        pred: impl Fn(&Project) -> bool,
    ) -> Vec<Project> {
        self.projects
            .values()
            .filter(|p| p.visible_with(include_inactive) && pred(p))
            .cloned()
            .collect()
    }

    fn project_ids_of_work_items(&self, pred: impl Fn(&WorkItem) -> bool) -> BTreeSet<Id> {
        self.work_items
            .values()
            .filter(|wi| pred(wi))
            .map(|wi| wi.project_id)
            .collect()
    }

    fn require_user(&self, id: Id) -> RepositoryResult<()> {
        if self.users.contains_key(&id) {
            Ok(())
        } else {
            Err(in_use())
        }
    }
}

fn conflict() -> RepositoryError {
    RepositoryError::Conflict(DUPLICATE_MESSAGE.to_string())
}

fn in_use() -> RepositoryError {
    RepositoryError::InUse(IN_USE_MESSAGE.to_string())
}

/// Thread-safe in-memory data store
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a fully-formed user, keeping its id
    pub fn insert_user(&self, user: User) -> User {
        self.tables.write().users.insert(user.id, user.clone());
        user
    }

    /// Insert a fully-formed project, keeping its id and timestamps
    pub fn insert_project(&self, project: Project) -> Project {
        self.tables
            .write()
            .projects
            .insert(project.id, project.clone());
        project
    }

    pub fn insert_work_item(&self, work_item: WorkItem) -> WorkItem {
        self.tables
            .write()
            .work_items
            .insert(work_item.id, work_item.clone());
        work_item
    }

    pub fn insert_time_entry(&self, entry: TimeEntry) -> TimeEntry {
        self.tables
            .write()
            .time_entries
            .insert(entry.id, entry.clone());
        entry
    }

    pub fn insert_order(&self, order: Order) -> Order {
        self.tables.write().orders.insert(order.id, order.clone());
        order
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_user(&self, id: Id) -> RepositoryResult<Option<User>> {
        Ok(self.tables.read().users.get(&id).cloned())
    }

    async fn all_users(&self) -> RepositoryResult<Vec<User>> {
        Ok(self.tables.read().users.values().cloned().collect())
    }

    async fn create_user(&self, dto: CreateUserDto) -> RepositoryResult<User> {
        let mut tables = self.tables.write();
        if tables.users.values().any(|u| u.email == dto.email) {
            return Err(conflict());
        }

        let mut user = User::new(
            Tables::next_id(&tables.users),
            dto.first_name,
            dto.last_name,
            dto.email,
        );
        if let Some(role) = dto.role {
            user = user.with_role(role);
        }
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn set_role(&self, user_id: Id, role: Role) -> RepositoryResult<()> {
        let mut tables = self.tables.write();
        let user = tables
            .users
            .get_mut(&user_id)
            .ok_or_else(|| RepositoryError::NotFound(format!("User {}", user_id)))?;
        user.roles = vec![role];
        user.updated_at = Utc::now();
        Ok(())
    }
}

#[async_trait]
impl ProjectRepository for MemoryStore {
    async fn find_project(&self, id: Id) -> RepositoryResult<Option<Project>> {
        Ok(self.tables.read().projects.get(&id).cloned())
    }

    async fn all_projects(&self, include_inactive: bool) -> RepositoryResult<Vec<Project>> {
        Ok(self.tables.read().projects_where(include_inactive, |_| true))
    }

    async fn projects_managed_by(
        &self,
        user_id: Id,
        include_inactive: bool,
    ) -> RepositoryResult<Vec<Project>> {
        Ok(self
            .tables
            .read()
            .projects_where(include_inactive, |p| p.project_manager_id == user_id))
    }

    async fn projects_attached_to(
        &self,
        user_id: Id,
        include_inactive: bool,
    ) -> RepositoryResult<Vec<Project>> {
        let tables = self.tables.read();
        Ok(tables.projects_where(include_inactive, |p| {
            tables.project_users.contains(&(p.id, user_id))
        }))
    }

    async fn projects_with_owned_work_items(
        &self,
        user_id: Id,
        include_inactive: bool,
    ) -> RepositoryResult<Vec<Project>> {
        let tables = self.tables.read();
        let ids = tables.project_ids_of_work_items(|wi| wi.owner_id == user_id);
        Ok(tables.projects_where(include_inactive, |p| ids.contains(&p.id)))
    }

    async fn projects_with_assigned_work_items(
        &self,
        user_id: Id,
        include_inactive: bool,
    ) -> RepositoryResult<Vec<Project>> {
        let tables = self.tables.read();
        let ids = tables.project_ids_of_work_items(|wi| {
            tables.work_item_users.contains(&(wi.id, user_id))
        });
        Ok(tables.projects_where(include_inactive, |p| ids.contains(&p.id)))
    }

    async fn project_user_ids(&self, project_id: Id) -> RepositoryResult<Vec<Id>> {
        Ok(self
            .tables
            .read()
            .project_users
            .iter()
            .filter(|(pid, _)| *pid == project_id)
            .map(|(_, uid)| *uid)
            .collect())
    }

    async fn create_project(&self, dto: CreateProjectDto) -> RepositoryResult<Project> {
        let mut tables = self.tables.write();
        if tables.projects.values().any(|p| p.name == dto.name) {
            return Err(conflict());
        }
        tables.require_user(dto.customer_id)?;
        tables.require_user(dto.project_manager_id)?;

        let mut project = Project::new(
            Tables::next_id(&tables.projects),
            dto.name,
            dto.customer_id,
            dto.project_manager_id,
        );
        project.description = dto.description;
        project.is_active = dto.is_active;
        if let Some(created_at) = dto.created_at {
            project = project.created(created_at);
        }
        tables.projects.insert(project.id, project.clone());
        Ok(project)
    }

    async fn attach_user(&self, project_id: Id, user_id: Id) -> RepositoryResult<()> {
        let mut tables = self.tables.write();
        if !tables.projects.contains_key(&project_id) {
            return Err(in_use());
        }
        tables.require_user(user_id)?;
        tables.project_users.insert((project_id, user_id));
        Ok(())
    }

    async fn delete_project(&self, id: Id) -> RepositoryResult<()> {
        let mut tables = self.tables.write();
        if !tables.projects.contains_key(&id) {
            return Err(RepositoryError::NotFound(format!("Project {}", id)));
        }
        let referenced = tables.work_items.values().any(|wi| wi.project_id == id)
            || tables.orders.values().any(|o| o.project_id == Some(id));
        if referenced {
            return Err(in_use());
        }

        tables.project_users.retain(|(pid, _)| *pid != id);
        tables.projects.remove(&id);
        Ok(())
    }
}

#[async_trait]
impl WorkItemRepository for MemoryStore {
    async fn find_work_item(&self, id: Id) -> RepositoryResult<Option<WorkItem>> {
        Ok(self.tables.read().work_items.get(&id).cloned())
    }

    async fn work_items_for_project(&self, project_id: Id) -> RepositoryResult<Vec<WorkItem>> {
        Ok(self
            .tables
            .read()
            .work_items
            .values()
            .filter(|wi| wi.project_id == project_id)
            .cloned()
            .collect())
    }

    async fn create_work_item(&self, dto: CreateWorkItemDto) -> RepositoryResult<WorkItem> {
        let mut tables = self.tables.write();
        if !tables.projects.contains_key(&dto.project_id) {
            return Err(in_use());
        }
        tables.require_user(dto.owner_id)?;
        let duplicate = tables
            .work_items
            .values()
            .any(|wi| wi.project_id == dto.project_id && wi.name == dto.name);
        if duplicate {
            return Err(conflict());
        }

        let mut item = WorkItem::new(
            Tables::next_id(&tables.work_items),
            dto.project_id,
            dto.owner_id,
            dto.name,
        );
        item.start_date = dto.start_date;
        item.end_date = dto.end_date;
        item.is_open = dto.end_date.is_none();
        item.ticket_data = dto.ticket_data;
        tables.work_items.insert(item.id, item.clone());
        Ok(item)
    }

    async fn assign_user(&self, work_item_id: Id, user_id: Id) -> RepositoryResult<()> {
        let mut tables = self.tables.write();
        if !tables.work_items.contains_key(&work_item_id) {
            return Err(in_use());
        }
        tables.require_user(user_id)?;
        tables.work_item_users.insert((work_item_id, user_id));
        Ok(())
    }
}

#[async_trait]
impl TimeEntryRepository for MemoryStore {
    async fn find_time_entry(&self, id: Id) -> RepositoryResult<Option<TimeEntry>> {
        Ok(self.tables.read().time_entries.get(&id).cloned())
    }

    async fn time_entries_for_project(&self, project_id: Id) -> RepositoryResult<Vec<TimeEntry>> {
        self.time_entries_matching(project_id, |_| true)
    }

    async fn time_entries_between(
        &self,
        project_id: Id,
        range: DateRange,
    ) -> RepositoryResult<Vec<TimeEntry>> {
        self.time_entries_matching(project_id, |e| range.contains(e.date))
    }

    async fn create_time_entry(&self, entry: NewTimeEntry) -> RepositoryResult<TimeEntry> {
        let mut tables = self.tables.write();
        if !tables.work_items.contains_key(&entry.work_item_id) {
            return Err(in_use());
        }
        tables.require_user(entry.author_id)?;

        let now = Utc::now();
        let created = TimeEntry {
            id: Tables::next_id(&tables.time_entries),
            work_item_id: entry.work_item_id,
            author_id: entry.author_id,
            hours: entry.hours,
            date: entry.date,
            note: entry.note,
            created_at: now,
            updated_at: now,
        };
        tables.time_entries.insert(created.id, created.clone());
        Ok(created)
    }
}

impl MemoryStore {
    fn time_entries_matching(
        &self,
        project_id: Id,
        pred: impl Fn(&TimeEntry) -> bool,
    ) -> RepositoryResult<Vec<TimeEntry>> {
        let tables = self.tables.read();
        let mut entries: Vec<TimeEntry> = tables
            .time_entries
            .values()
            .filter(|e| {
                tables
                    .work_items
                    .get(&e.work_item_id)
                    .is_some_and(|wi| wi.project_id == project_id)
            })
            .filter(|e| pred(e))
            .cloned()
            .collect();
        entries.sort_by_key(|e| (e.date, e.id));
        Ok(entries)
    }
}

#[async_trait]
impl OrderRepository for MemoryStore {
    async fn orders_for_project(&self, project_id: Id) -> RepositoryResult<Vec<Order>> {
        Ok(self
            .tables
            .read()
            .orders
            .values()
            .filter(|o| o.project_id() == Some(project_id))
            .cloned()
            .collect())
    }

    async fn create_order(&self, dto: CreateOrderDto) -> RepositoryResult<Order> {
        let mut tables = self.tables.write();
        if let Some(pid) = dto.project_id {
            if !tables.projects.contains_key(&pid) {
                return Err(in_use());
            }
        }
        if let Some(reference) = &dto.reference_number {
            if tables
                .orders
                .values()
                .any(|o| o.reference_number.as_ref() == Some(reference))
            {
                return Err(conflict());
            }
        }

        let now = Utc::now();
        let order = Order {
            id: Tables::next_id(&tables.orders),
            project_id: dto.project_id,
            reference_number: dto.reference_number,
            email: dto.email,
            hours: dto.hours,
            date: dto.date,
            created_at: now,
            updated_at: now,
        };
        tables.orders.insert(order.id, order.clone());
        Ok(order)
    }
}
