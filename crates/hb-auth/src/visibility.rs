//! Project visibility
//!
//! Decides which projects a user may see, from the user's primary role and the relationships
//! the data store records between users and projects:
//!
//! | Primary role             | Visible projects                                             |
//! |--------------------------|--------------------------------------------------------------|
//! | SuperAdmin, Admin        | every project                                                |
//! | ProjectManager           | projects they manage, plus projects they are attached to     |
//! | Engineer                 | projects of work items they own or are assigned to           |
//! | anything else, no role   | nothing                                                      |
//!
//! Inactive projects are left out unless asked for. Results are deduplicated and sorted by
//! creation time, newest first.

use std::collections::HashSet;

use hb_core::traits::Id;
use hb_db::{RepositoryResult, Store};
use hb_models::{Project, Role, User};

/// Project visibility resolver over a data store
pub struct ProjectVisibility<'a, S: Store + ?Sized> {
    store: &'a S,
}

impl<'a, S: Store + ?Sized> ProjectVisibility<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Projects `user` may see
    #[tracing::instrument(skip(self, user), fields(user_id = user.id))]
    pub async fn get_projects(
        &self,
        user: &User,
        include_inactive: bool,
    ) -> RepositoryResult<Vec<Project>> {
        let role = user.primary_role();
        let groups = match role {
            Some(Role::SuperAdmin) | Some(Role::Admin) => {
                vec![self.store.all_projects(include_inactive).await?]
            }
            Some(Role::ProjectManager) => vec![
                self.store
                    .projects_managed_by(user.id, include_inactive)
                    .await?,
                self.store
                    .projects_attached_to(user.id, include_inactive)
                    .await?,
            ],
            Some(Role::Engineer) => vec![
                self.store
                    .projects_with_owned_work_items(user.id, include_inactive)
                    .await?,
                self.store
                    .projects_with_assigned_work_items(user.id, include_inactive)
                    .await?,
            ],
            Some(Role::Customer) | Some(Role::AdminReadOnly) | None => Vec::new(),
        };

        let projects = merge_newest_first(groups);
        tracing::debug!(?role, count = projects.len(), "Resolved visible projects");
        Ok(projects)
    }

    /// Whether `user` may open the project with `project_id`.
    ///
    /// Administrators may open any id, even one that does not exist.
    pub async fn can_access_project(&self, user: &User, project_id: Id) -> RepositoryResult<bool> {
        if user.primary_role().is_some_and(|r| r.is_administrative()) {
            return Ok(true);
        }

        let projects = self.get_projects(user, true).await?;
        Ok(projects.iter().any(|p| p.id == project_id))
    }
}

/// Union of the groups, first occurrence wins, stably sorted by `created_at` descending
fn merge_newest_first(groups: Vec<Vec<Project>>) -> Vec<Project> {
    let mut seen = HashSet::new();
    let mut merged: Vec<Project> = groups
        .into_iter()
        .flatten()
        .filter(|p| seen.insert(p.id))
        .collect();
    merged.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use hb_db::{CreateWorkItemDto, MemoryStore, ProjectRepository, WorkItemRepository};

    const CUSTOMER: Id = 1;
    const MANAGER: Id = 2;
    const ENGINEER: Id = 3;
    const OTHER_MANAGER: Id = 4;

    fn user(id: Id, role: Option<Role>) -> User {
        let user = User::new(id, "Test", "User", format!("user{}@example.com", id));
        match role {
            Some(role) => user.with_role(role),
            None => user,
        }
    }

    /// Five projects created a day apart (project 5 newest); project 4 is inactive.
    fn store() -> MemoryStore {
        let store = MemoryStore::new();
        store.insert_user(user(CUSTOMER, Some(Role::Customer)));
        store.insert_user(user(MANAGER, Some(Role::ProjectManager)));
        store.insert_user(user(ENGINEER, Some(Role::Engineer)));
        store.insert_user(user(OTHER_MANAGER, Some(Role::ProjectManager)));

        let base = Utc::now() - Duration::days(30);
        for id in 1..=5 {
            let manager = if id <= 2 { MANAGER } else { OTHER_MANAGER };
            let mut project = Project::new(id, format!("Project {}", id), CUSTOMER, manager)
                .created(base + Duration::days(id));
            if id == 4 {
                project = project.inactive();
            }
            store.insert_project(project);
        }
        store
    }

    async fn work_item(store: &MemoryStore, project_id: Id, owner_id: Id, name: &str) -> Id {
        store
            .create_work_item(CreateWorkItemDto {
                project_id,
                owner_id,
                name: name.to_string(),
                start_date: Utc::now().date_naive(),
                end_date: None,
                ticket_data: None,
            })
            .await
            .unwrap()
            .id
    }

    fn ids(projects: &[Project]) -> Vec<Id> {
        projects.iter().map(|p| p.id).collect()
    }

    #[tokio::test]
    async fn test_admins_see_everything() {
        let store = store();
        let visibility = ProjectVisibility::new(&store);

        for role in [Role::Admin, Role::SuperAdmin] {
            let admin = user(10, Some(role));
            let all = visibility.get_projects(&admin, true).await.unwrap();
            assert_eq!(ids(&all), vec![5, 4, 3, 2, 1]);

            let active = visibility.get_projects(&admin, false).await.unwrap();
            assert_eq!(ids(&active), vec![5, 3, 2, 1]);
        }
    }

    #[tokio::test]
    async fn test_no_role_sees_nothing() {
        let store = store();
        let visibility = ProjectVisibility::new(&store);
        let nobody = user(10, None);

        assert!(visibility.get_projects(&nobody, true).await.unwrap().is_empty());
        assert!(visibility.get_projects(&nobody, false).await.unwrap().is_empty());
        assert!(!visibility.can_access_project(&nobody, 1).await.unwrap());
    }

    #[tokio::test]
    async fn test_customer_and_read_only_admin_see_nothing() {
        let store = store();
        let visibility = ProjectVisibility::new(&store);

        let customer = user(CUSTOMER, Some(Role::Customer));
        assert!(visibility.get_projects(&customer, true).await.unwrap().is_empty());

        let read_only = user(11, Some(Role::AdminReadOnly));
        assert!(visibility.get_projects(&read_only, true).await.unwrap().is_empty());
        assert!(!visibility.can_access_project(&read_only, 1).await.unwrap());
    }

    #[tokio::test]
    async fn test_project_manager_union_without_duplicates() {
        let store = store();
        // attached to a project they also manage, and to two they don't
        store.attach_user(1, MANAGER).await.unwrap();
        store.attach_user(3, MANAGER).await.unwrap();
        store.attach_user(4, MANAGER).await.unwrap();

        let visibility = ProjectVisibility::new(&store);
        let manager = user(MANAGER, Some(Role::ProjectManager));

        let all = visibility.get_projects(&manager, true).await.unwrap();
        assert_eq!(ids(&all), vec![4, 3, 2, 1]);

        let active = visibility.get_projects(&manager, false).await.unwrap();
        assert_eq!(ids(&active), vec![3, 2, 1]);
    }

    #[tokio::test]
    async fn test_engineer_owned_and_assigned() {
        let store = store();
        work_item(&store, 2, ENGINEER, "Owned A").await;
        work_item(&store, 2, ENGINEER, "Owned B").await;
        let assigned = work_item(&store, 4, MANAGER, "Assigned").await;
        store.assign_user(assigned, ENGINEER).await.unwrap();
        let both = work_item(&store, 5, ENGINEER, "Both").await;
        store.assign_user(both, ENGINEER).await.unwrap();

        let visibility = ProjectVisibility::new(&store);
        let engineer = user(ENGINEER, Some(Role::Engineer));

        let all = visibility.get_projects(&engineer, true).await.unwrap();
        assert_eq!(ids(&all), vec![5, 4, 2]);

        let active = visibility.get_projects(&engineer, false).await.unwrap();
        assert_eq!(ids(&active), vec![5, 2]);
    }

    #[tokio::test]
    async fn test_primary_role_drives_dispatch() {
        let store = store();
        let visibility = ProjectVisibility::new(&store);

        // a manager who also holds the customer role is still a manager
        let manager = user(MANAGER, Some(Role::Customer)).with_role(Role::ProjectManager);
        let projects = visibility.get_projects(&manager, true).await.unwrap();
        assert_eq!(ids(&projects), vec![2, 1]);
    }

    #[tokio::test]
    async fn test_can_access_project() {
        let store = store();
        let visibility = ProjectVisibility::new(&store);

        let admin = user(10, Some(Role::Admin));
        assert!(visibility.can_access_project(&admin, 1).await.unwrap());
        assert!(visibility.can_access_project(&admin, 9999).await.unwrap());

        let manager = user(MANAGER, Some(Role::ProjectManager));
        assert!(visibility.can_access_project(&manager, 1).await.unwrap());
        assert!(!visibility.can_access_project(&manager, 3).await.unwrap());
        assert!(!visibility.can_access_project(&manager, 9999).await.unwrap());

        // inactive projects stay accessible
        let other = user(OTHER_MANAGER, Some(Role::ProjectManager));
        assert!(visibility.can_access_project(&other, 4).await.unwrap());
    }

    #[tokio::test]
    async fn test_repeated_calls_agree() {
        let store = store();
        let visibility = ProjectVisibility::new(&store);
        let manager = user(MANAGER, Some(Role::ProjectManager));

        let first = visibility.get_projects(&manager, true).await.unwrap();
        let second = visibility.get_projects(&manager, true).await.unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_merge_keeps_equal_timestamps_in_order() {
        let at = Utc::now();
        let a = Project::new(1, "A", 1, 2).created(at);
        let b = Project::new(2, "B", 1, 2).created(at);
        let merged = merge_newest_first(vec![vec![a.clone(), b.clone()], vec![a]]);
        assert_eq!(ids(&merged), vec![1, 2]);
    }
}
