//! Project repository
//!
//! Projects and their attached users (projects, project_users). The relationship queries
//! back the project visibility resolver; they do not sort or deduplicate across calls.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hb_core::traits::Id;
use hb_models::Project;
use sqlx::FromRow;

use crate::pool::Database;
use crate::repository::{CreateProjectDto, ProjectRepository, RepositoryResult};

/// Project database entity
#[derive(Debug, Clone, FromRow)]
pub struct ProjectRow {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub customer_id: i64,
    pub project_manager_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ProjectRow> for Project {
    fn from(row: ProjectRow) -> Self {
        Project {
            id: row.id,
            name: row.name,
            description: row.description,
            is_active: row.is_active,
            customer_id: row.customer_id,
            project_manager_id: row.project_manager_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

fn into_projects(rows: Vec<ProjectRow>) -> Vec<Project> {
    rows.into_iter().map(Project::from).collect()
}

#[async_trait]
impl ProjectRepository for Database {
    async fn find_project(&self, id: Id) -> RepositoryResult<Option<Project>> {
        let row = sqlx::query_as::<_, ProjectRow>(
            r#"
            SELECT id, name, description, is_active, customer_id, project_manager_id,
                   created_at, updated_at
            FROM projects
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await?;

        Ok(row.map(Project::from))
    }

    async fn all_projects(&self, include_inactive: bool) -> RepositoryResult<Vec<Project>> {
        let rows = sqlx::query_as::<_, ProjectRow>(
            r#"
            SELECT id, name, description, is_active, customer_id, project_manager_id,
                   created_at, updated_at
            FROM projects
            WHERE ($1 OR is_active)
            ORDER BY id ASC
            "#,
        )
        .bind(include_inactive)
        .fetch_all(self.pool())
        .await?;

        Ok(into_projects(rows))
    }

    async fn projects_managed_by(
        &self,
        user_id: Id,
        include_inactive: bool,
    ) -> RepositoryResult<Vec<Project>> {
        let rows = sqlx::query_as::<_, ProjectRow>(
            r#"
            SELECT id, name, description, is_active, customer_id, project_manager_id,
                   created_at, updated_at
            FROM projects
            WHERE project_manager_id = $1 AND ($2 OR is_active)
            ORDER BY id ASC
            "#,
        )
        .bind(user_id)
        .bind(include_inactive)
        .fetch_all(self.pool())
        .await?;

        Ok(into_projects(rows))
    }

    async fn projects_attached_to(
        &self,
        user_id: Id,
        include_inactive: bool,
    ) -> RepositoryResult<Vec<Project>> {
        let rows = sqlx::query_as::<_, ProjectRow>(
            r#"
            SELECT p.id, p.name, p.description, p.is_active, p.customer_id,
                   p.project_manager_id, p.created_at, p.updated_at
            FROM projects p
            INNER JOIN project_users pu ON pu.project_id = p.id
            WHERE pu.user_id = $1 AND ($2 OR p.is_active)
            ORDER BY p.id ASC
            "#,
        )
        .bind(user_id)
        .bind(include_inactive)
        .fetch_all(self.pool())
        .await?;

        Ok(into_projects(rows))
    }

    async fn projects_with_owned_work_items(
        &self,
        user_id: Id,
        include_inactive: bool,
    ) -> RepositoryResult<Vec<Project>> {
        let rows = sqlx::query_as::<_, ProjectRow>(
            r#"
            SELECT DISTINCT p.id, p.name, p.description, p.is_active, p.customer_id,
                   p.project_manager_id, p.created_at, p.updated_at
            FROM projects p
            INNER JOIN work_items wi ON wi.project_id = p.id
            WHERE wi.owner_id = $1 AND ($2 OR p.is_active)
            ORDER BY p.id ASC
            "#,
        )
        .bind(user_id)
        .bind(include_inactive)
        .fetch_all(self.pool())
        .await?;

        Ok(into_projects(rows))
    }

    async fn projects_with_assigned_work_items(
        &self,
        user_id: Id,
        include_inactive: bool,
    ) -> RepositoryResult<Vec<Project>> {
        let rows = sqlx::query_as::<_, ProjectRow>(
            r#"
            SELECT DISTINCT p.id, p.name, p.description, p.is_active, p.customer_id,
                   p.project_manager_id, p.created_at, p.updated_at
            FROM projects p
            INNER JOIN work_items wi ON wi.project_id = p.id
            INNER JOIN work_item_users wiu ON wiu.work_item_id = wi.id
            WHERE wiu.user_id = $1 AND ($2 OR p.is_active)
            ORDER BY p.id ASC
            "#,
        )
        .bind(user_id)
        .bind(include_inactive)
        .fetch_all(self.pool())
        .await?;

        Ok(into_projects(rows))
    }

    async fn project_user_ids(&self, project_id: Id) -> RepositoryResult<Vec<Id>> {
        let ids = sqlx::query_scalar::<_, i64>(
            "SELECT user_id FROM project_users WHERE project_id = $1 ORDER BY user_id ASC",
        )
        .bind(project_id)
        .fetch_all(self.pool())
        .await?;

        Ok(ids)
    }

    #[tracing::instrument(skip(self, dto), fields(name = %dto.name))]
    async fn create_project(&self, dto: CreateProjectDto) -> RepositoryResult<Project> {
        let created_at = dto.created_at.unwrap_or_else(Utc::now);
        let row = sqlx::query_as::<_, ProjectRow>(
            r#"
            INSERT INTO projects (name, description, is_active, customer_id,
                                  project_manager_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $6)
            RETURNING id, name, description, is_active, customer_id, project_manager_id,
                      created_at, updated_at
            "#,
        )
        .bind(&dto.name)
        .bind(&dto.description)
        .bind(dto.is_active)
        .bind(dto.customer_id)
        .bind(dto.project_manager_id)
        .bind(created_at)
        .fetch_one(self.pool())
        .await?;

        Ok(row.into())
    }

    async fn attach_user(&self, project_id: Id, user_id: Id) -> RepositoryResult<()> {
        sqlx::query(
            r#"
            INSERT INTO project_users (project_id, user_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(project_id)
        .bind(user_id)
        .execute(self.pool())
        .await?;

        Ok(())
    }

    async fn delete_project(&self, id: Id) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(crate::repository::RepositoryError::NotFound(format!(
                "Project {}",
                id
            )));
        }

        Ok(())
    }
}
