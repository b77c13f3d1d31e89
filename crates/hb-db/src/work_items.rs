//! Work item repository

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use hb_core::traits::Id;
use hb_models::WorkItem;
use sqlx::types::Json;
use sqlx::FromRow;

use crate::pool::Database;
use crate::repository::{CreateWorkItemDto, RepositoryResult, WorkItemRepository};

/// Work item database entity
#[derive(Debug, Clone, FromRow)]
pub struct WorkItemRow {
    pub id: i64,
    pub project_id: i64,
    pub owner_id: i64,
    pub name: String,
    pub is_open: bool,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub ticket_data: Option<Json<serde_json::Value>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<WorkItemRow> for WorkItem {
    fn from(row: WorkItemRow) -> Self {
        WorkItem {
            id: row.id,
            project_id: row.project_id,
            owner_id: row.owner_id,
            name: row.name,
            is_open: row.is_open,
            start_date: row.start_date,
            end_date: row.end_date,
            ticket_data: row.ticket_data.map(|Json(v)| v),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl WorkItemRepository for Database {
    async fn find_work_item(&self, id: Id) -> RepositoryResult<Option<WorkItem>> {
        let row = sqlx::query_as::<_, WorkItemRow>(
            r#"
            SELECT id, project_id, owner_id, name, is_open, start_date, end_date,
                   ticket_data, created_at, updated_at
            FROM work_items
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await?;

        Ok(row.map(WorkItem::from))
    }

    async fn work_items_for_project(&self, project_id: Id) -> RepositoryResult<Vec<WorkItem>> {
        let rows = sqlx::query_as::<_, WorkItemRow>(
            r#"
            SELECT id, project_id, owner_id, name, is_open, start_date, end_date,
                   ticket_data, created_at, updated_at
            FROM work_items
            WHERE project_id = $1
            ORDER BY id ASC
            "#,
        )
        .bind(project_id)
        .fetch_all(self.pool())
        .await?;

        Ok(rows.into_iter().map(WorkItem::from).collect())
    }

    #[tracing::instrument(skip(self, dto), fields(project_id = dto.project_id))]
    async fn create_work_item(&self, dto: CreateWorkItemDto) -> RepositoryResult<WorkItem> {
        let row = sqlx::query_as::<_, WorkItemRow>(
            r#"
            INSERT INTO work_items (project_id, owner_id, name, is_open, start_date,
                                    end_date, ticket_data, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, NOW(), NOW())
            RETURNING id, project_id, owner_id, name, is_open, start_date, end_date,
                      ticket_data, created_at, updated_at
            "#,
        )
        .bind(dto.project_id)
        .bind(dto.owner_id)
        .bind(&dto.name)
        .bind(dto.end_date.is_none())
        .bind(dto.start_date)
        .bind(dto.end_date)
        .bind(dto.ticket_data.map(Json))
        .fetch_one(self.pool())
        .await?;

        Ok(row.into())
    }

    async fn assign_user(&self, work_item_id: Id, user_id: Id) -> RepositoryResult<()> {
        sqlx::query(
            r#"
            INSERT INTO work_item_users (work_item_id, user_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(work_item_id)
        .bind(user_id)
        .execute(self.pool())
        .await?;

        Ok(())
    }
}
