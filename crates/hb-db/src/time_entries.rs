//! Time entry repository
//!
//! Time entries belong to work items; project-level queries join through work_items.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use hb_core::traits::Id;
use hb_core::types::DateRange;
use hb_models::{NewTimeEntry, TimeEntry};
use sqlx::FromRow;

use crate::pool::Database;
use crate::repository::{RepositoryResult, TimeEntryRepository};

/// Time entry database entity
#[derive(Debug, Clone, FromRow)]
pub struct TimeEntryRow {
    pub id: i64,
    pub work_item_id: i64,
    pub author_id: i64,
    pub hours: f64,
    pub date: NaiveDate,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<TimeEntryRow> for TimeEntry {
    fn from(row: TimeEntryRow) -> Self {
        TimeEntry {
            id: row.id,
            work_item_id: row.work_item_id,
            author_id: row.author_id,
            hours: row.hours,
            date: row.date,
            note: row.note,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl TimeEntryRepository for Database {
    async fn find_time_entry(&self, id: Id) -> RepositoryResult<Option<TimeEntry>> {
        let row = sqlx::query_as::<_, TimeEntryRow>(
            r#"
            SELECT id, work_item_id, author_id, hours, date, note, created_at, updated_at
            FROM time_entries
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await?;

        Ok(row.map(TimeEntry::from))
    }

    async fn time_entries_for_project(&self, project_id: Id) -> RepositoryResult<Vec<TimeEntry>> {
        let rows = sqlx::query_as::<_, TimeEntryRow>(
            r#"
            SELECT te.id, te.work_item_id, te.author_id, te.hours, te.date, te.note,
                   te.created_at, te.updated_at
            FROM time_entries te
            INNER JOIN work_items wi ON wi.id = te.work_item_id
            WHERE wi.project_id = $1
            ORDER BY te.date ASC, te.id ASC
            "#,
        )
        .bind(project_id)
        .fetch_all(self.pool())
        .await?;

        Ok(rows.into_iter().map(TimeEntry::from).collect())
    }

    async fn time_entries_between(
        &self,
        project_id: Id,
        range: DateRange,
    ) -> RepositoryResult<Vec<TimeEntry>> {
        let rows = sqlx::query_as::<_, TimeEntryRow>(
            r#"
            SELECT te.id, te.work_item_id, te.author_id, te.hours, te.date, te.note,
                   te.created_at, te.updated_at
            FROM time_entries te
            INNER JOIN work_items wi ON wi.id = te.work_item_id
            WHERE wi.project_id = $1 AND te.date BETWEEN $2 AND $3
            ORDER BY te.date ASC, te.id ASC
            "#,
        )
        .bind(project_id)
        .bind(range.start)
        .bind(range.end)
        .fetch_all(self.pool())
        .await?;

        Ok(rows.into_iter().map(TimeEntry::from).collect())
    }

    #[tracing::instrument(skip(self, entry), fields(work_item_id = entry.work_item_id))]
    async fn create_time_entry(&self, entry: NewTimeEntry) -> RepositoryResult<TimeEntry> {
        let row = sqlx::query_as::<_, TimeEntryRow>(
            r#"
            INSERT INTO time_entries (work_item_id, author_id, hours, date, note,
                                      created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, NOW(), NOW())
            RETURNING id, work_item_id, author_id, hours, date, note, created_at, updated_at
            "#,
        )
        .bind(entry.work_item_id)
        .bind(entry.author_id)
        .bind(entry.hours)
        .bind(entry.date)
        .bind(&entry.note)
        .fetch_one(self.pool())
        .await?;

        Ok(row.into())
    }
}
