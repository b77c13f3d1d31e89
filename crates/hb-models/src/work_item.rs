//! Work item model
//!
//! Table: work_items (assignees through work_item_users)

use chrono::{DateTime, NaiveDate, Utc};
use hb_core::traits::{Entity, Id, Identifiable, ProjectScoped, Timestamped};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// A discrete unit of billable work within a project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct WorkItem {
    pub id: Id,

    pub project_id: Id,

    pub owner_id: Id,

    /// Unique within the project
    #[validate(length(min = 1, max = 255))]
    pub name: String,

    #[serde(default = "default_true")]
    pub is_open: bool,

    pub start_date: NaiveDate,

    pub end_date: Option<NaiveDate>,

    /// External ticket payload; carries at least an `id` when present
    pub ticket_data: Option<serde_json::Value>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn default_true() -> bool {
    true
}

impl Identifiable for WorkItem {
    fn id(&self) -> Id {
        self.id
    }
}

impl Timestamped for WorkItem {
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

impl ProjectScoped for WorkItem {
    fn project_id(&self) -> Option<Id> {
        Some(self.project_id)
    }
}

impl Entity for WorkItem {
    const TABLE_NAME: &'static str = "work_items";
    const TYPE_NAME: &'static str = "WorkItem";
}

impl WorkItem {
    pub fn new(id: Id, project_id: Id, owner_id: Id, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id,
            project_id,
            owner_id,
            name: name.into(),
            is_open: true,
            start_date: now.date_naive(),
            end_date: None,
            ticket_data: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// The external ticket id, rendered as text
    pub fn ticket_id(&self) -> Option<String> {
        let id = self.ticket_data.as_ref()?.get("id")?;
        match id {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Null => None,
            other => Some(other.to_string()),
        }
    }

    /// A work item counts as closed once it has an end date
    pub fn is_closed(&self) -> bool {
        self.end_date.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_ticket_id() {
        let mut item = WorkItem::new(1, 1, 1, "Setup");
        assert_eq!(item.ticket_id(), None);

        item.ticket_data = Some(json!({ "id": 4411, "title": "IPS" }));
        assert_eq!(item.ticket_id().as_deref(), Some("4411"));

        item.ticket_data = Some(json!({ "id": "IPS-9" }));
        assert_eq!(item.ticket_id().as_deref(), Some("IPS-9"));

        item.ticket_data = Some(json!({ "title": "no id" }));
        assert_eq!(item.ticket_id(), None);
    }

    #[test]
    fn test_closed_when_ended() {
        let mut item = WorkItem::new(1, 1, 1, "Setup");
        assert!(!item.is_closed());
        item.end_date = NaiveDate::from_ymd_opt(2023, 10, 1);
        assert!(item.is_closed());
    }
}
