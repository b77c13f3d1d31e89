//! Project log CSV export

use std::collections::HashMap;

use hb_core::traits::Id;
use hb_db::{RepositoryResult, Store};
use hb_models::{Project, User, WorkItem};

use crate::hours::format_hours;

const HEADER: &str =
    r#""Work Item","Title","IPS No","Start Date","End Date","Closed","Owner","Total Hours""#;

/// Quote a field, doubling embedded quotes
fn quoted(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

pub struct ProjectLog<'a, S: Store + ?Sized> {
    store: &'a S,
}

impl<'a, S: Store + ?Sized> ProjectLog<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// One line per work item, with a header line; every line ends with a newline
    #[tracing::instrument(skip(self, project), fields(project_id = project.id))]
    pub async fn csv(&self, project: &Project) -> RepositoryResult<String> {
        let work_items = self.store.work_items_for_project(project.id).await?;
        let entries = self.store.time_entries_for_project(project.id).await?;
        let owners: HashMap<Id, User> = self
            .store
            .all_users()
            .await?
            .into_iter()
            .map(|u| (u.id, u))
            .collect();

        let mut hours: HashMap<Id, f64> = HashMap::new();
        for entry in &entries {
            *hours.entry(entry.work_item_id).or_default() += entry.hours;
        }

        let mut csv = String::from(HEADER);
        csv.push('\n');
        for item in &work_items {
            let owner = owners.get(&item.owner_id);
            let total = hours.get(&item.id).copied().unwrap_or_default();
            csv.push_str(&row(item, owner, total));
            csv.push('\n');
        }

        tracing::debug!(rows = work_items.len(), "Built project log");
        Ok(csv)
    }
}

fn row(item: &WorkItem, owner: Option<&User>, hours: f64) -> String {
    let mut line = String::new();
    let fields = [
        item.id.to_string(),
        item.name.clone(),
        item.ticket_id().unwrap_or_default(),
        item.start_date.format("%Y-%m-%d").to_string(),
        item.end_date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default(),
        if item.is_closed() { "Yes" } else { "No" }.to_string(),
        owner.map(User::full_name).unwrap_or_default(),
        format_hours(hours),
    ];
    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            line.push(',');
        }
        line.push_str(&quoted(field));
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use hb_db::{CreateWorkItemDto, MemoryStore, TimeEntryRepository, WorkItemRepository};
    use hb_models::NewTimeEntry;
    use serde_json::json;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn test_csv() {
        let store = MemoryStore::new();
        store.insert_user(User::new(7, "Eli", "Engineer", "eli@example.com"));
        let project = store.insert_project(Project::new(1, "Apollo", 7, 7));

        let closed = store
            .create_work_item(CreateWorkItemDto {
                project_id: 1,
                owner_id: 7,
                name: "Install \"rack\"".to_string(),
                start_date: date(2023, 9, 1),
                end_date: Some(date(2023, 9, 3)),
                ticket_data: Some(json!({ "id": 4411 })),
            })
            .await
            .unwrap();
        store
            .create_work_item(CreateWorkItemDto {
                project_id: 1,
                owner_id: 7,
                name: "Configure".to_string(),
                start_date: date(2023, 9, 4),
                end_date: None,
                ticket_data: None,
            })
            .await
            .unwrap();
        for hours in [6.0, 1.5, -2.0] {
            store
                .create_time_entry(NewTimeEntry::new(closed.id, 7, hours, date(2023, 9, 2)))
                .await
                .unwrap();
        }

        let csv = ProjectLog::new(&store).csv(&project).await.unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], HEADER);
        assert_eq!(
            lines[1],
            r#""1","Install ""rack""","4411","2023-09-01","2023-09-03","Yes","Eli Engineer","5.5""#
        );
        assert_eq!(
            lines[2],
            r#""2","Configure","","2023-09-04","","No","Eli Engineer","0""#
        );
        assert!(csv.ends_with('\n'));
    }
}
