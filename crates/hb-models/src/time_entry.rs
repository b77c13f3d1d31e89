//! Time entry model
//!
//! Table: time_entries

use chrono::{DateTime, NaiveDate, Utc};
use hb_core::traits::{Entity, Id, Identifiable, Timestamped};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Hours logged against a work item. Negative hours are a rebate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeEntry {
    pub id: Id,
    pub work_item_id: Id,
    pub author_id: Id,
    pub hours: f64,
    pub date: NaiveDate,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Identifiable for TimeEntry {
    fn id(&self) -> Id {
        self.id
    }
}

impl Timestamped for TimeEntry {
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

impl Entity for TimeEntry {
    const TABLE_NAME: &'static str = "time_entries";
    const TYPE_NAME: &'static str = "TimeEntry";
}

impl TimeEntry {
    pub fn is_rebate(&self) -> bool {
        self.hours < 0.0
    }

    /// The entry that refunds this one
    pub fn rebate(&self, author_id: Id, date: NaiveDate) -> NewTimeEntry {
        NewTimeEntry {
            work_item_id: self.work_item_id,
            author_id,
            hours: -self.hours,
            date,
            note: Some(format!("Refund of entry {}", self.id)),
        }
    }
}

/// Insert payload for a time entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct NewTimeEntry {
    pub work_item_id: Id,
    pub author_id: Id,
    #[validate(range(min = -24.0, max = 24.0))]
    pub hours: f64,
    pub date: NaiveDate,
    #[validate(length(max = 2000))]
    pub note: Option<String>,
}

impl NewTimeEntry {
    pub fn new(work_item_id: Id, author_id: Id, hours: f64, date: NaiveDate) -> Self {
        Self {
            work_item_id,
            author_id,
            hours,
            date,
            note: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(hours: f64) -> TimeEntry {
        let now = Utc::now();
        TimeEntry {
            id: 42,
            work_item_id: 7,
            author_id: 3,
            hours,
            date: now.date_naive(),
            note: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_rebate_negates_hours() {
        let original = entry(6.5);
        let date = NaiveDate::from_ymd_opt(2023, 10, 2).unwrap();
        let rebate = original.rebate(9, date);

        assert_eq!(rebate.work_item_id, 7);
        assert_eq!(rebate.author_id, 9);
        assert_eq!(rebate.hours, -6.5);
        assert_eq!(rebate.date, date);
        assert_eq!(rebate.note.as_deref(), Some("Refund of entry 42"));
    }

    #[test]
    fn test_is_rebate() {
        assert!(entry(-1.0).is_rebate());
        assert!(!entry(0.0).is_rebate());
        assert!(!entry(8.0).is_rebate());
    }

    #[test]
    fn test_new_time_entry_validation() {
        let date = NaiveDate::from_ymd_opt(2023, 10, 2).unwrap();
        assert!(NewTimeEntry::new(1, 1, 8.0, date).validate().is_ok());
        assert!(NewTimeEntry::new(1, 1, -8.0, date).validate().is_ok());
        assert!(NewTimeEntry::new(1, 1, 25.0, date).validate().is_err());
    }
}
