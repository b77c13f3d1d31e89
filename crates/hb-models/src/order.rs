//! Order model
//!
//! Table: orders

use chrono::{DateTime, Utc};
use hb_core::traits::{Entity, Id, Identifiable, ProjectScoped, Timestamped};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Hours purchased for (or allocated to) a project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Order {
    pub id: Id,
    pub project_id: Option<Id>,
    /// Unique when present
    pub reference_number: Option<String>,
    #[validate(email)]
    pub email: String,
    pub hours: f64,
    pub date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Identifiable for Order {
    fn id(&self) -> Id {
        self.id
    }
}

impl Timestamped for Order {
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

impl ProjectScoped for Order {
    fn project_id(&self) -> Option<Id> {
        self.project_id
    }
}

impl Entity for Order {
    const TABLE_NAME: &'static str = "orders";
    const TYPE_NAME: &'static str = "Order";
}

impl Order {
    pub fn new(id: Id, project_id: Id, hours: f64, email: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id,
            project_id: Some(project_id),
            reference_number: None,
            email: email.into(),
            hours,
            date: now,
            created_at: now,
            updated_at: now,
        }
    }
}
