//! Project model
//!
//! Table: projects

use chrono::{DateTime, Utc};
use hb_core::traits::{Entity, Id, Identifiable, Timestamped};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Project entity
///
/// Owns work items (and through them time entries) and orders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Project {
    pub id: Id,

    /// Display name (unique)
    #[validate(length(min = 1, max = 255))]
    pub name: String,

    pub description: Option<String>,

    /// Inactive projects are hidden from listings unless explicitly requested
    #[serde(default = "default_true")]
    pub is_active: bool,

    pub customer_id: Id,

    pub project_manager_id: Id,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn default_true() -> bool {
    true
}

impl Identifiable for Project {
    fn id(&self) -> Id {
        self.id
    }
}

impl Timestamped for Project {
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

impl Entity for Project {
    const TABLE_NAME: &'static str = "projects";
    const TYPE_NAME: &'static str = "Project";
}

impl Project {
    pub fn new(id: Id, name: impl Into<String>, customer_id: Id, project_manager_id: Id) -> Self {
        let now = Utc::now();
        Self {
            id,
            name: name.into(),
            description: None,
            is_active: true,
            customer_id,
            project_manager_id,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }

    pub fn created(mut self, at: DateTime<Utc>) -> Self {
        self.created_at = at;
        self.updated_at = at;
        self
    }

    /// Keep the project when inactive projects are requested or the project is active
    pub fn visible_with(&self, include_inactive: bool) -> bool {
        include_inactive || self.is_active
    }
}
