//! User model
//!
//! Table: users (roles through user_roles)

use chrono::{DateTime, Utc};
use hb_core::traits::{Entity, Id, Identifiable, Timestamped};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::role::Role;

/// User entity
///
/// A user reaches projects through three relationships: as the customer of a project, as
/// its project manager, and as an attached project user. Work items add two more (owned and
/// assigned). Those relationships live in the data store; the model only carries the roles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct User {
    pub id: Id,

    #[validate(length(min = 1, max = 125))]
    pub first_name: String,

    #[validate(length(min = 1, max = 125))]
    pub last_name: String,

    #[validate(email)]
    pub email: String,

    /// Assigned roles; normally exactly one
    #[serde(default)]
    pub roles: Vec<Role>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Identifiable for User {
    fn id(&self) -> Id {
        self.id
    }
}

impl Timestamped for User {
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

impl Entity for User {
    const TABLE_NAME: &'static str = "users";
    const TYPE_NAME: &'static str = "User";
}

impl User {
    pub fn new(
        id: Id,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: email.into(),
            roles: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_role(mut self, role: Role) -> Self {
        if !self.roles.contains(&role) {
            self.roles.push(role);
        }
        self
    }

    /// The role that drives project visibility, resolved by `Role::PRECEDENCE`.
    ///
    /// `None` when the user holds no role.
    pub fn primary_role(&self) -> Option<Role> {
        Role::PRECEDENCE
            .iter()
            .find(|role| self.roles.contains(role))
            .copied()
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}
