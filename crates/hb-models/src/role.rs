//! Roles and permissions
//!
//! Every user holds (at most) one meaningful role. The permissions each role grants live in
//! the static table of `hb-auth`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// System role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "Customer")]
    Customer,
    #[serde(rename = "Engineer")]
    Engineer,
    #[serde(rename = "Project Manager")]
    ProjectManager,
    #[serde(rename = "Admin")]
    Admin,
    #[serde(rename = "Admin Read Only")]
    AdminReadOnly,
    #[serde(rename = "Super Admin")]
    SuperAdmin,
}

impl Role {
    /// All roles, in seeding order
    pub const ALL: [Role; 6] = [
        Role::Customer,
        Role::Engineer,
        Role::ProjectManager,
        Role::Admin,
        Role::AdminReadOnly,
        Role::SuperAdmin,
    ];

    /// Resolution order used when a user holds more than one role: the first role of this
    /// list that the user holds is the primary role.
    pub const PRECEDENCE: [Role; 6] = [
        Role::SuperAdmin,
        Role::Admin,
        Role::ProjectManager,
        Role::Engineer,
        Role::AdminReadOnly,
        Role::Customer,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Role::Customer => "Customer",
            Role::Engineer => "Engineer",
            Role::ProjectManager => "Project Manager",
            Role::Admin => "Admin",
            Role::AdminReadOnly => "Admin Read Only",
            Role::SuperAdmin => "Super Admin",
        }
    }

    /// Stable numeric id (position in `ALL`, starting at 1)
    pub fn id(&self) -> i64 {
        Role::ALL
            .iter()
            .position(|r| r == self)
            .map(|p| p as i64 + 1)
            .unwrap_or_default()
    }

    pub fn from_id(id: i64) -> Option<Role> {
        usize::try_from(id - 1)
            .ok()
            .and_then(|idx| Role::ALL.get(idx).copied())
    }

    /// SuperAdmin and Admin see every project
    pub fn is_administrative(&self) -> bool {
        matches!(self, Role::SuperAdmin | Role::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .iter()
            .find(|r| r.name() == s)
            .copied()
            .ok_or_else(|| format!("unknown role '{}'", s))
    }
}

/// System permission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Permission {
    #[serde(rename = "View Project")]
    ViewProject,
    #[serde(rename = "View All Projects")]
    ViewAllProjects,
    #[serde(rename = "Edit Project")]
    EditProject,
    #[serde(rename = "View Work Item")]
    ViewWorkItem,
    #[serde(rename = "Edit Work Item")]
    EditWorkItem,
    #[serde(rename = "View Time Entry")]
    ViewTimeEntry,
    #[serde(rename = "Edit Time Entry")]
    EditTimeEntry,
    #[serde(rename = "Manage System")]
    ManageSystem,
    #[serde(rename = "Run Reports")]
    RunReports,
    #[serde(rename = "View Orders")]
    ViewOrders,
    #[serde(rename = "Edit Orders")]
    EditOrders,
}

impl Permission {
    pub const ALL: [Permission; 11] = [
        Permission::ViewProject,
        Permission::ViewAllProjects,
        Permission::EditProject,
        Permission::ViewWorkItem,
        Permission::EditWorkItem,
        Permission::ViewTimeEntry,
        Permission::EditTimeEntry,
        Permission::ManageSystem,
        Permission::RunReports,
        Permission::ViewOrders,
        Permission::EditOrders,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Permission::ViewProject => "View Project",
            Permission::ViewAllProjects => "View All Projects",
            Permission::EditProject => "Edit Project",
            Permission::ViewWorkItem => "View Work Item",
            Permission::EditWorkItem => "Edit Work Item",
            Permission::ViewTimeEntry => "View Time Entry",
            Permission::EditTimeEntry => "Edit Time Entry",
            Permission::ManageSystem => "Manage System",
            Permission::RunReports => "Run Reports",
            Permission::ViewOrders => "View Orders",
            Permission::EditOrders => "Edit Orders",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_names_round_trip() {
        for role in Role::ALL {
            assert_eq!(role.name().parse::<Role>(), Ok(role));
        }
        assert!("Janitor".parse::<Role>().is_err());
    }

    #[test]
    fn test_role_ids() {
        assert_eq!(Role::Customer.id(), 1);
        assert_eq!(Role::SuperAdmin.id(), 6);
        assert_eq!(Role::from_id(3), Some(Role::ProjectManager));
        assert_eq!(Role::from_id(0), None);
        assert_eq!(Role::from_id(7), None);
    }

    #[test]
    fn test_precedence_covers_every_role() {
        for role in Role::ALL {
            assert!(Role::PRECEDENCE.contains(&role));
        }
    }

    #[test]
    fn test_serde_uses_display_names() {
        let json = serde_json::to_string(&Role::ProjectManager).unwrap();
        assert_eq!(json, "\"Project Manager\"");
        let perm: Permission = serde_json::from_str("\"View Orders\"").unwrap();
        assert_eq!(perm, Permission::ViewOrders);
    }
}
