//! Permission system for Hourbook
//!
//! The role to permission mapping is constant for the life of the process. It is built once,
//! on first use, and never mutated.

use std::collections::{BTreeMap, BTreeSet};

use hb_core::traits::Id;
use hb_models::{Permission, Role, User};
use once_cell::sync::Lazy;
use serde::Serialize;

// ============================================================================
// Role table
// ============================================================================

const CUSTOMER: &[Permission] = &[
    Permission::ViewProject,
    Permission::ViewWorkItem,
    Permission::ViewTimeEntry,
    Permission::RunReports,
];

const ENGINEER: &[Permission] = &[Permission::EditTimeEntry];

const PROJECT_MANAGER: &[Permission] = &[
    Permission::EditProject,
    Permission::EditWorkItem,
    Permission::ViewOrders,
];

const ADMIN: &[Permission] = &[Permission::ViewAllProjects, Permission::EditOrders];

const ADMIN_READ_ONLY: &[Permission] = &[
    Permission::ViewProject,
    Permission::ViewAllProjects,
    Permission::ViewWorkItem,
    Permission::ViewTimeEntry,
    Permission::RunReports,
];

const SUPER_ADMIN: &[Permission] = &[Permission::ManageSystem];

static ROLE_PERMISSIONS: Lazy<BTreeMap<Role, BTreeSet<Permission>>> = Lazy::new(|| {
    let grant = |parts: &[&[Permission]]| -> BTreeSet<Permission> {
        parts.iter().flat_map(|p| p.iter().copied()).collect()
    };

    let mut table = BTreeMap::new();
    table.insert(Role::Customer, grant(&[CUSTOMER]));
    table.insert(Role::Engineer, grant(&[CUSTOMER, ENGINEER]));
    table.insert(
        Role::ProjectManager,
        grant(&[CUSTOMER, ENGINEER, PROJECT_MANAGER]),
    );
    table.insert(
        Role::Admin,
        grant(&[CUSTOMER, ENGINEER, PROJECT_MANAGER, ADMIN]),
    );
    table.insert(Role::AdminReadOnly, grant(&[ADMIN_READ_ONLY]));
    table.insert(
        Role::SuperAdmin,
        grant(&[CUSTOMER, ENGINEER, PROJECT_MANAGER, ADMIN, SUPER_ADMIN]),
    );
    table
});

/// Permissions granted to a role
pub fn permissions_for(role: Role) -> &'static BTreeSet<Permission> {
    static EMPTY: BTreeSet<Permission> = BTreeSet::new();
    ROLE_PERMISSIONS.get(&role).unwrap_or(&EMPTY)
}

/// A role as listed by the API
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoleEntry {
    pub id: Id,
    pub name: &'static str,
    pub permissions: Vec<&'static str>,
}

/// All roles with their permissions, ordered by id
pub fn role_table() -> Vec<RoleEntry> {
    Role::ALL
        .iter()
        .map(|role| RoleEntry {
            id: role.id(),
            name: role.name(),
            permissions: permissions_for(*role).iter().map(|p| p.name()).collect(),
        })
        .collect()
}

// ============================================================================
// User Context
// ============================================================================

/// Current user with permissions
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user: User,
    permissions: BTreeSet<Permission>,
}

impl CurrentUser {
    /// Resolve the permissions of every role the user holds
    pub fn new(user: User) -> Self {
        let permissions = user
            .roles
            .iter()
            .flat_map(|role| permissions_for(*role).iter().copied())
            .collect();
        Self { user, permissions }
    }

    pub fn id(&self) -> Id {
        self.user.id
    }

    pub fn primary_role(&self) -> Option<Role> {
        self.user.primary_role()
    }

    pub fn permissions(&self) -> &BTreeSet<Permission> {
        &self.permissions
    }

    pub fn allowed(&self, permission: Permission) -> bool {
        self.permissions.contains(&permission)
    }

    /// SuperAdmin or Admin
    pub fn is_admin(&self) -> bool {
        self.primary_role().is_some_and(|r| r.is_administrative())
    }
}
