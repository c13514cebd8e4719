use crate::errors::{AppError, AppResult};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Role {
    Admin,
    Manager,
    User,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    ViewDashboard,
    ManageUsers,
    CreateProject,
    EditProject,
    DeleteProject,
    AssignPersonnel,
    EditPersonnel,
    ViewAudit,
}

const ADMIN: &[Permission] = &[
    Permission::ViewDashboard,
    Permission::ManageUsers,
    Permission::CreateProject,
    Permission::EditProject,
    Permission::DeleteProject,
    Permission::AssignPersonnel,
    Permission::EditPersonnel,
    Permission::ViewAudit,
];

const MANAGER: &[Permission] = &[
    Permission::ViewDashboard,
    Permission::CreateProject,
    Permission::EditProject,
    Permission::AssignPersonnel,
    Permission::EditPersonnel,
];

const USER: &[Permission] = &[Permission::ViewDashboard];

impl Role {
    pub fn permissions(&self) -> &'static [Permission] {
        match self {
            Role::Admin => ADMIN,
            Role::Manager => MANAGER,
            Role::User => USER,
        }
    }

    pub fn can(&self, permission: Permission) -> bool {
        self.permissions().contains(&permission)
    }

    /// Convert enum → DB string
    pub fn to_db_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Manager => "manager",
            Role::User => "user",
        }
    }

    /// Convert DB string → enum
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "admin" => Some(Role::Admin),
            "manager" => Some(Role::Manager),
            "user" => Some(Role::User),
            _ => None,
        }
    }

    /// Accept CLI input in any case, plus the legacy Spanish names.
    pub fn parse(input: &str) -> AppResult<Self> {
        match input.trim().to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "manager" | "gestor" => Ok(Role::Manager),
            "user" | "usuario" => Ok(Role::User),
            other => Err(AppError::InvalidRole(other.to_string())),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_db_str())
    }
}

impl Permission {
    pub fn describe(&self) -> &'static str {
        match self {
            Permission::ViewDashboard => "view the dashboard",
            Permission::ManageUsers => "manage users",
            Permission::CreateProject => "create projects",
            Permission::EditProject => "edit projects",
            Permission::DeleteProject => "delete projects",
            Permission::AssignPersonnel => "assign personnel",
            Permission::EditPersonnel => "edit personnel",
            Permission::ViewAudit => "view the audit trail",
        }
    }
}
