use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditAction {
    Create,
    Edit,
    Delete,
    Assign,
    Unassign,
    Login,
    LoginFailed,
    Import,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditEntity {
    Person,
    Project,
    Assignment,
    User,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::Create => "CREATE",
            AuditAction::Edit => "EDIT",
            AuditAction::Delete => "DELETE",
            AuditAction::Assign => "ASSIGN",
            AuditAction::Unassign => "UNASSIGN",
            AuditAction::Login => "LOGIN",
            AuditAction::LoginFailed => "LOGIN_FAILED",
            AuditAction::Import => "IMPORT",
        }
    }
}

impl AuditEntity {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditEntity::Person => "PERSON",
            AuditEntity::Project => "PROJECT",
            AuditEntity::Assignment => "ASSIGNMENT",
            AuditEntity::User => "USER",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AuditEntry {
    pub id: i64,
    pub timestamp: String,
    pub user_id: Option<i64>,
    pub username: String,
    pub action: String,
    pub entity: String,
    pub entity_id: Option<i64>,
    pub detail: String,
}
