use crate::models::role::Role;
use chrono::{DateTime, Local};

#[derive(Debug, Clone)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub role: Role,
    pub active: bool,
    pub failed_attempts: i64,
    pub locked_until: Option<DateTime<Local>>,
    pub reset_token_hash: Option<String>,
    pub reset_token_expires: Option<DateTime<Local>>,
}

impl User {
    pub fn is_locked(&self, now: DateTime<Local>) -> bool {
        self.locked_until.is_some_and(|until| now < until)
    }
}
