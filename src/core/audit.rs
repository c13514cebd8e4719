//! Best-effort audit trail: a failed write never aborts the user's
//! operation, but it is always reported.

use crate::core::auth::Session;
use crate::db::audit::insert_entry;
use crate::models::audit::{AuditAction, AuditEntity};
use crate::ui::messages::warning;
use rusqlite::Connection;

pub fn record(
    conn: &Connection,
    session: Option<&Session>,
    action: AuditAction,
    entity: AuditEntity,
    entity_id: Option<i64>,
    detail: &str,
) {
    let (user_id, username) = match session {
        Some(s) => (Some(s.user_id), s.username.as_str()),
        None => (None, "system"),
    };
    record_as(conn, user_id, username, action, entity, entity_id, detail);
}

/// Same as [`record`] for callers without a session, such as refused
/// logins, which are filed under the attempted username.
pub fn record_as(
    conn: &Connection,
    user_id: Option<i64>,
    username: &str,
    action: AuditAction,
    entity: AuditEntity,
    entity_id: Option<i64>,
    detail: &str,
) {
    if let Err(e) = insert_entry(conn, user_id, username, action, entity, entity_id, detail) {
        tracing::warn!(
            error = %e,
            action = action.as_str(),
            entity = entity.as_str(),
            "audit write failed"
        );
        warning(format!("Failed to write audit entry ({}): {}", action, e));
    }
}
