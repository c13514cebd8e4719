use crate::db::now_param;
use crate::errors::AppResult;
use crate::models::audit::{AuditAction, AuditEntity, AuditEntry};
use rusqlite::{Connection, params};

pub fn insert_entry(
    conn: &Connection,
    user_id: Option<i64>,
    username: &str,
    action: AuditAction,
    entity: AuditEntity,
    entity_id: Option<i64>,
    detail: &str,
) -> AppResult<()> {
    let mut stmt = conn.prepare_cached(
        "INSERT INTO audit (timestamp, user_id, username, action, entity, entity_id, detail)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
    )?;
    stmt.execute(params![
        now_param(),
        user_id,
        username,
        action.as_str(),
        entity.as_str(),
        entity_id,
        detail
    ])?;
    Ok(())
}

/// Newest entries first, optionally restricted to one username.
pub fn list_entries(conn: &Connection, limit: usize, username: Option<&str>) -> AppResult<Vec<AuditEntry>> {
    let mut stmt = conn.prepare(
        "SELECT id, timestamp, user_id, username, action, entity, entity_id, detail
         FROM audit
         WHERE ?1 IS NULL OR username = ?1
         ORDER BY id DESC
         LIMIT ?2",
    )?;

    let rows = stmt.query_map(params![username, limit as i64], |row| {
        Ok(AuditEntry {
            id: row.get(0)?,
            timestamp: row.get(1)?,
            user_id: row.get(2)?,
            username: row.get(3)?,
            action: row.get(4)?,
            entity: row.get(5)?,
            entity_id: row.get(6)?,
            detail: row.get(7)?,
        })
    })?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}
