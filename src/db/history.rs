//! Per-field change history for personnel and projects.

use crate::db::now_param;
use crate::errors::AppResult;
use crate::models::project::HistoryEntry;
use rusqlite::{Connection, params};

#[derive(Debug, Clone, Copy)]
pub enum HistoryTable {
    Personnel,
    Projects,
}

impl HistoryTable {
    fn table(&self) -> &'static str {
        match self {
            HistoryTable::Personnel => "personnel_history",
            HistoryTable::Projects => "project_history",
        }
    }

    fn key(&self) -> &'static str {
        match self {
            HistoryTable::Personnel => "person_id",
            HistoryTable::Projects => "project_id",
        }
    }

    fn parent(&self) -> &'static str {
        match self {
            HistoryTable::Personnel => "personnel",
            HistoryTable::Projects => "projects",
        }
    }
}

#[allow(clippy::too_many_arguments)]
pub fn insert_change(
    conn: &Connection,
    table: HistoryTable,
    entity_id: i64,
    action: &str,
    field: &str,
    old_value: Option<&str>,
    new_value: Option<&str>,
    username: &str,
) -> AppResult<()> {
    let sql = format!(
        "INSERT INTO {} ({}, timestamp, action, field, old_value, new_value, username)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        table.table(),
        table.key()
    );
    conn.execute(
        &sql,
        params![entity_id, now_param(), action, field, old_value, new_value, username],
    )?;
    Ok(())
}

/// Change history, newest first, optionally for a single entity.
pub fn list_changes(
    conn: &Connection,
    table: HistoryTable,
    entity_id: Option<i64>,
) -> AppResult<Vec<HistoryEntry>> {
    let sql = format!(
        "SELECT h.{key}, p.name, h.timestamp, h.action, h.field, h.old_value, h.new_value, h.username
         FROM {table} h
         JOIN {parent} p ON p.id = h.{key}
         WHERE ?1 IS NULL OR h.{key} = ?1
         ORDER BY h.id DESC",
        key = table.key(),
        table = table.table(),
        parent = table.parent()
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([entity_id], |row| {
        Ok(HistoryEntry {
            entity_id: row.get(0)?,
            entity_name: row.get(1)?,
            timestamp: row.get(2)?,
            action: row.get(3)?,
            field: row.get(4)?,
            old_value: row.get(5)?,
            new_value: row.get(6)?,
            username: row.get(7)?,
        })
    })?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}
