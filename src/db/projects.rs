use crate::db::{date_param, read_range};
use crate::errors::{AppError, AppResult};
use crate::models::project::Project;
use rusqlite::{Connection, OptionalExtension, Row, params};

const SELECT_PROJECT: &str =
    "SELECT id, name, code, status, start_date, end_date, confirmed, deleted FROM projects";

pub fn map_project(row: &Row) -> rusqlite::Result<Project> {
    Ok(Project {
        id: row.get("id")?,
        name: row.get("name")?,
        code: row.get("code")?,
        status: row.get("status")?,
        range: read_range(row, "start_date", "end_date")?,
        confirmed: row.get::<_, i64>("confirmed")? == 1,
        deleted: row.get::<_, i64>("deleted")? == 1,
    })
}

/// Insert a project; `project.id` is ignored.
pub fn insert_project(conn: &Connection, project: &Project) -> AppResult<i64> {
    conn.execute(
        "INSERT INTO projects (name, code, status, start_date, end_date, confirmed, deleted)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0)",
        params![
            project.name,
            project.code,
            project.status,
            date_param(project.range.start),
            date_param(project.range.end),
            project.confirmed as i64,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Fetch a project, including soft-deleted ones.
pub fn find_project(conn: &Connection, id: i64) -> AppResult<Option<Project>> {
    let mut stmt = conn.prepare_cached(&format!("{} WHERE id = ?1", SELECT_PROJECT))?;
    Ok(stmt.query_row([id], map_project).optional()?)
}

pub fn get_project(conn: &Connection, id: i64) -> AppResult<Project> {
    find_project(conn, id)?.ok_or_else(|| AppError::not_found("Project", id))
}

/// Like `get_project`, but soft-deleted projects count as missing.
pub fn get_live_project(conn: &Connection, id: i64) -> AppResult<Project> {
    match find_project(conn, id)? {
        Some(p) if !p.deleted => Ok(p),
        _ => Err(AppError::not_found("Project", id)),
    }
}

pub fn find_project_by_code(conn: &Connection, code: &str) -> AppResult<Option<Project>> {
    let mut stmt = conn.prepare_cached(&format!("{} WHERE code = ?1", SELECT_PROJECT))?;
    Ok(stmt.query_row([code], map_project).optional()?)
}

/// Projects ordered by start date, most recent first.
pub fn list_projects(conn: &Connection, include_deleted: bool) -> AppResult<Vec<Project>> {
    let filter = if include_deleted { "" } else { "WHERE deleted = 0" };
    let sql = format!("{} {} ORDER BY start_date DESC, id DESC", SELECT_PROJECT, filter);

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], map_project)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn update_project(conn: &Connection, project: &Project) -> AppResult<()> {
    conn.execute(
        "UPDATE projects
         SET name = ?1, code = ?2, status = ?3, start_date = ?4, end_date = ?5, confirmed = ?6
         WHERE id = ?7",
        params![
            project.name,
            project.code,
            project.status,
            date_param(project.range.start),
            date_param(project.range.end),
            project.confirmed as i64,
            project.id,
        ],
    )?;
    Ok(())
}

pub fn soft_delete_project(conn: &Connection, id: i64) -> AppResult<bool> {
    let changed = conn.execute(
        "UPDATE projects SET deleted = 1 WHERE id = ?1 AND deleted = 0",
        [id],
    )?;
    Ok(changed > 0)
}
