use crate::db::{date_param, now_param, read_range};
use crate::errors::{AppError, AppResult};
use crate::models::assignment::{Assignment, AssignmentView};
use crate::models::date_range::DateRange;
use rusqlite::types::Value;
use rusqlite::{Connection, OptionalExtension, Row, params, params_from_iter};

/// Closed-interval overlap of assignment `a` with `[start, end]`, where
/// `start` and `end` are the SQL placeholders of the two bounds. The single
/// definition behind every conflict, availability and window query.
pub fn overlap_clause(start: &str, end: &str) -> String {
    format!("a.start_date <= {end} AND a.end_date >= {start}")
}

/// Active assignment on a project that has not been soft-deleted.
pub const LIVE_PREDICATE: &str = "a.active = 1 AND pr.deleted = 0";

const SELECT_VIEW: &str = "
    SELECT a.id, a.person_id, pe.name AS person, a.project_id, pr.name AS project,
           pr.confirmed, a.start_date, a.end_date, a.active
    FROM assignments a
    JOIN personnel pe ON pe.id = a.person_id
    JOIN projects pr ON pr.id = a.project_id";

pub fn map_assignment(row: &Row) -> rusqlite::Result<Assignment> {
    Ok(Assignment {
        id: row.get("id")?,
        person_id: row.get("person_id")?,
        project_id: row.get("project_id")?,
        range: read_range(row, "start_date", "end_date")?,
        active: row.get::<_, i64>("active")? == 1,
    })
}

pub fn map_view(row: &Row) -> rusqlite::Result<AssignmentView> {
    Ok(AssignmentView {
        id: row.get("id")?,
        person_id: row.get("person_id")?,
        person: row.get("person")?,
        project_id: row.get("project_id")?,
        project: row.get("project")?,
        confirmed: row.get::<_, i64>("confirmed")? == 1,
        range: read_range(row, "start_date", "end_date")?,
        active: row.get::<_, i64>("active")? == 1,
    })
}

pub fn insert_assignment(
    conn: &Connection,
    person_id: i64,
    project_id: i64,
    range: &DateRange,
    created_by: &str,
) -> AppResult<i64> {
    conn.execute(
        "INSERT INTO assignments (person_id, project_id, start_date, end_date, active, created_by, created_at)
         VALUES (?1, ?2, ?3, ?4, 1, ?5, ?6)",
        params![
            person_id,
            project_id,
            date_param(range.start),
            date_param(range.end),
            created_by,
            now_param(),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn find_assignment(conn: &Connection, id: i64) -> AppResult<Option<Assignment>> {
    let mut stmt = conn.prepare_cached(
        "SELECT id, person_id, project_id, start_date, end_date, active FROM assignments WHERE id = ?1",
    )?;
    Ok(stmt.query_row([id], map_assignment).optional()?)
}

pub fn get_assignment(conn: &Connection, id: i64) -> AppResult<Assignment> {
    find_assignment(conn, id)?.ok_or_else(|| AppError::not_found("Assignment", id))
}

/// Soft delete. Returns false when the assignment was already inactive.
pub fn deactivate_assignment(conn: &Connection, id: i64) -> AppResult<bool> {
    let changed = conn.execute(
        "UPDATE assignments SET active = 0 WHERE id = ?1 AND active = 1",
        [id],
    )?;
    Ok(changed > 0)
}

/// Active assignments of a project whose range is not inside `range`.
pub fn count_outside_range(conn: &Connection, project_id: i64, range: &DateRange) -> AppResult<i64> {
    let n = conn.query_row(
        "SELECT COUNT(*) FROM assignments
         WHERE project_id = ?1 AND active = 1
           AND (start_date < ?2 OR end_date > ?3)",
        params![project_id, date_param(range.start), date_param(range.end)],
        |row| row.get(0),
    )?;
    Ok(n)
}

#[derive(Debug, Clone, Default)]
pub struct AssignmentFilter {
    pub person_id: Option<i64>,
    pub person_name: Option<String>,
    pub project_id: Option<i64>,
    /// Keep only assignments intersecting this window.
    pub window: Option<DateRange>,
    /// Also list soft-deleted assignments and those of deleted projects.
    pub include_inactive: bool,
}

pub fn list_views(conn: &Connection, filter: &AssignmentFilter) -> AppResult<Vec<AssignmentView>> {
    let mut clauses: Vec<String> = Vec::new();
    let mut values: Vec<Value> = Vec::new();

    if !filter.include_inactive {
        clauses.push(LIVE_PREDICATE.to_string());
    }
    if let Some(id) = filter.person_id {
        values.push(Value::Integer(id));
        clauses.push(format!("a.person_id = ?{}", values.len()));
    }
    if let Some(name) = &filter.person_name {
        values.push(Value::Text(name.trim().to_string()));
        clauses.push(format!("LOWER(pe.name) = LOWER(?{})", values.len()));
    }
    if let Some(id) = filter.project_id {
        values.push(Value::Integer(id));
        clauses.push(format!("a.project_id = ?{}", values.len()));
    }
    if let Some(w) = &filter.window {
        values.push(Value::Text(date_param(w.start)));
        values.push(Value::Text(date_param(w.end)));
        let n = values.len();
        clauses.push(overlap_clause(&format!("?{}", n - 1), &format!("?{}", n)));
    }

    let where_sql = if clauses.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", clauses.join(" AND "))
    };

    let sql = format!(
        "{}{} ORDER BY pe.name COLLATE NOCASE, a.start_date, a.id",
        SELECT_VIEW, where_sql
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(values), map_view)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}
