use crate::errors::{AppError, AppResult};
use crate::models::person::Person;
use rusqlite::{Connection, OptionalExtension, Row, params};

const SELECT_PERSON: &str = "SELECT id, name, title, area, active FROM personnel";

pub fn map_person(row: &Row) -> rusqlite::Result<Person> {
    Ok(Person {
        id: row.get("id")?,
        name: row.get("name")?,
        title: row.get("title")?,
        area: row.get("area")?,
        active: row.get::<_, i64>("active")? == 1,
    })
}

pub fn insert_person(
    conn: &Connection,
    name: &str,
    title: Option<&str>,
    area: Option<&str>,
) -> AppResult<i64> {
    conn.execute(
        "INSERT INTO personnel (name, title, area, active) VALUES (?1, ?2, ?3, 1)",
        params![name, title, area],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn find_person(conn: &Connection, id: i64) -> AppResult<Option<Person>> {
    let mut stmt = conn.prepare_cached(&format!("{} WHERE id = ?1", SELECT_PERSON))?;
    Ok(stmt.query_row([id], map_person).optional()?)
}

pub fn get_person(conn: &Connection, id: i64) -> AppResult<Person> {
    find_person(conn, id)?.ok_or_else(|| AppError::not_found("Person", id))
}

/// Case-insensitive lookup by name.
pub fn find_person_by_name(conn: &Connection, name: &str) -> AppResult<Option<Person>> {
    let mut stmt = conn.prepare_cached(&format!(
        "{} WHERE LOWER(name) = LOWER(?1) LIMIT 1",
        SELECT_PERSON
    ))?;
    Ok(stmt.query_row([name.trim()], map_person).optional()?)
}

pub fn list_personnel(conn: &Connection, include_inactive: bool) -> AppResult<Vec<Person>> {
    let sql = if include_inactive {
        format!("{} ORDER BY name COLLATE NOCASE", SELECT_PERSON)
    } else {
        format!("{} WHERE active = 1 ORDER BY name COLLATE NOCASE", SELECT_PERSON)
    };

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], map_person)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn update_person(conn: &Connection, person: &Person) -> AppResult<()> {
    conn.execute(
        "UPDATE personnel SET name = ?1, title = ?2, area = ?3, active = ?4 WHERE id = ?5",
        params![
            person.name,
            person.title,
            person.area,
            person.active as i64,
            person.id
        ],
    )?;
    Ok(())
}
