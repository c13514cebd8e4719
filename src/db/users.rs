use crate::db::{now_param, read_timestamp};
use crate::errors::{AppError, AppResult};
use crate::models::role::Role;
use crate::models::user::User;
use chrono::{DateTime, Local};
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row, params};

const SELECT_USER: &str = "
    SELECT id, username, password_hash, role, active, failed_attempts,
           locked_until, reset_token_hash, reset_token_expires
    FROM users";

pub fn map_user(row: &Row) -> rusqlite::Result<User> {
    let role_str: String = row.get("role")?;
    let role = Role::from_db_str(&role_str).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            0,
            Type::Text,
            Box::new(AppError::InvalidRole(role_str.clone())),
        )
    })?;

    Ok(User {
        id: row.get("id")?,
        username: row.get("username")?,
        password_hash: row.get("password_hash")?,
        role,
        active: row.get::<_, i64>("active")? == 1,
        failed_attempts: row.get("failed_attempts")?,
        locked_until: read_timestamp(row, "locked_until")?,
        reset_token_hash: row.get("reset_token_hash")?,
        reset_token_expires: read_timestamp(row, "reset_token_expires")?,
    })
}

pub fn insert_user(conn: &Connection, username: &str, password_hash: &str, role: Role) -> AppResult<i64> {
    conn.execute(
        "INSERT INTO users (username, password_hash, role, active, failed_attempts, created_at)
         VALUES (?1, ?2, ?3, 1, 0, ?4)",
        params![username, password_hash, role.to_db_str(), now_param()],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn find_user_by_name(conn: &Connection, username: &str) -> AppResult<Option<User>> {
    let mut stmt = conn.prepare_cached(&format!("{} WHERE username = ?1", SELECT_USER))?;
    Ok(stmt.query_row([username], map_user).optional()?)
}

pub fn get_user_by_name(conn: &Connection, username: &str) -> AppResult<User> {
    find_user_by_name(conn, username)?.ok_or_else(|| AppError::not_found("User", username))
}

pub fn list_users(conn: &Connection) -> AppResult<Vec<User>> {
    let mut stmt = conn.prepare(&format!("{} ORDER BY username", SELECT_USER))?;
    let rows = stmt.query_map([], map_user)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn count_users(conn: &Connection) -> AppResult<i64> {
    Ok(conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?)
}

pub fn record_failed_attempt(
    conn: &Connection,
    id: i64,
    attempts: i64,
    locked_until: Option<DateTime<Local>>,
) -> AppResult<()> {
    conn.execute(
        "UPDATE users SET failed_attempts = ?1, locked_until = ?2 WHERE id = ?3",
        params![attempts, locked_until.map(|t| t.to_rfc3339()), id],
    )?;
    Ok(())
}

pub fn clear_lockout(conn: &Connection, id: i64) -> AppResult<()> {
    conn.execute(
        "UPDATE users SET failed_attempts = 0, locked_until = NULL WHERE id = ?1",
        [id],
    )?;
    Ok(())
}

/// Replace the password hash; also clears lockout and any pending reset token.
pub fn set_password(conn: &Connection, id: i64, password_hash: &str) -> AppResult<()> {
    conn.execute(
        "UPDATE users
         SET password_hash = ?1, failed_attempts = 0, locked_until = NULL,
             reset_token_hash = NULL, reset_token_expires = NULL
         WHERE id = ?2",
        params![password_hash, id],
    )?;
    Ok(())
}

pub fn set_role(conn: &Connection, id: i64, role: Role) -> AppResult<()> {
    conn.execute(
        "UPDATE users SET role = ?1 WHERE id = ?2",
        params![role.to_db_str(), id],
    )?;
    Ok(())
}

pub fn set_active(conn: &Connection, id: i64, active: bool) -> AppResult<()> {
    conn.execute(
        "UPDATE users SET active = ?1 WHERE id = ?2",
        params![active as i64, id],
    )?;
    Ok(())
}

pub fn set_reset_token(
    conn: &Connection,
    id: i64,
    token_hash: &str,
    expires: DateTime<Local>,
) -> AppResult<()> {
    conn.execute(
        "UPDATE users SET reset_token_hash = ?1, reset_token_expires = ?2 WHERE id = ?3",
        params![token_hash, expires.to_rfc3339(), id],
    )?;
    Ok(())
}
