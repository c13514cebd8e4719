use crate::core::backup::snapshot_before_migration;
use crate::errors::{AppError, AppResult};
use crate::ui::messages::{success, warning};
use rusqlite::{Connection, OptionalExtension};

/// Ensure that the `log` table exists with the modern schema.
fn ensure_log_table(conn: &Connection) -> AppResult<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS log (
            id        INTEGER PRIMARY KEY AUTOINCREMENT,
            date      TEXT NOT NULL,
            operation TEXT NOT NULL,
            target    TEXT DEFAULT '',
            message   TEXT NOT NULL
        );
        "#,
    )?;
    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> AppResult<bool> {
    let mut stmt = conn.prepare("SELECT name FROM sqlite_master WHERE type='table' AND name=?1")?;
    let exists: Option<String> = stmt.query_row([table], |row| row.get(0)).optional()?;
    Ok(exists.is_some())
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> AppResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info('{}')", table))?;
    let cols = stmt.query_map([], |row| row.get::<_, String>(1))?;

    for c in cols {
        if c? == column {
            return Ok(true);
        }
    }
    Ok(false)
}

fn is_applied(conn: &Connection, version: &str) -> AppResult<bool> {
    let mut chk = conn.prepare(
        "SELECT 1 FROM log
         WHERE operation = 'migration_applied' AND target = ?1
         LIMIT 1",
    )?;
    Ok(chk.query_row([version], |_| Ok(())).optional()?.is_some())
}

fn mark_applied(conn: &Connection, version: &str, message: &str) -> AppResult<()> {
    conn.execute(
        "INSERT INTO log (date, operation, target, message)
         VALUES (datetime('now'), 'migration_applied', ?1, ?2)",
        [version, message],
    )?;
    Ok(())
}

const CORE_SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS personnel (
        id     INTEGER PRIMARY KEY AUTOINCREMENT,
        name   TEXT NOT NULL,
        title  TEXT,
        area   TEXT,
        active INTEGER NOT NULL DEFAULT 1
    );

    CREATE UNIQUE INDEX IF NOT EXISTS idx_personnel_name ON personnel(name COLLATE NOCASE);

    CREATE TABLE IF NOT EXISTS projects (
        id         INTEGER PRIMARY KEY AUTOINCREMENT,
        name       TEXT NOT NULL,
        code       TEXT UNIQUE,
        status     TEXT NOT NULL DEFAULT 'Active',
        start_date TEXT NOT NULL,
        end_date   TEXT NOT NULL,
        confirmed  INTEGER NOT NULL DEFAULT 0,
        deleted    INTEGER NOT NULL DEFAULT 0,
        CHECK (start_date <= end_date)
    );

    CREATE TABLE IF NOT EXISTS assignments (
        id         INTEGER PRIMARY KEY AUTOINCREMENT,
        person_id  INTEGER NOT NULL REFERENCES personnel(id),
        project_id INTEGER NOT NULL REFERENCES projects(id),
        start_date TEXT NOT NULL,
        end_date   TEXT NOT NULL,
        active     INTEGER NOT NULL DEFAULT 1,
        created_by TEXT NOT NULL DEFAULT '',
        created_at TEXT NOT NULL DEFAULT '',
        CHECK (start_date <= end_date)
    );
"#;

const USERS_AND_AUDIT: &str = r#"
    CREATE TABLE IF NOT EXISTS users (
        id                  INTEGER PRIMARY KEY AUTOINCREMENT,
        username            TEXT NOT NULL UNIQUE,
        password_hash       TEXT NOT NULL,
        role                TEXT NOT NULL CHECK(role IN ('admin','manager','user')),
        active              INTEGER NOT NULL DEFAULT 1,
        failed_attempts     INTEGER NOT NULL DEFAULT 0,
        locked_until        TEXT,
        reset_token_hash    TEXT,
        reset_token_expires TEXT,
        created_at          TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS audit (
        id        INTEGER PRIMARY KEY AUTOINCREMENT,
        timestamp TEXT NOT NULL,
        user_id   INTEGER,
        username  TEXT NOT NULL DEFAULT '',
        action    TEXT NOT NULL,
        entity    TEXT NOT NULL,
        entity_id INTEGER,
        detail    TEXT NOT NULL DEFAULT ''
    );

    CREATE INDEX IF NOT EXISTS idx_audit_timestamp ON audit(timestamp);
"#;

const HISTORY_TABLES: &str = r#"
    CREATE TABLE IF NOT EXISTS personnel_history (
        id        INTEGER PRIMARY KEY AUTOINCREMENT,
        person_id INTEGER NOT NULL REFERENCES personnel(id),
        timestamp TEXT NOT NULL,
        action    TEXT NOT NULL,
        field     TEXT NOT NULL,
        old_value TEXT,
        new_value TEXT,
        username  TEXT NOT NULL DEFAULT ''
    );

    CREATE TABLE IF NOT EXISTS project_history (
        id         INTEGER PRIMARY KEY AUTOINCREMENT,
        project_id INTEGER NOT NULL REFERENCES projects(id),
        timestamp  TEXT NOT NULL,
        action     TEXT NOT NULL,
        field      TEXT NOT NULL,
        old_value  TEXT,
        new_value  TEXT,
        username   TEXT NOT NULL DEFAULT ''
    );
"#;

const ASSIGNMENT_INDEXES: &str = r#"
    CREATE INDEX IF NOT EXISTS idx_assignments_person ON assignments(person_id, active);
    CREATE INDEX IF NOT EXISTS idx_assignments_project ON assignments(project_id);
    CREATE INDEX IF NOT EXISTS idx_assignments_dates ON assignments(start_date, end_date);
"#;

/// Run a plain SQL migration once.
fn migrate_batch(conn: &Connection, version: &str, message: &str, sql: &str) -> AppResult<()> {
    if is_applied(conn, version)? {
        return Ok(());
    }

    conn.execute_batch(sql)
        .map_err(|e| AppError::Migration(format!("{}: {}", version, e)))?;
    mark_applied(conn, version, message)?;

    success(format!("Migration applied: {} → {}", version, message));
    Ok(())
}

/// Databases created before the soft-delete flag existed keep every
/// assignment; add the `active` column so they are all treated as active.
fn migrate_assignment_active_flag(conn: &Connection) -> AppResult<()> {
    let version = "20250301_0004_assignment_active_flag";

    if is_applied(conn, version)? {
        return Ok(());
    }

    let columns = [
        ("active", "INTEGER NOT NULL DEFAULT 1"),
        ("created_by", "TEXT NOT NULL DEFAULT ''"),
        ("created_at", "TEXT NOT NULL DEFAULT ''"),
    ];

    for (column, decl) in columns {
        if table_has_column(conn, "assignments", column)? {
            continue;
        }
        warning(format!("Adding '{}' column to assignments table...", column));
        conn.execute(
            &format!("ALTER TABLE assignments ADD COLUMN {} {}", column, decl),
            [],
        )
        .map_err(|e| AppError::Migration(format!("Failed to add '{}' column: {}", column, e)))?;
    }

    conn.execute_batch(ASSIGNMENT_INDEXES)?;
    mark_applied(conn, version, "Assignment soft-delete flag and indexes")?;

    success(format!(
        "Migration applied: {} → assignments have an 'active' flag",
        version
    ));
    Ok(())
}

/// A database carrying an `assignments` table without the `active` column
/// predates the soft-delete flag.
fn is_legacy_schema(conn: &Connection) -> AppResult<bool> {
    Ok(table_exists(conn, "assignments")? && !table_has_column(conn, "assignments", "active")?)
}

/// Public entry point: run all pending migrations.
///
/// Invoked by db::init_db().
pub fn run_pending_migrations(conn: &Connection) -> AppResult<()> {
    ensure_log_table(conn)?;

    if is_legacy_schema(conn)? {
        warning("Legacy schema detected, creating safety backup before migration...");

        let db_path: String = conn
            .query_row("PRAGMA database_list;", [], |row| row.get::<_, String>(2))
            .unwrap_or_default();

        if db_path.is_empty() {
            warning("Could not determine DB path, backup skipped.");
        } else {
            snapshot_before_migration(&db_path)?;
        }
    }

    migrate_batch(
        conn,
        "20250110_0001_core_schema",
        "Created personnel, projects and assignments tables",
        CORE_SCHEMA,
    )?;
    migrate_batch(
        conn,
        "20250110_0002_users_and_audit",
        "Created users and audit tables",
        USERS_AND_AUDIT,
    )?;
    migrate_batch(
        conn,
        "20250214_0003_history_tables",
        "Created personnel_history and project_history tables",
        HISTORY_TABLES,
    )?;
    migrate_assignment_active_flag(conn)?;

    Ok(())
}
