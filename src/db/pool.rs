//! SQLite connection wrapper (lightweight for CLI usage).

use crate::config::Config;
use crate::errors::{AppError, AppResult};
use rusqlite::Connection;
use std::path::Path;
use std::time::Duration;

pub struct DbPool {
    pub conn: Connection,
}

impl DbPool {
    /// Open the configured database with its busy timeout. The file must
    /// already exist (created by `init`).
    pub fn open(cfg: &Config) -> AppResult<Self> {
        let path = Path::new(&cfg.database);
        if !path.exists() {
            return Err(AppError::Config(format!(
                "Database not found: {} (run `rstaffplan init` first)",
                path.display()
            )));
        }

        let conn = Connection::open(path)?;
        Self::configure(conn, Duration::from_millis(cfg.busy_timeout_ms))
    }

    pub fn in_memory() -> AppResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::configure(conn, Duration::from_millis(0))
    }

    fn configure(conn: Connection, busy: Duration) -> AppResult<Self> {
        conn.busy_timeout(busy)?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(Self { conn })
    }
}
