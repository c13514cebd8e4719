pub mod account;
pub mod assign;
pub mod audit;
pub mod backup;
pub mod calendar;
pub mod config;
pub mod dashboard;
pub mod db;
pub mod export;
pub mod init;
pub mod log;
pub mod person;
pub mod project;
pub mod user;

use crate::cli::parser::Cli;
use crate::config::Config;
use crate::core::auth::{Session, login};
use crate::db::pool::DbPool;
use crate::errors::{AppError, AppResult};

/// Open the database and log in with `--user/--password`
/// (or `RSTAFFPLAN_USER` / `RSTAFFPLAN_PASSWORD`).
pub(crate) fn open_session(cli: &Cli, cfg: &Config) -> AppResult<(DbPool, Session)> {
    let (Some(user), Some(password)) = (cli.user.as_deref(), cli.password.as_deref()) else {
        return Err(AppError::Validation(
            "login required: pass --user and --password (or set RSTAFFPLAN_USER / RSTAFFPLAN_PASSWORD)"
                .into(),
        ));
    };

    let pool = DbPool::open(cfg)?;
    let session = login(&pool.conn, cfg, user, password)?;
    tracing::debug!(user = %session.username, role = %session.role, "logged in");
    Ok((pool, session))
}
