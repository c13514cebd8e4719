//! Login with failed-attempt lockout, and the per-invocation session.

use crate::config::Config;
use crate::core::audit;
use crate::core::password::verify_password;
use crate::db::users::{clear_lockout, find_user_by_name, record_failed_attempt};
use crate::errors::{AppError, AppResult};
use crate::models::audit::{AuditAction, AuditEntity};
use crate::models::role::{Permission, Role};
use chrono::{DateTime, Duration, Local};
use rusqlite::Connection;

/// Authenticated user for the current command. Handlers receive it
/// explicitly instead of reading global state.
#[derive(Debug, Clone)]
pub struct Session {
    pub user_id: i64,
    pub username: String,
    pub role: Role,
}

impl Session {
    pub fn can(&self, permission: Permission) -> bool {
        self.role.can(permission)
    }

    pub fn require(&self, permission: Permission) -> AppResult<()> {
        if self.can(permission) {
            Ok(())
        } else {
            Err(AppError::PermissionDenied {
                role: self.role.to_string(),
                permission: permission.describe().to_string(),
            })
        }
    }
}

pub fn login(conn: &Connection, cfg: &Config, username: &str, password: &str) -> AppResult<Session> {
    login_at(conn, cfg, username, password, Local::now())
}

/// Same as [`login`] with an explicit clock.
pub fn login_at(
    conn: &Connection,
    cfg: &Config,
    username: &str,
    password: &str,
    now: DateTime<Local>,
) -> AppResult<Session> {
    let username = username.trim();
    let refused = |user_id: Option<i64>, detail: &str| {
        audit::record_as(
            conn,
            user_id,
            username,
            AuditAction::LoginFailed,
            AuditEntity::User,
            user_id,
            detail,
        );
    };

    let user = match find_user_by_name(conn, username)? {
        Some(u) if u.active => u,
        Some(u) => {
            tracing::debug!(username, "login refused: inactive user");
            refused(Some(u.id), "Login refused: account disabled");
            return Err(AppError::InvalidCredentials);
        }
        None => {
            tracing::debug!(username, "login refused: unknown user");
            refused(None, "Login refused: unknown user");
            return Err(AppError::InvalidCredentials);
        }
    };

    if user.is_locked(now)
        && let Some(until) = user.locked_until
    {
        refused(Some(user.id), "Login refused: account locked");
        return Err(AppError::AccountLocked(until));
    }

    if !verify_password(password, &user.password_hash)? {
        let attempts = user.failed_attempts + 1;
        let locked_until = (attempts >= cfg.max_failed_logins)
            .then(|| now + Duration::minutes(cfg.lockout_minutes));

        record_failed_attempt(conn, user.id, attempts, locked_until)?;

        let detail = match locked_until {
            Some(until) => format!(
                "Failed login #{attempts}; locked until {}",
                until.format("%Y-%m-%d %H:%M")
            ),
            None => format!("Failed login #{attempts}"),
        };
        tracing::info!(username = %user.username, attempts, "failed login");
        refused(Some(user.id), &detail);

        return Err(AppError::InvalidCredentials);
    }

    clear_lockout(conn, user.id)?;

    let session = Session {
        user_id: user.id,
        username: user.username,
        role: user.role,
    };

    audit::record(
        conn,
        Some(&session),
        AuditAction::Login,
        AuditEntity::User,
        Some(session.user_id),
        "Login",
    );

    Ok(session)
}
