//! User administration and self-service account operations.

use crate::config::Config;
use crate::core::audit;
use crate::core::auth::Session;
use crate::core::password::{hash_password, validate_password_strength, verify_password};
use crate::db::users::{
    clear_lockout, count_users, find_user_by_name, get_user_by_name, insert_user, list_users,
    set_active, set_password, set_reset_token, set_role,
};
use crate::errors::{AppError, AppResult};
use crate::models::audit::{AuditAction, AuditEntity};
use crate::models::role::{Permission, Role};
use crate::models::user::User;
use chrono::{DateTime, Duration, Local};
use rusqlite::Connection;
use uuid::Uuid;

fn require_username(username: &str) -> AppResult<&str> {
    let username = username.trim();
    if username.is_empty() {
        return Err(AppError::Validation("Username is required".into()));
    }
    Ok(username)
}

fn record(conn: &Connection, session: Option<&Session>, action: AuditAction, id: i64, detail: &str) {
    audit::record(conn, session, action, AuditEntity::User, Some(id), detail);
}

pub struct UserLogic;

impl UserLogic {
    /// Create the first admin account. Only allowed while the users table
    /// is empty.
    pub fn bootstrap_admin(
        conn: &Connection,
        cfg: &Config,
        username: &str,
        password: &str,
    ) -> AppResult<i64> {
        if count_users(conn)? > 0 {
            return Err(AppError::Validation("Users already exist".into()));
        }

        let username = require_username(username)?;
        validate_password_strength(password, cfg.min_password_length)?;

        let id = insert_user(conn, username, &hash_password(password)?, Role::Admin)?;
        record(
            conn,
            None,
            AuditAction::Create,
            id,
            &format!("Bootstrap admin '{}'", username),
        );
        Ok(id)
    }

    pub fn create(
        conn: &Connection,
        cfg: &Config,
        session: &Session,
        username: &str,
        role: Role,
        password: &str,
    ) -> AppResult<i64> {
        session.require(Permission::ManageUsers)?;

        let username = require_username(username)?;
        if find_user_by_name(conn, username)?.is_some() {
            return Err(AppError::Validation(format!(
                "User '{}' already exists",
                username
            )));
        }
        validate_password_strength(password, cfg.min_password_length)?;

        let id = insert_user(conn, username, &hash_password(password)?, role)?;
        record(
            conn,
            Some(session),
            AuditAction::Create,
            id,
            &format!("Created user '{}' with role {}", username, role),
        );
        Ok(id)
    }

    pub fn list(conn: &Connection, session: &Session) -> AppResult<Vec<User>> {
        session.require(Permission::ManageUsers)?;
        list_users(conn)
    }

    pub fn change_role(conn: &Connection, session: &Session, username: &str, role: Role) -> AppResult<()> {
        session.require(Permission::ManageUsers)?;

        let user = get_user_by_name(conn, username)?;
        if user.id == session.user_id && user.role == Role::Admin && role != Role::Admin {
            return Err(AppError::Validation(
                "You cannot remove your own admin role".into(),
            ));
        }
        if user.role == role {
            return Ok(());
        }

        set_role(conn, user.id, role)?;
        record(
            conn,
            Some(session),
            AuditAction::Edit,
            user.id,
            &format!("Role of '{}': {} → {}", user.username, user.role, role),
        );
        Ok(())
    }

    pub fn set_active(conn: &Connection, session: &Session, username: &str, active: bool) -> AppResult<()> {
        session.require(Permission::ManageUsers)?;

        let user = get_user_by_name(conn, username)?;
        if !active && user.id == session.user_id {
            return Err(AppError::Validation("You cannot disable yourself".into()));
        }
        if user.active == active {
            return Ok(());
        }

        set_active(conn, user.id, active)?;
        record(
            conn,
            Some(session),
            AuditAction::Edit,
            user.id,
            &format!(
                "{} user '{}'",
                if active { "Enabled" } else { "Disabled" },
                user.username
            ),
        );
        Ok(())
    }

    pub fn reset_password(
        conn: &Connection,
        cfg: &Config,
        session: &Session,
        username: &str,
        password: &str,
    ) -> AppResult<()> {
        session.require(Permission::ManageUsers)?;

        let user = get_user_by_name(conn, username)?;
        validate_password_strength(password, cfg.min_password_length)?;
        set_password(conn, user.id, &hash_password(password)?)?;

        record(
            conn,
            Some(session),
            AuditAction::Edit,
            user.id,
            &format!("Password reset for '{}'", user.username),
        );
        Ok(())
    }

    pub fn unlock(conn: &Connection, session: &Session, username: &str) -> AppResult<()> {
        session.require(Permission::ManageUsers)?;

        let user = get_user_by_name(conn, username)?;
        clear_lockout(conn, user.id)?;
        record(
            conn,
            Some(session),
            AuditAction::Edit,
            user.id,
            &format!("Unlocked '{}'", user.username),
        );
        Ok(())
    }

    /// Issue a one-time reset token. Only its hash is stored; the plain
    /// token is returned so it can be shown once.
    pub fn issue_reset_token(
        conn: &Connection,
        cfg: &Config,
        session: &Session,
        username: &str,
        now: DateTime<Local>,
    ) -> AppResult<(String, DateTime<Local>)> {
        session.require(Permission::ManageUsers)?;

        let user = get_user_by_name(conn, username)?;
        let token = Uuid::new_v4().to_string();
        let expires = now + Duration::minutes(cfg.reset_token_minutes);

        set_reset_token(conn, user.id, &hash_password(&token)?, expires)?;
        record(
            conn,
            Some(session),
            AuditAction::Edit,
            user.id,
            &format!("Reset token issued for '{}'", user.username),
        );
        Ok((token, expires))
    }

    /// Unauthenticated: replace the password of `username` with a valid,
    /// unexpired reset token. Any failure is reported as invalid
    /// credentials.
    pub fn redeem_token(
        conn: &Connection,
        cfg: &Config,
        username: &str,
        token: &str,
        new_password: &str,
        now: DateTime<Local>,
    ) -> AppResult<()> {
        let user = find_user_by_name(conn, username.trim())?.ok_or(AppError::InvalidCredentials)?;

        let (Some(hash), Some(expires)) = (&user.reset_token_hash, user.reset_token_expires) else {
            return Err(AppError::InvalidCredentials);
        };
        if now > expires || !verify_password(token.trim(), hash)? {
            return Err(AppError::InvalidCredentials);
        }

        validate_password_strength(new_password, cfg.min_password_length)?;
        set_password(conn, user.id, &hash_password(new_password)?)?;

        record(
            conn,
            None,
            AuditAction::Edit,
            user.id,
            &format!("Password of '{}' reset with token", user.username),
        );
        Ok(())
    }

    /// Any logged-in user may change their own password.
    pub fn change_own_password(
        conn: &Connection,
        cfg: &Config,
        session: &Session,
        new_password: &str,
        confirm: &str,
    ) -> AppResult<()> {
        if new_password != confirm {
            return Err(AppError::Password("Passwords do not match".into()));
        }
        validate_password_strength(new_password, cfg.min_password_length)?;
        set_password(conn, session.user_id, &hash_password(new_password)?)?;

        record(
            conn,
            Some(session),
            AuditAction::Edit,
            session.user_id,
            "Changed own password",
        );
        Ok(())
    }
}
