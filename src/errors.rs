//! Unified application error type.
//! All modules (db, core, cli, utils) return AppError to keep the error
//! handling consistent and easy to manage.

use chrono::{DateTime, Local};
use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    // ---------------------------
    // IO
    // ---------------------------
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    // ---------------------------
    // Database-related
    // ---------------------------
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("Database migration error: {0}")]
    Migration(String),

    // ---------------------------
    // Parsing errors
    // ---------------------------
    #[error("Invalid date format: {0}")]
    InvalidDate(String),

    #[error("Invalid date range: {0}")]
    InvalidRange(String),

    #[error("Invalid role: {0} (expected admin, manager or user)")]
    InvalidRole(String),

    #[error("Validation error: {0}")]
    Validation(String),

    // ---------------------------
    // Logic errors
    // ---------------------------
    #[error("{entity} #{id} not found")]
    NotFound { entity: &'static str, id: String },

    #[error("Assignment conflict: {0}")]
    Conflict(String),

    // ---------------------------
    // Auth errors
    // ---------------------------
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Account locked until {}", .0.format("%Y-%m-%d %H:%M"))]
    AccountLocked(DateTime<Local>),

    #[error("Permission denied: role '{role}' cannot {permission}")]
    PermissionDenied { role: String, permission: String },

    #[error("Password error: {0}")]
    Password(String),

    // ---------------------------
    // Import / export
    // ---------------------------
    #[error("Import error: {0}")]
    Import(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Export format not supported: {0}")]
    InvalidExportFormat(String),

    #[error("Export error: {0}")]
    Export(String),

    // ---------------------------
    // Config errors
    // ---------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Configuration parse error: {0}")]
    ConfigParse(#[from] serde_yaml::Error),

    // ---------------------------
    // Generic fallback
    // ---------------------------
    #[error("Internal error: {0}")]
    Other(String),
}

impl AppError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        AppError::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
