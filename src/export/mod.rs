// src/export/mod.rs

mod excel_date;
pub(crate) mod fs_utils;
mod json_csv;
pub mod logic;
pub mod model;
pub(crate) mod range;
mod xlsx;

pub use logic::ExportLogic;

use crate::ui::messages::success;
use clap::ValueEnum;
use std::path::Path;

/// Common completion message for every export format.
pub(crate) fn notify_export_success(label: &str, path: &Path) {
    success(format!("{label} export completed: {}", path.display()));
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Csv,
    Json,
    Xlsx,
}

impl ExportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
            ExportFormat::Xlsx => "xlsx",
        }
    }
}

/// Which table to export.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ExportTarget {
    Personnel,
    Projects,
    Assignments,
}

impl ExportTarget {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportTarget::Personnel => "personnel",
            ExportTarget::Projects => "projects",
            ExportTarget::Assignments => "assignments",
        }
    }
}
