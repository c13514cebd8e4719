// src/export/logic.rs

use crate::core::auth::Session;
use crate::db::assignments::{AssignmentFilter, list_views};
use crate::db::personnel::list_personnel;
use crate::db::pool::DbPool;
use crate::db::projects::list_projects;
use crate::errors::{AppError, AppResult};
use crate::export::fs_utils::ensure_writable;
use crate::export::json_csv::{export_csv, export_json};
use crate::export::model::{AssignmentExport, ExportRecord, PersonExport, ProjectExport};
use crate::export::range::parse_range;
use crate::export::xlsx::export_xlsx;
use crate::export::{ExportFormat, ExportTarget};
use crate::models::date_range::DateRange;
use crate::models::role::Permission;
use crate::ui::messages::warning;
use std::path::Path;

fn write<T: ExportRecord>(records: &[T], format: ExportFormat, path: &Path, sheet: &str) -> AppResult<()> {
    match format {
        ExportFormat::Csv => export_csv(records, path),
        ExportFormat::Json => export_json(records, path),
        ExportFormat::Xlsx => export_xlsx(records, path, sheet),
    }
}

/// High-level export entry point.
pub struct ExportLogic;

impl ExportLogic {
    /// Export one table.
    ///
    /// - `file`: absolute output path
    /// - `range`: `None`, `"all"`, or `YYYY`, `YYYY-MM`, `YYYY-MM-DD` and
    ///   `start:end` pairs of the same shape. Projects and assignments are
    ///   kept when they intersect the range; personnel ignore it.
    ///
    /// Returns the number of exported records.
    pub fn export(
        pool: &mut DbPool,
        session: &Session,
        what: ExportTarget,
        format: ExportFormat,
        file: &str,
        range: Option<&str>,
        force: bool,
    ) -> AppResult<usize> {
        session.require(Permission::ViewDashboard)?;

        let path = Path::new(file);
        if !path.is_absolute() {
            return Err(AppError::Export(format!(
                "Output file path must be absolute: {file}"
            )));
        }

        let window: Option<DateRange> = match range {
            None => None,
            Some(r) if r.eq_ignore_ascii_case("all") => None,
            Some(r) => Some(parse_range(r)?),
        };

        ensure_writable(path, force)?;

        let conn = &pool.conn;
        let count = match what {
            ExportTarget::Personnel => {
                let rows: Vec<PersonExport> = list_personnel(conn, true)?
                    .into_iter()
                    .map(PersonExport::from)
                    .collect();
                write(&rows, format, path, what.as_str())?;
                rows.len()
            }
            ExportTarget::Projects => {
                let rows: Vec<ProjectExport> = list_projects(conn, false)?
                    .into_iter()
                    .filter(|p| window.is_none_or(|w| w.overlaps(&p.range)))
                    .map(ProjectExport::from)
                    .collect();
                write(&rows, format, path, what.as_str())?;
                rows.len()
            }
            ExportTarget::Assignments => {
                let filter = AssignmentFilter {
                    window,
                    ..Default::default()
                };
                let rows: Vec<AssignmentExport> = list_views(conn, &filter)?
                    .into_iter()
                    .map(AssignmentExport::from)
                    .collect();
                write(&rows, format, path, what.as_str())?;
                rows.len()
            }
        };

        if count == 0 {
            warning(format!("No {} found for the selected range.", what.as_str()));
        }

        Ok(count)
    }
}
