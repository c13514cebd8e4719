//! Bulk personnel import from CSV.
//!
//! The file is read into an [`ImportPlan`] first, so a dry run can show
//! exactly what would change. Applying the plan happens in one
//! transaction with a single audit entry for the totals.

use crate::core::audit;
use crate::core::auth::Session;
use crate::core::personnel::record_person_diff;
use crate::db::history::{HistoryTable, insert_change};
use crate::db::personnel::{find_person_by_name, insert_person, update_person};
use crate::db::pool::DbPool;
use crate::errors::{AppError, AppResult};
use crate::models::audit::{AuditAction, AuditEntity};
use crate::models::person::Person;
use crate::models::role::Permission;
use rusqlite::{Connection, TransactionBehavior};
use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;

const HISTORY_ACTION: &str = "BULK_IMPORT";

const NAME_HEADERS: &[&str] = &["nombre", "name"];
const TITLE_HEADERS: &[&str] = &["cargo", "title"];
const AREA_HEADERS: &[&str] = &["area"];

#[derive(Debug, Clone)]
pub enum ImportAction {
    Insert {
        name: String,
        title: Option<String>,
        area: Option<String>,
    },
    Update {
        before: Person,
        after: Person,
    },
    Skip {
        line: usize,
        reason: String,
    },
}

#[derive(Debug, Clone, Default)]
pub struct ImportPlan {
    pub actions: Vec<ImportAction>,
    /// Rows that could not be decoded; the import goes on without them.
    pub errors: Vec<String>,
}

impl ImportPlan {
    pub fn inserts(&self) -> usize {
        self.count(|a| matches!(a, ImportAction::Insert { .. }))
    }

    pub fn updates(&self) -> usize {
        self.count(|a| matches!(a, ImportAction::Update { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|a| matches!(a, ImportAction::Skip { .. }))
    }

    pub fn has_changes(&self) -> bool {
        self.inserts() + self.updates() > 0
    }

    fn count(&self, pred: impl Fn(&ImportAction) -> bool) -> usize {
        self.actions.iter().filter(|a| pred(a)).count()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub inserted: usize,
    pub updated: usize,
}

fn find_column(headers: &csv::StringRecord, names: &[&str]) -> Option<usize> {
    headers
        .iter()
        .position(|h| names.iter().any(|n| h.trim().eq_ignore_ascii_case(n)))
}

fn optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

pub struct ImportLogic;

impl ImportLogic {
    pub fn plan_file(conn: &Connection, session: &Session, path: &Path) -> AppResult<ImportPlan> {
        let file = File::open(path)
            .map_err(|e| AppError::Import(format!("cannot open {}: {}", path.display(), e)))?;
        Self::plan(conn, session, file)
    }

    /// Compare every CSV row with the stored personnel. Nothing is written.
    pub fn plan<R: Read>(conn: &Connection, session: &Session, reader: R) -> AppResult<ImportPlan> {
        session.require(Permission::EditPersonnel)?;

        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);

        let headers = rdr.headers()?.clone();
        let (name_col, title_col, area_col) = match (
            find_column(&headers, NAME_HEADERS),
            find_column(&headers, TITLE_HEADERS),
            find_column(&headers, AREA_HEADERS),
        ) {
            (Some(n), Some(t), Some(a)) => (n, t, a),
            _ => {
                return Err(AppError::Import(
                    "the CSV must have the columns: nombre, cargo, area".into(),
                ));
            }
        };

        let mut plan = ImportPlan::default();
        let mut seen: HashSet<String> = HashSet::new();

        for (i, result) in rdr.records().enumerate() {
            // header is line 1
            let line = i + 2;
            let record = match result {
                Ok(r) => r,
                Err(e) => {
                    plan.errors.push(format!("line {}: {}", line, e));
                    continue;
                }
            };

            let Some(name) = optional(record.get(name_col)) else {
                plan.actions.push(ImportAction::Skip {
                    line,
                    reason: "empty name".into(),
                });
                continue;
            };

            if !seen.insert(name.to_lowercase()) {
                plan.actions.push(ImportAction::Skip {
                    line,
                    reason: format!("'{}' appears more than once in the file", name),
                });
                continue;
            }

            let title = optional(record.get(title_col));
            let area = optional(record.get(area_col));

            match find_person_by_name(conn, &name)? {
                Some(existing) => {
                    if existing.title == title && existing.area == area {
                        plan.actions.push(ImportAction::Skip {
                            line,
                            reason: format!("'{}' is unchanged", existing.name),
                        });
                    } else {
                        let mut after = existing.clone();
                        after.title = title;
                        after.area = area;
                        plan.actions.push(ImportAction::Update {
                            before: existing,
                            after,
                        });
                    }
                }
                None => plan.actions.push(ImportAction::Insert { name, title, area }),
            }
        }

        Ok(plan)
    }

    pub fn apply(pool: &mut DbPool, session: &Session, plan: &ImportPlan) -> AppResult<ImportReport> {
        session.require(Permission::EditPersonnel)?;

        let tx = pool
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let mut report = ImportReport::default();

        for action in &plan.actions {
            match action {
                ImportAction::Insert { name, title, area } => {
                    let id = insert_person(&tx, name, title.as_deref(), area.as_deref())?;
                    insert_change(
                        &tx,
                        HistoryTable::Personnel,
                        id,
                        HISTORY_ACTION,
                        "record",
                        None,
                        Some(name),
                        &session.username,
                    )?;
                    report.inserted += 1;
                }
                ImportAction::Update { before, after } => {
                    record_person_diff(&tx, before, after, HISTORY_ACTION, &session.username)?;
                    update_person(&tx, after)?;
                    report.updated += 1;
                }
                ImportAction::Skip { .. } => {}
            }
        }

        tx.commit()?;

        audit::record(
            &pool.conn,
            Some(session),
            AuditAction::Import,
            AuditEntity::Person,
            None,
            &format!(
                "Bulk import: {} new, {} updated, {} skipped, {} errors",
                report.inserted,
                report.updated,
                plan.skipped(),
                plan.errors.len()
            ),
        );

        Ok(report)
    }
}
