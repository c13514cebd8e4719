use crate::core::audit;
use crate::core::auth::Session;
use crate::db::assignments::count_outside_range;
use crate::db::history::{HistoryTable, insert_change, list_changes};
use crate::db::projects::{
    find_project_by_code, get_live_project, insert_project, list_projects, soft_delete_project,
    update_project,
};
use crate::errors::{AppError, AppResult};
use crate::models::audit::{AuditAction, AuditEntity};
use crate::models::date_range::DateRange;
use crate::models::project::{HistoryEntry, Project, ProjectChanges};
use crate::models::role::Permission;
use rusqlite::Connection;

const DEFAULT_STATUS: &str = "Active";

fn clean_code(code: Option<&String>) -> Option<String> {
    code.map(|c| c.trim().to_string()).filter(|c| !c.is_empty())
}

fn ensure_code_free(conn: &Connection, code: Option<&str>, own_id: Option<i64>) -> AppResult<()> {
    if let Some(code) = code
        && let Some(existing) = find_project_by_code(conn, code)?
        && Some(existing.id) != own_id
    {
        return Err(AppError::Validation(format!(
            "Project code '{}' is already used by '{}'",
            code, existing.name
        )));
    }
    Ok(())
}

pub struct ProjectLogic;

impl ProjectLogic {
    pub fn create(conn: &Connection, session: &Session, input: &ProjectChanges) -> AppResult<i64> {
        session.require(Permission::CreateProject)?;

        let name = input
            .name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .ok_or_else(|| AppError::Validation("Project name is required".into()))?;

        let (start, end) = match (input.start, input.end) {
            (Some(s), Some(e)) => (s, e),
            _ => {
                return Err(AppError::Validation(
                    "Project start and end dates are required".into(),
                ));
            }
        };

        let code = clean_code(input.code.as_ref());
        ensure_code_free(conn, code.as_deref(), None)?;

        let project = Project {
            id: 0,
            name: name.to_string(),
            code,
            status: input
                .status
                .clone()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_STATUS.to_string()),
            range: DateRange::new(start, end)?,
            confirmed: input.confirmed.unwrap_or(false),
            deleted: false,
        };

        let id = insert_project(conn, &project)?;

        insert_change(
            conn,
            HistoryTable::Projects,
            id,
            AuditAction::Create.as_str(),
            "record",
            None,
            Some(&project.name),
            &session.username,
        )?;
        audit::record(
            conn,
            Some(session),
            AuditAction::Create,
            AuditEntity::Project,
            Some(id),
            &format!("Created project '{}' ({})", project.name, project.range),
        );

        Ok(id)
    }

    pub fn list(conn: &Connection, session: &Session, include_deleted: bool) -> AppResult<Vec<Project>> {
        session.require(Permission::ViewDashboard)?;
        list_projects(conn, include_deleted)
    }

    /// Apply `changes`. A new date range must still contain every active
    /// assignment of the project. Returns the changed field names.
    pub fn edit(
        conn: &Connection,
        session: &Session,
        id: i64,
        changes: &ProjectChanges,
    ) -> AppResult<Vec<&'static str>> {
        session.require(Permission::EditProject)?;

        let tx = conn.unchecked_transaction()?;
        let before = get_live_project(&tx, id)?;
        let mut after = before.clone();

        if let Some(name) = &changes.name {
            let name = name.trim();
            if name.is_empty() {
                return Err(AppError::Validation("Project name is required".into()));
            }
            after.name = name.to_string();
        }
        if changes.code.is_some() {
            after.code = clean_code(changes.code.as_ref());
            ensure_code_free(&tx, after.code.as_deref(), Some(id))?;
        }
        if let Some(status) = &changes.status {
            after.status = status.trim().to_string();
        }
        if let Some(confirmed) = changes.confirmed {
            after.confirmed = confirmed;
        }

        after.range = DateRange::new(
            changes.start.unwrap_or(before.range.start),
            changes.end.unwrap_or(before.range.end),
        )?;

        if after.range != before.range {
            let outside = count_outside_range(&tx, id, &after.range)?;
            if outside > 0 {
                return Err(AppError::Validation(format!(
                    "{} active assignment(s) fall outside {}; end or adjust them first",
                    outside, after.range
                )));
            }
        }

        let bool_str = |b: bool| (if b { "true" } else { "false" }).to_string();
        let fields: [(&'static str, Option<String>, Option<String>); 6] = [
            ("name", Some(before.name.clone()), Some(after.name.clone())),
            ("code", before.code.clone(), after.code.clone()),
            ("status", Some(before.status.clone()), Some(after.status.clone())),
            ("start_date", Some(before.range.start_str()), Some(after.range.start_str())),
            ("end_date", Some(before.range.end_str()), Some(after.range.end_str())),
            ("confirmed", Some(bool_str(before.confirmed)), Some(bool_str(after.confirmed))),
        ];

        let mut changed = Vec::new();
        for (field, old, new) in fields {
            if old == new {
                continue;
            }
            insert_change(
                &tx,
                HistoryTable::Projects,
                id,
                AuditAction::Edit.as_str(),
                field,
                old.as_deref(),
                new.as_deref(),
                &session.username,
            )?;
            changed.push(field);
        }

        if changed.is_empty() {
            return Ok(changed);
        }

        update_project(&tx, &after)?;
        tx.commit()?;

        audit::record(
            conn,
            Some(session),
            AuditAction::Edit,
            AuditEntity::Project,
            Some(id),
            &format!("Edited '{}': {}", after.name, changed.join(", ")),
        );

        Ok(changed)
    }

    /// Soft delete: the project's assignments stop counting everywhere.
    pub fn delete(conn: &Connection, session: &Session, id: i64) -> AppResult<Project> {
        session.require(Permission::DeleteProject)?;

        let tx = conn.unchecked_transaction()?;
        let project = get_live_project(&tx, id)?;
        if !soft_delete_project(&tx, id)? {
            return Err(AppError::not_found("Project", id));
        }

        insert_change(
            &tx,
            HistoryTable::Projects,
            id,
            AuditAction::Delete.as_str(),
            "deleted",
            Some("false"),
            Some("true"),
            &session.username,
        )?;
        tx.commit()?;

        audit::record(
            conn,
            Some(session),
            AuditAction::Delete,
            AuditEntity::Project,
            Some(id),
            &format!("Deleted project '{}'", project.name),
        );

        Ok(project)
    }

    pub fn history(conn: &Connection, session: &Session, id: Option<i64>) -> AppResult<Vec<HistoryEntry>> {
        session.require(Permission::ViewDashboard)?;
        list_changes(conn, HistoryTable::Projects, id)
    }
}
