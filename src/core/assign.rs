//! Assigning people to projects: conflict policy, suggestions and
//! soft removal.

use crate::config::Config;
use crate::core::audit;
use crate::core::auth::Session;
use crate::core::availability::{LoadPolicy, conflicts_for, suggest_personnel};
use crate::db::assignments::{
    AssignmentFilter, deactivate_assignment, get_assignment, insert_assignment, list_views,
};
use crate::db::personnel::get_person;
use crate::db::pool::DbPool;
use crate::db::projects::{get_live_project, get_project};
use crate::errors::{AppError, AppResult};
use crate::models::assignment::{Assignment, AssignmentView};
use crate::models::audit::{AuditAction, AuditEntity};
use crate::models::date_range::DateRange;
use crate::models::person::Suggestion;
use crate::models::role::Permission;
use chrono::NaiveDate;
use rusqlite::{Connection, TransactionBehavior};

#[derive(Debug, Clone)]
pub struct AssignRequest {
    pub project_id: i64,
    pub person_ids: Vec<i64>,
    /// Defaults to the project's own range.
    pub range: Option<DateRange>,
    /// Accept conflicts on unconfirmed projects.
    pub force: bool,
}

/// Existing assignments of one person that clash with the requested range.
#[derive(Debug, Clone)]
pub struct PersonConflict {
    pub person_id: i64,
    pub person: String,
    pub existing: Vec<AssignmentView>,
}

impl PersonConflict {
    pub fn describe(&self) -> String {
        let with: Vec<String> = self
            .existing
            .iter()
            .map(|v| format!("{} ({})", v.project, v.range))
            .collect();
        format!("{} is already assigned to {}", self.person, with.join(", "))
    }
}

#[derive(Debug, Clone, Default)]
pub struct AssignOutcome {
    pub created: Vec<i64>,
    /// Conflicts accepted with `--force` on an unconfirmed project.
    pub forced: Vec<PersonConflict>,
}

pub struct AssignLogic;

impl AssignLogic {
    /// Check and insert inside one immediate transaction, so a concurrent
    /// run cannot slip an overlapping assignment in between.
    pub fn apply(pool: &mut DbPool, session: &Session, req: &AssignRequest) -> AppResult<AssignOutcome> {
        session.require(Permission::AssignPersonnel)?;

        let mut person_ids = req.person_ids.clone();
        person_ids.sort_unstable();
        person_ids.dedup();
        if person_ids.is_empty() {
            return Err(AppError::Validation("No person selected".into()));
        }

        let tx = pool
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        // 1️⃣ Project and range
        let project = get_live_project(&tx, req.project_id)?;
        let range = req.range.unwrap_or(project.range);
        if !project.range.contains(&range) {
            return Err(AppError::InvalidRange(format!(
                "{} is outside project '{}' ({})",
                range, project.name, project.range
            )));
        }

        // 2️⃣ People and conflicts
        let mut conflicts = Vec::new();
        for &pid in &person_ids {
            let person = get_person(&tx, pid)?;
            if !person.active {
                return Err(AppError::Validation(format!(
                    "{} is inactive and cannot be assigned",
                    person.name
                )));
            }

            let existing = conflicts_for(&tx, pid, &range, None)?;
            if !existing.is_empty() {
                conflicts.push(PersonConflict {
                    person_id: pid,
                    person: person.name,
                    existing,
                });
            }
        }

        // 3️⃣ Conflict policy
        if !conflicts.is_empty() {
            let detail: Vec<String> = conflicts.iter().map(PersonConflict::describe).collect();
            if project.confirmed {
                return Err(AppError::Conflict(format!(
                    "project '{}' is confirmed: {}",
                    project.name,
                    detail.join("; ")
                )));
            }
            if !req.force {
                return Err(AppError::Conflict(format!(
                    "{} (project '{}' is not confirmed: use --force to assign anyway)",
                    detail.join("; "),
                    project.name
                )));
            }
            tracing::info!(project = project.id, count = conflicts.len(), "forcing assignment over conflicts");
        }

        // 4️⃣ Insert
        let mut created = Vec::with_capacity(person_ids.len());
        for &pid in &person_ids {
            created.push(insert_assignment(&tx, pid, project.id, &range, &session.username)?);
        }
        tx.commit()?;

        audit::record(
            &pool.conn,
            Some(session),
            AuditAction::Assign,
            AuditEntity::Assignment,
            Some(project.id),
            &format!(
                "Assigned {} person(s) to '{}' ({}){}",
                created.len(),
                project.name,
                range,
                if conflicts.is_empty() { "" } else { " with forced conflicts" }
            ),
        );

        Ok(AssignOutcome {
            created,
            forced: conflicts,
        })
    }

    /// Ranked candidates for the whole range of `project_id`.
    pub fn suggest(
        conn: &Connection,
        cfg: &Config,
        session: &Session,
        project_id: i64,
        as_of: NaiveDate,
        limit: Option<usize>,
    ) -> AppResult<Vec<Suggestion>> {
        session.require(Permission::ViewDashboard)?;

        let project = get_live_project(conn, project_id)?;
        suggest_personnel(
            conn,
            &project.range,
            as_of,
            &LoadPolicy::from_config(cfg),
            limit,
        )
    }

    /// Assign the top suggestions under the same rules as [`AssignLogic::apply`].
    pub fn auto(
        pool: &mut DbPool,
        cfg: &Config,
        session: &Session,
        project_id: i64,
        as_of: NaiveDate,
        limit: Option<usize>,
    ) -> AppResult<AssignOutcome> {
        session.require(Permission::AssignPersonnel)?;

        let picks = Self::suggest(&pool.conn, cfg, session, project_id, as_of, limit)?;
        if picks.is_empty() {
            return Ok(AssignOutcome::default());
        }

        let req = AssignRequest {
            project_id,
            person_ids: picks.iter().map(|s| s.person_id).collect(),
            range: None,
            force: false,
        };
        Self::apply(pool, session, &req)
    }

    pub fn list(conn: &Connection, session: &Session, filter: &AssignmentFilter) -> AppResult<Vec<AssignmentView>> {
        session.require(Permission::ViewDashboard)?;
        list_views(conn, filter)
    }

    /// Soft delete. The person becomes available again at once.
    pub fn end(conn: &Connection, session: &Session, assignment_id: i64) -> AppResult<Assignment> {
        session.require(Permission::AssignPersonnel)?;

        let assignment = get_assignment(conn, assignment_id)?;
        if !deactivate_assignment(conn, assignment_id)? {
            return Err(AppError::Validation(format!(
                "Assignment #{} is already inactive",
                assignment_id
            )));
        }

        let person = get_person(conn, assignment.person_id)?;
        let project = get_project(conn, assignment.project_id)?;
        audit::record(
            conn,
            Some(session),
            AuditAction::Unassign,
            AuditEntity::Assignment,
            Some(assignment_id),
            &format!(
                "Removed {} from '{}' ({})",
                person.name, project.name, assignment.range
            ),
        );

        Ok(assignment)
    }
}
