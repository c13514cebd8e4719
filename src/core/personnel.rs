use crate::core::audit;
use crate::core::auth::Session;
use crate::core::availability::{available_personnel, busy_from};
use crate::db::history::{HistoryTable, insert_change, list_changes};
use crate::db::personnel::{
    find_person_by_name, get_person, insert_person, list_personnel, update_person,
};
use crate::errors::{AppError, AppResult};
use crate::models::audit::{AuditAction, AuditEntity};
use crate::models::date_range::DateRange;
use crate::models::person::{Person, PersonStatus};
use crate::models::project::HistoryEntry;
use crate::models::role::Permission;
use chrono::NaiveDate;
use rusqlite::Connection;

/// Optional field updates for `person edit`. An empty string clears
/// `title` / `area`.
#[derive(Debug, Clone, Default)]
pub struct PersonChanges {
    pub name: Option<String>,
    pub title: Option<String>,
    pub area: Option<String>,
}

fn clean(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn require_name(name: &str) -> AppResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("Name is required".into()));
    }
    Ok(name.to_string())
}

pub struct PersonnelLogic;

impl PersonnelLogic {
    pub fn add(
        conn: &Connection,
        session: &Session,
        name: &str,
        title: Option<&str>,
        area: Option<&str>,
    ) -> AppResult<i64> {
        session.require(Permission::EditPersonnel)?;

        let name = require_name(name)?;
        if find_person_by_name(conn, &name)?.is_some() {
            return Err(AppError::Validation(format!(
                "A person named '{}' already exists",
                name
            )));
        }

        let title = clean(title);
        let area = clean(area);
        let id = insert_person(conn, &name, title.as_deref(), area.as_deref())?;

        insert_change(
            conn,
            HistoryTable::Personnel,
            id,
            AuditAction::Create.as_str(),
            "record",
            None,
            Some(&name),
            &session.username,
        )?;
        audit::record(
            conn,
            Some(session),
            AuditAction::Create,
            AuditEntity::Person,
            Some(id),
            &format!("Added person '{}'", name),
        );

        Ok(id)
    }

    /// Personnel with their Busy/Available state relative to `today`.
    pub fn list(
        conn: &Connection,
        session: &Session,
        include_inactive: bool,
        today: NaiveDate,
    ) -> AppResult<Vec<PersonStatus>> {
        session.require(Permission::ViewDashboard)?;

        let busy = busy_from(conn, today)?;
        Ok(list_personnel(conn, include_inactive)?
            .into_iter()
            .map(|p| PersonStatus {
                busy: busy.contains(&p.id),
                person: p,
            })
            .collect())
    }

    /// Apply `changes`, writing one history row per changed field.
    /// Returns the names of the fields that changed.
    pub fn edit(
        conn: &Connection,
        session: &Session,
        id: i64,
        changes: &PersonChanges,
    ) -> AppResult<Vec<&'static str>> {
        session.require(Permission::EditPersonnel)?;

        // History rows and the row update land together or not at all.
        let tx = conn.unchecked_transaction()?;
        let before = get_person(&tx, id)?;
        let mut after = before.clone();

        if let Some(name) = &changes.name {
            let name = require_name(name)?;
            if let Some(other) = find_person_by_name(&tx, &name)?
                && other.id != id
            {
                return Err(AppError::Validation(format!(
                    "A person named '{}' already exists",
                    name
                )));
            }
            after.name = name;
        }
        if let Some(title) = &changes.title {
            after.title = clean(Some(title));
        }
        if let Some(area) = &changes.area {
            after.area = clean(Some(area));
        }

        let changed = record_person_diff(
            &tx,
            &before,
            &after,
            AuditAction::Edit.as_str(),
            &session.username,
        )?;
        if changed.is_empty() {
            return Ok(changed);
        }

        update_person(&tx, &after)?;
        tx.commit()?;

        audit::record(
            conn,
            Some(session),
            AuditAction::Edit,
            AuditEntity::Person,
            Some(id),
            &format!("Edited {}: {}", after.name, changed.join(", ")),
        );

        Ok(changed)
    }

    /// Returns false when the person already had the requested state.
    pub fn set_active(conn: &Connection, session: &Session, id: i64, active: bool) -> AppResult<bool> {
        session.require(Permission::EditPersonnel)?;

        let tx = conn.unchecked_transaction()?;
        let mut person = get_person(&tx, id)?;
        if person.active == active {
            return Ok(false);
        }

        let before = person.clone();
        person.active = active;
        record_person_diff(&tx, &before, &person, AuditAction::Edit.as_str(), &session.username)?;
        update_person(&tx, &person)?;
        tx.commit()?;

        audit::record(
            conn,
            Some(session),
            AuditAction::Edit,
            AuditEntity::Person,
            Some(id),
            &format!(
                "{} {}",
                if active { "Activated" } else { "Deactivated" },
                person.name
            ),
        );
        Ok(true)
    }

    pub fn history(conn: &Connection, session: &Session, id: Option<i64>) -> AppResult<Vec<HistoryEntry>> {
        session.require(Permission::ViewDashboard)?;
        list_changes(conn, HistoryTable::Personnel, id)
    }

    pub fn available(conn: &Connection, session: &Session, range: &DateRange) -> AppResult<Vec<Person>> {
        session.require(Permission::ViewDashboard)?;
        available_personnel(conn, range)
    }
}

/// Write one history row per field that differs between `before` and
/// `after`; returns the changed field names.
pub(crate) fn record_person_diff(
    conn: &Connection,
    before: &Person,
    after: &Person,
    action: &str,
    username: &str,
) -> AppResult<Vec<&'static str>> {
    let active = |p: &Person| (if p.active { "1" } else { "0" }).to_string();
    let fields: [(&'static str, Option<String>, Option<String>); 4] = [
        ("name", Some(before.name.clone()), Some(after.name.clone())),
        ("title", before.title.clone(), after.title.clone()),
        ("area", before.area.clone(), after.area.clone()),
        ("active", Some(active(before)), Some(active(after))),
    ];

    let mut changed = Vec::new();
    for (field, old, new) in fields {
        if old == new {
            continue;
        }
        insert_change(
            conn,
            HistoryTable::Personnel,
            before.id,
            action,
            field,
            old.as_deref(),
            new.as_deref(),
            username,
        )?;
        changed.push(field);
    }
    Ok(changed)
}
