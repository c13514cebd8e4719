//! Dashboard figures: KPIs, alerts and the weekly load heatmap.

use crate::config::Config;
use crate::core::auth::Session;
use crate::core::availability::{LoadPolicy, busy_from, load_counts, overlap_kpi, overlapping_pairs};
use crate::db::assignments::{AssignmentFilter, list_views};
use crate::db::personnel::{find_person_by_name, list_personnel};
use crate::errors::{AppError, AppResult};
use crate::models::assignment::{AssignmentView, OverlapPair};
use crate::models::date_range::DateRange;
use crate::models::person::Person;
use crate::models::role::Permission;
use crate::utils::date::week_start;
use chrono::{Duration, NaiveDate};
use rusqlite::Connection;
use std::collections::BTreeMap;

pub const HEATMAP_WEEKS_BEFORE: i64 = 4;
pub const HEATMAP_WEEKS_AFTER: i64 = 8;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Kpis {
    pub active_projects: i64,
    pub confirmed_projects: i64,
    pub unconfirmed_projects: i64,
    pub total_personnel: i64,
    pub available_personnel: i64,
    pub busy_personnel: i64,
    pub active_assignments: i64,
    pub overassigned_people: i64,
}

#[derive(Debug, Clone)]
pub enum Alert {
    Overlap(OverlapPair),
    EndingSoon { view: AssignmentView, days_left: i64 },
    FullLoad { name: String, assignments: i64 },
}

impl Alert {
    pub fn message(&self) -> String {
        match self {
            Alert::Overlap(p) => format!(
                "{} has overlapping assignments: {} ({}) and {} ({})",
                p.person, p.first.project, p.first.range, p.second.project, p.second.range
            ),
            Alert::EndingSoon { view, days_left } => match days_left {
                0 => format!("{} on '{}' ends today", view.person, view.project),
                1 => format!("{} on '{}' ends tomorrow", view.person, view.project),
                n => format!("{} on '{}' ends in {} days ({})", view.person, view.project, n, view.range.end),
            },
            Alert::FullLoad { name, assignments } => {
                format!("{} is at 100% load ({} assignments)", name, assignments)
            }
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Heatmap {
    /// Monday of each column.
    pub weeks: Vec<NaiveDate>,
    pub rows: Vec<(String, Vec<usize>)>,
}

#[derive(Debug, Clone)]
pub struct Dashboard {
    pub as_of: NaiveDate,
    pub person: Option<Person>,
    pub kpis: Kpis,
    pub alerts: Vec<Alert>,
    pub heatmap: Heatmap,
}

fn count(conn: &Connection, sql: &str) -> AppResult<i64> {
    Ok(conn.query_row(sql, [], |row| row.get(0))?)
}

pub fn compute_kpis(conn: &Connection, as_of: NaiveDate) -> AppResult<Kpis> {
    let active_projects = count(conn, "SELECT COUNT(*) FROM projects WHERE deleted = 0")?;
    let confirmed_projects = count(
        conn,
        "SELECT COUNT(*) FROM projects WHERE deleted = 0 AND confirmed = 1",
    )?;

    let people = list_personnel(conn, false)?;
    let busy = busy_from(conn, as_of)?;
    let busy_personnel = people.iter().filter(|p| busy.contains(&p.id)).count() as i64;

    Ok(Kpis {
        active_projects,
        confirmed_projects,
        unconfirmed_projects: active_projects - confirmed_projects,
        total_personnel: people.len() as i64,
        available_personnel: people.len() as i64 - busy_personnel,
        busy_personnel,
        active_assignments: count(
            conn,
            "SELECT COUNT(*) FROM assignments a JOIN projects pr ON pr.id = a.project_id
             WHERE a.active = 1 AND pr.deleted = 0",
        )?,
        overassigned_people: overlap_kpi(conn)? as i64,
    })
}

pub fn alerts(
    conn: &Connection,
    cfg: &Config,
    person: Option<&Person>,
    as_of: NaiveDate,
) -> AppResult<Vec<Alert>> {
    let person_id = person.map(|p| p.id);
    let mut out: Vec<Alert> = overlapping_pairs(conn, person_id)?
        .into_iter()
        .map(Alert::Overlap)
        .collect();

    // 1️⃣ Ending soon
    let horizon = DateRange {
        start: as_of,
        end: as_of + Duration::days(cfg.ending_soon_days.max(0)),
    };
    let filter = AssignmentFilter {
        person_id,
        window: Some(horizon),
        ..Default::default()
    };
    for view in list_views(conn, &filter)? {
        if horizon.contains_day(view.range.end) {
            let days_left = (view.range.end - as_of).num_days();
            out.push(Alert::EndingSoon { view, days_left });
        }
    }

    // 2️⃣ Full load
    let policy = LoadPolicy::from_config(cfg);
    let loads = load_counts(conn, as_of, &policy)?;
    for p in list_personnel(conn, false)? {
        if person_id.is_some_and(|id| id != p.id) {
            continue;
        }
        let n = loads.get(&p.id).copied().unwrap_or(0);
        if policy.percent(n) >= 100 {
            out.push(Alert::FullLoad {
                name: p.name,
                assignments: n,
            });
        }
    }

    Ok(out)
}

/// Assignments per person per ISO week around `as_of`.
pub fn weekly_heatmap(conn: &Connection, person: Option<&Person>, as_of: NaiveDate) -> AppResult<Heatmap> {
    let first = week_start(as_of - Duration::weeks(HEATMAP_WEEKS_BEFORE));
    let last = as_of + Duration::weeks(HEATMAP_WEEKS_AFTER);

    let mut weeks = Vec::new();
    let mut w = first;
    while w <= last {
        weeks.push(w);
        w += Duration::weeks(1);
    }

    let filter = AssignmentFilter {
        person_id: person.map(|p| p.id),
        window: Some(DateRange { start: first, end: last }),
        ..Default::default()
    };

    let mut rows: BTreeMap<String, Vec<usize>> = BTreeMap::new();
    for view in list_views(conn, &filter)? {
        let cells = rows
            .entry(view.person.clone())
            .or_insert_with(|| vec![0; weeks.len()]);
        for (i, monday) in weeks.iter().enumerate() {
            let week = DateRange {
                start: *monday,
                end: *monday + Duration::days(6),
            };
            if view.range.overlaps(&week) {
                cells[i] += 1;
            }
        }
    }

    Ok(Heatmap {
        weeks,
        rows: rows.into_iter().collect(),
    })
}

pub struct DashboardLogic;

impl DashboardLogic {
    pub fn build(
        conn: &Connection,
        cfg: &Config,
        session: &Session,
        person: Option<&str>,
        as_of: NaiveDate,
    ) -> AppResult<Dashboard> {
        session.require(Permission::ViewDashboard)?;

        let person = match person {
            Some(name) => Some(
                find_person_by_name(conn, name)?.ok_or_else(|| AppError::not_found("Person", name))?,
            ),
            None => None,
        };

        Ok(Dashboard {
            as_of,
            kpis: compute_kpis(conn, as_of)?,
            alerts: alerts(conn, cfg, person.as_ref(), as_of)?,
            heatmap: weekly_heatmap(conn, person.as_ref(), as_of)?,
            person,
        })
    }
}
