//! Overlap detection and the queries built on it: availability, load,
//! ranked suggestions and over-assignment detection.
//!
//! Ranges are closed intervals. Only active assignments on projects that
//! have not been soft-deleted take part in any computation here.

use crate::config::Config;
use crate::db::assignments::{AssignmentFilter, LIVE_PREDICATE, list_views, overlap_clause};
use crate::db::date_param;
use crate::db::personnel::list_personnel;
use crate::errors::AppResult;
use crate::models::assignment::{AssignmentView, OverlapPair};
use crate::models::date_range::DateRange;
use crate::models::person::{Person, Suggestion};
use chrono::NaiveDate;
use rusqlite::{Connection, named_params};
use std::collections::{BTreeMap, BTreeSet};

/// Overlap against the `:start` / `:end` named parameters.
fn overlap_named() -> String {
    overlap_clause(":start", ":end")
}

/// How assignment counts translate into a load percentage.
#[derive(Debug, Clone, Copy)]
pub struct LoadPolicy {
    pub window_days: u32,
    pub per_assignment: i64,
}

impl LoadPolicy {
    pub fn from_config(cfg: &Config) -> Self {
        Self {
            window_days: cfg.load_window_days,
            per_assignment: cfg.load_per_assignment,
        }
    }

    pub fn window(&self, as_of: NaiveDate) -> DateRange {
        DateRange::window(as_of, self.window_days)
    }

    pub fn percent(&self, count: i64) -> i64 {
        (count * self.per_assignment).clamp(0, 100)
    }
}

impl Default for LoadPolicy {
    fn default() -> Self {
        Self {
            window_days: crate::config::default_load_window_days(),
            per_assignment: crate::config::default_load_per_assignment(),
        }
    }
}

/// True when `person_id` holds a live assignment sharing at least one day
/// with `range`. `exclude` skips one assignment id (used when re-checking
/// an existing assignment).
pub fn has_overlap(
    conn: &Connection,
    person_id: i64,
    range: &DateRange,
    exclude: Option<i64>,
) -> AppResult<bool> {
    let overlap = overlap_named();
    let sql = format!(
        "SELECT COUNT(*) FROM assignments a
         JOIN projects pr ON pr.id = a.project_id
         WHERE a.person_id = :person
           AND {LIVE_PREDICATE}
           AND {overlap}
           AND (:exclude IS NULL OR a.id <> :exclude)"
    );

    let n: i64 = conn.query_row(
        &sql,
        named_params! {
            ":person": person_id,
            ":start": date_param(range.start),
            ":end": date_param(range.end),
            ":exclude": exclude,
        },
        |row| row.get(0),
    )?;

    Ok(n > 0)
}

/// The live assignments of `person_id` that conflict with `range`.
pub fn conflicts_for(
    conn: &Connection,
    person_id: i64,
    range: &DateRange,
    exclude: Option<i64>,
) -> AppResult<Vec<AssignmentView>> {
    if !has_overlap(conn, person_id, range, exclude)? {
        return Ok(Vec::new());
    }

    let filter = AssignmentFilter {
        person_id: Some(person_id),
        window: Some(*range),
        ..Default::default()
    };

    Ok(list_views(conn, &filter)?
        .into_iter()
        .filter(|v| Some(v.id) != exclude)
        .collect())
}

/// Ids of every person holding a live assignment overlapping `range`.
pub fn busy_person_ids(conn: &Connection, range: &DateRange) -> AppResult<BTreeSet<i64>> {
    let overlap = overlap_named();
    let sql = format!(
        "SELECT DISTINCT a.person_id FROM assignments a
         JOIN projects pr ON pr.id = a.project_id
         WHERE {LIVE_PREDICATE} AND {overlap}"
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(
        named_params! {
            ":start": date_param(range.start),
            ":end": date_param(range.end),
        },
        |row| row.get::<_, i64>(0),
    )?;

    let mut out = BTreeSet::new();
    for r in rows {
        out.insert(r?);
    }
    Ok(out)
}

/// Active personnel free for the whole of `range`, ordered by name: the
/// complement of [`busy_person_ids`] within active personnel.
pub fn available_personnel(conn: &Connection, range: &DateRange) -> AppResult<Vec<Person>> {
    let busy = busy_person_ids(conn, range)?;
    Ok(list_personnel(conn, false)?
        .into_iter()
        .filter(|p| !busy.contains(&p.id))
        .collect())
}

/// Number of live assignments per person intersecting the load window
/// that starts at `as_of`. Persons without assignments are absent.
pub fn load_counts(
    conn: &Connection,
    as_of: NaiveDate,
    policy: &LoadPolicy,
) -> AppResult<BTreeMap<i64, i64>> {
    let window = policy.window(as_of);
    let overlap = overlap_named();
    let sql = format!(
        "SELECT a.person_id, COUNT(*) FROM assignments a
         JOIN projects pr ON pr.id = a.project_id
         WHERE {LIVE_PREDICATE} AND {overlap}
         GROUP BY a.person_id"
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(
        named_params! {
            ":start": date_param(window.start),
            ":end": date_param(window.end),
        },
        |row| Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?)),
    )?;

    let mut out = BTreeMap::new();
    for r in rows {
        let (id, n) = r?;
        out.insert(id, n);
    }
    Ok(out)
}

/// Available people for `range`, least loaded first (ties by name).
pub fn suggest_personnel(
    conn: &Connection,
    range: &DateRange,
    as_of: NaiveDate,
    policy: &LoadPolicy,
    limit: Option<usize>,
) -> AppResult<Vec<Suggestion>> {
    let loads = load_counts(conn, as_of, policy)?;

    let mut out: Vec<Suggestion> = available_personnel(conn, range)?
        .into_iter()
        .map(|p| {
            let count = loads.get(&p.id).copied().unwrap_or(0);
            Suggestion {
                person_id: p.id,
                name: p.name,
                assignments_in_window: count,
                load_percent: policy.percent(count),
            }
        })
        .collect();

    out.sort_by(|a, b| {
        a.assignments_in_window
            .cmp(&b.assignments_in_window)
            .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
    });

    if let Some(n) = limit {
        out.truncate(n);
    }
    Ok(out)
}

/// Pairs of live assignments of the same active person that share a day.
pub fn overlapping_pairs(conn: &Connection, person_id: Option<i64>) -> AppResult<Vec<OverlapPair>> {
    let filter = AssignmentFilter {
        person_id,
        ..Default::default()
    };

    let active: BTreeSet<i64> = active_person_ids(conn)?;

    let mut by_person: BTreeMap<i64, Vec<AssignmentView>> = BTreeMap::new();
    for v in list_views(conn, &filter)? {
        if active.contains(&v.person_id) {
            by_person.entry(v.person_id).or_default().push(v);
        }
    }

    let mut pairs = Vec::new();
    for (pid, views) in by_person {
        for (i, first) in views.iter().enumerate() {
            for second in &views[i + 1..] {
                if first.range.overlaps(&second.range) {
                    pairs.push(OverlapPair {
                        person_id: pid,
                        person: first.person.clone(),
                        first: first.clone(),
                        second: second.clone(),
                    });
                }
            }
        }
    }
    Ok(pairs)
}

/// Number of active persons holding at least one overlapping pair.
pub fn overlap_kpi(conn: &Connection) -> AppResult<usize> {
    let people: BTreeSet<i64> = overlapping_pairs(conn, None)?
        .into_iter()
        .map(|p| p.person_id)
        .collect();
    Ok(people.len())
}

/// Persons with a live assignment ending on or after `today`.
pub fn busy_from(conn: &Connection, today: NaiveDate) -> AppResult<BTreeSet<i64>> {
    let sql = format!(
        "SELECT DISTINCT a.person_id FROM assignments a
         JOIN projects pr ON pr.id = a.project_id
         WHERE {LIVE_PREDICATE} AND a.end_date >= :today"
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(named_params! { ":today": date_param(today) }, |row| {
        row.get::<_, i64>(0)
    })?;

    let mut out = BTreeSet::new();
    for r in rows {
        out.insert(r?);
    }
    Ok(out)
}

fn active_person_ids(conn: &Connection) -> AppResult<BTreeSet<i64>> {
    let mut stmt = conn.prepare("SELECT id FROM personnel WHERE active = 1")?;
    let rows = stmt.query_map([], |row| row.get::<_, i64>(0))?;

    let mut out = BTreeSet::new();
    for r in rows {
        out.insert(r?);
    }
    Ok(out)
}
