use crate::core::auth::Session;
use crate::db::assignments::{AssignmentFilter, list_views};
use crate::db::personnel::find_person_by_name;
use crate::errors::{AppError, AppResult};
use crate::models::assignment::AssignmentView;
use crate::models::date_range::DateRange;
use crate::models::role::Permission;
use chrono::Duration;
use rusqlite::Connection;

/// Windows longer than this are drawn one character per week.
pub const DAILY_GANTT_MAX_DAYS: i64 = 120;

pub const BAR_FILLED: char = '█';
pub const BAR_EMPTY: char = '·';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GanttScale {
    Day,
    Week,
}

impl GanttScale {
    pub fn for_window(window: &DateRange) -> Self {
        if window.days() > DAILY_GANTT_MAX_DAYS {
            GanttScale::Week
        } else {
            GanttScale::Day
        }
    }

    pub fn step_days(&self) -> i64 {
        match self {
            GanttScale::Day => 1,
            GanttScale::Week => 7,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            GanttScale::Day => "1 char = 1 day",
            GanttScale::Week => "1 char = 1 week",
        }
    }
}

/// Live assignments intersecting `window`, by person then start date.
pub fn calendar_rows(
    conn: &Connection,
    session: &Session,
    window: &DateRange,
    person: Option<&str>,
) -> AppResult<Vec<AssignmentView>> {
    session.require(Permission::ViewDashboard)?;

    let person_id = match person {
        Some(name) => Some(
            find_person_by_name(conn, name)?
                .ok_or_else(|| AppError::not_found("Person", name))?
                .id,
        ),
        None => None,
    };

    let filter = AssignmentFilter {
        person_id,
        window: Some(*window),
        ..Default::default()
    };
    list_views(conn, &filter)
}

/// Text bar for `range`, clipped to `window`.
pub fn gantt_bar(range: &DateRange, window: &DateRange, scale: GanttScale) -> String {
    let step = scale.step_days();
    let mut bar = String::new();
    let mut cell_start = window.start;

    while cell_start <= window.end {
        let cell_end = (cell_start + Duration::days(step - 1)).min(window.end);
        let cell = DateRange {
            start: cell_start,
            end: cell_end,
        };
        bar.push(if range.overlaps(&cell) { BAR_FILLED } else { BAR_EMPTY });
        cell_start += Duration::days(step);
    }
    bar
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn daily_bar_is_clipped_to_window() {
        let window = DateRange::new(d("2024-01-01"), d("2024-01-10")).unwrap();
        let range = DateRange::new(d("2023-12-20"), d("2024-01-03")).unwrap();
        assert_eq!(gantt_bar(&range, &window, GanttScale::Day), "███·······");
    }

    #[test]
    fn long_windows_switch_to_weeks() {
        let window = DateRange::new(d("2024-01-01"), d("2024-12-31")).unwrap();
        assert_eq!(GanttScale::for_window(&window), GanttScale::Week);

        let range = DateRange::new(d("2024-01-08"), d("2024-01-14")).unwrap();
        let bar = gantt_bar(&range, &window, GanttScale::Week);
        assert_eq!(bar.chars().count(), 53);
        assert!(bar.starts_with("·█·"));
    }
}
