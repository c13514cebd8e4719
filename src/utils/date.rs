use crate::errors::{AppError, AppResult};
use crate::models::date_range::DateRange;
use chrono::{Datelike, Duration, NaiveDate};

pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()
}

/// Parse a mandatory `YYYY-MM-DD` CLI argument.
pub fn require_date(s: &str) -> AppResult<NaiveDate> {
    parse_date(s).ok_or_else(|| AppError::InvalidDate(s.to_string()))
}

pub fn parse_optional_date(input: Option<&String>) -> AppResult<Option<NaiveDate>> {
    input.map(|s| require_date(s)).transpose()
}

/// Build a range from optional `--from/--to`, falling back to the defaults.
pub fn range_or_default(
    from: Option<&String>,
    to: Option<&String>,
    default_from: NaiveDate,
    default_to: NaiveDate,
) -> AppResult<DateRange> {
    let start = parse_optional_date(from)?.unwrap_or(default_from);
    let end = parse_optional_date(to)?.unwrap_or(default_to);
    if start > end {
        return Err(AppError::InvalidDate(format!(
            "start date {} is after end date {}",
            start, end
        )));
    }
    DateRange::new(start, end)
}

/// Monday of the ISO week containing `d`.
pub fn week_start(d: NaiveDate) -> NaiveDate {
    d - Duration::days(i64::from(d.weekday().num_days_from_monday()))
}

/// ISO week label such as `2025-W07`.
pub fn week_label(d: NaiveDate) -> String {
    let w = d.iso_week();
    format!("{}-W{:02}", w.year(), w.week())
}

