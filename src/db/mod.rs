pub mod assignments;
pub mod audit;
pub mod history;
pub mod initialize;
pub mod log;
pub mod migrate;
pub mod personnel;
pub mod pool;
pub mod projects;
pub mod stats;
pub mod users;

use crate::errors::AppError;
use crate::models::date_range::DateRange;
use chrono::{DateTime, Local, NaiveDate};
use rusqlite::Row;
use rusqlite::types::Type;

/// Dates are stored as `TEXT 'YYYY-MM-DD'` so that string comparison in SQL
/// matches calendar order.
pub(crate) fn date_param(d: NaiveDate) -> String {
    d.format("%Y-%m-%d").to_string()
}

pub(crate) fn now_param() -> String {
    Local::now().to_rfc3339()
}

pub(crate) fn read_date(row: &Row, col: &str) -> rusqlite::Result<NaiveDate> {
    let raw: String = row.get(col)?;
    NaiveDate::parse_from_str(&raw, "%Y-%m-%d").map_err(|_| {
        rusqlite::Error::FromSqlConversionFailure(0, Type::Text, Box::new(AppError::InvalidDate(raw)))
    })
}

pub(crate) fn read_range(row: &Row, start: &str, end: &str) -> rusqlite::Result<DateRange> {
    let s = read_date(row, start)?;
    let e = read_date(row, end)?;
    DateRange::new(s, e)
        .map_err(|err| rusqlite::Error::FromSqlConversionFailure(0, Type::Text, Box::new(err)))
}

pub(crate) fn read_timestamp(row: &Row, col: &str) -> rusqlite::Result<Option<DateTime<Local>>> {
    let raw: Option<String> = row.get(col)?;
    match raw {
        None => Ok(None),
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => DateTime::parse_from_rfc3339(&s)
            .map(|dt| Some(dt.with_timezone(&Local)))
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(0, Type::Text, Box::new(e))),
    }
}
