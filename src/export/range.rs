// src/export/range.rs

use crate::errors::{AppError, AppResult};
use crate::models::date_range::DateRange;
use chrono::{Months, NaiveDate};

fn invalid(r: &str) -> AppError {
    AppError::InvalidDate(format!(
        "unsupported range '{r}' (use YYYY, YYYY-MM, YYYY-MM-DD or start:end)"
    ))
}

/// First and last day covered by a single `YYYY`, `YYYY-MM` or
/// `YYYY-MM-DD` token.
fn bounds(token: &str) -> AppResult<(NaiveDate, NaiveDate)> {
    let t = token.trim();
    let parsed = match t.len() {
        4 => t.parse::<i32>().ok().and_then(|y| {
            Some((
                NaiveDate::from_ymd_opt(y, 1, 1)?,
                NaiveDate::from_ymd_opt(y, 12, 31)?,
            ))
        }),
        7 => NaiveDate::parse_from_str(&format!("{t}-01"), "%Y-%m-%d")
            .ok()
            .and_then(|first| {
                let last = first.checked_add_months(Months::new(1))?.pred_opt()?;
                Some((first, last))
            }),
        10 => NaiveDate::parse_from_str(t, "%Y-%m-%d").ok().map(|d| (d, d)),
        _ => None,
    };
    parsed.ok_or_else(|| invalid(token))
}

/// Parse `--range`: `YYYY`, `YYYY-MM`, `YYYY-MM-DD`, or two tokens of the
/// same shape joined by `:`.
pub(crate) fn parse_range(r: &str) -> AppResult<DateRange> {
    match r.split_once(':') {
        Some((a, b)) => {
            if a.trim().len() != b.trim().len() {
                return Err(AppError::InvalidDate(
                    "start and end must have the same format".into(),
                ));
            }
            let (start, _) = bounds(a)?;
            let (_, end) = bounds(b)?;
            DateRange::new(start, end)
        }
        None => {
            let (start, end) = bounds(r)?;
            DateRange::new(start, end)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn month_covers_leap_february() {
        let r = parse_range("2024-02").unwrap();
        assert_eq!((r.start, r.end), (d("2024-02-01"), d("2024-02-29")));
    }

    #[test]
    fn year_span() {
        let r = parse_range("2023:2024").unwrap();
        assert_eq!((r.start, r.end), (d("2023-01-01"), d("2024-12-31")));
    }

    #[test]
    fn mixed_shapes_are_rejected() {
        assert!(parse_range("2024:2024-05").is_err());
        assert!(parse_range("2024-13").is_err());
        assert!(parse_range("2025:2024").is_err());
    }
}
