// src/export/excel_date.rs

use chrono::NaiveDate;

pub(crate) const DATE_FORMAT: &str = "yyyy-mm-dd";

/// Excel serial day number of a `YYYY-MM-DD` string.
pub(crate) fn excel_serial(s: &str) -> Option<f64> {
    let d = NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()?;
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    Some((d - epoch).num_days() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iso_dates_become_excel_serials() {
        assert_eq!(excel_serial("2024-01-01"), Some(45292.0));
        assert_eq!(excel_serial("1900-03-01"), Some(61.0));
        assert_eq!(excel_serial("Alice"), None);
        assert_eq!(excel_serial(""), None);
    }
}
