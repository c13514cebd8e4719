use crate::db::pool::DbPool;
use crate::errors::AppResult;
use crate::utils::colors::{CYAN, GREEN, GREY, RESET, YELLOW};
use chrono::NaiveDate;
use std::fs;

fn count(pool: &DbPool, sql: &str) -> AppResult<i64> {
    Ok(pool.conn.query_row(sql, [], |row| row.get(0))?)
}

pub fn print_db_info(pool: &mut DbPool, db_path: &str) -> AppResult<()> {
    println!();

    //
    // 1) FILE SIZE
    //
    let file_size = fs::metadata(db_path).map(|m| m.len()).unwrap_or(0);
    let file_mb = (file_size as f64) / (1024.0 * 1024.0);

    println!("{}• File:{} {}{}{}", CYAN, RESET, YELLOW, db_path, RESET);
    println!("{}• Size:{} {:.2} MB", CYAN, RESET, file_mb);

    //
    // 2) ROW COUNTS
    //
    let counts = [
        ("Personnel", "SELECT COUNT(*) FROM personnel"),
        ("Projects", "SELECT COUNT(*) FROM projects WHERE deleted = 0"),
        ("Deleted projects", "SELECT COUNT(*) FROM projects WHERE deleted = 1"),
        ("Active assignments", "SELECT COUNT(*) FROM assignments WHERE active = 1"),
        ("Users", "SELECT COUNT(*) FROM users"),
        ("Audit entries", "SELECT COUNT(*) FROM audit"),
    ];

    for (label, sql) in counts {
        let n = count(pool, sql)?;
        println!("{}• {}:{} {}{}{}", CYAN, label, RESET, GREEN, n, RESET);
    }

    //
    // 3) ASSIGNMENT DATE SPAN
    //
    let (first, last): (Option<String>, Option<String>) = pool.conn.query_row(
        "SELECT MIN(start_date), MAX(end_date) FROM assignments WHERE active = 1",
        [],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )?;

    let fmt_first = first.clone().unwrap_or_else(|| format!("{GREY}--{RESET}"));
    let fmt_last = last.clone().unwrap_or_else(|| format!("{GREY}--{RESET}"));

    println!("{}• Assignment span:{}", CYAN, RESET);
    println!("    from: {}", fmt_first);
    println!("    to:   {}", fmt_last);

    if let (Some(f), Some(l)) = (first, last)
        && let (Ok(d1), Ok(d2)) = (
            NaiveDate::parse_from_str(&f, "%Y-%m-%d"),
            NaiveDate::parse_from_str(&l, "%Y-%m-%d"),
        )
    {
        println!("{}• Span in days:{} {}", CYAN, RESET, (d2 - d1).num_days() + 1);
    }

    println!();
    Ok(())
}
