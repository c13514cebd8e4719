use crate::db::log::{LogRow, load_log};
use crate::db::pool::DbPool;
use crate::errors::AppResult;
use ansi_term::Colour;
use regex::Regex;

const OP_TARGET_MAX: usize = 60;

fn strip_ansi(s: &str) -> String {
    match Regex::new(r"\x1B\[[0-9;]*[mK]") {
        Ok(re) => re.replace_all(s, "").into_owned(),
        Err(_) => s.to_string(),
    }
}

fn color_for_operation(op: &str) -> Colour {
    match op {
        "init" => Colour::RGB(255, 153, 51),
        "bootstrap" => Colour::Green,
        "migration_applied" => Colour::Purple,
        "backup" => Colour::Blue,
        "vacuum" | "integrity_check" => Colour::Cyan,
        _ => Colour::White,
    }
}

/// `operation (target)`, cut to `OP_TARGET_MAX` visible chars with only
/// the operation word coloured.
fn render_op_target(row: &LogRow) -> String {
    let plain = if row.target.is_empty() {
        row.operation.clone()
    } else {
        format!("{} ({})", row.operation, row.target)
    };

    let visible = if plain.chars().count() > OP_TARGET_MAX {
        let mut s: String = plain.chars().take(OP_TARGET_MAX - 3).collect();
        s.push_str("...");
        s
    } else {
        plain
    };

    let color = color_for_operation(&row.operation);
    match visible.split_once(' ') {
        Some((op, rest)) => format!("{} {}", color.paint(op), rest),
        None => color.paint(visible.as_str()).to_string(),
    }
}

pub struct LogLogic;

impl LogLogic {
    pub fn print_log(pool: &mut DbPool) -> AppResult<()> {
        let entries = load_log(&pool.conn)?;

        if entries.is_empty() {
            println!("📜 Internal log is empty.");
            return Ok(());
        }

        let id_w = entries
            .iter()
            .map(|r| r.id.to_string().len())
            .max()
            .unwrap_or(1);

        let dates: Vec<String> = entries
            .iter()
            .map(|r| {
                chrono::DateTime::parse_from_rfc3339(&r.date)
                    .map(|dt| dt.format("%FT%T%:z").to_string())
                    .unwrap_or_else(|_| r.date.clone())
            })
            .collect();
        let date_w = dates.iter().map(String::len).max().unwrap_or(10);

        let op_w = entries
            .iter()
            .map(|r| r.operation.len() + r.target.len() + 3)
            .max()
            .unwrap_or(10)
            .min(OP_TARGET_MAX);

        println!("📜 Internal log:\n");

        for (row, date) in entries.iter().zip(dates) {
            let op_target = render_op_target(row);
            let padding = " ".repeat(op_w.saturating_sub(strip_ansi(&op_target).chars().count()));

            println!(
                "{:>id_w$}: {:<date_w$} | {}{} => {}",
                row.id,
                date,
                op_target,
                padding,
                row.message,
                id_w = id_w,
                date_w = date_w
            );
        }

        Ok(())
    }
}
