//! Formatting utilities used for CLI and export outputs.

use crate::utils::colors::{GREEN, RED, RESET, YELLOW};

pub fn yes_no(flag: bool) -> &'static str {
    if flag { "yes" } else { "no" }
}

pub fn or_dash(value: Option<&str>) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => v.to_string(),
        _ => "--".to_string(),
    }
}

/// Ten-cell load gauge, e.g. `[####------]  40%`, green → yellow → red.
pub fn load_bar(percent: i64) -> String {
    let p = percent.clamp(0, 100);
    let filled = (p / 10) as usize;
    let color = if p >= 100 {
        RED
    } else if p >= 60 {
        YELLOW
    } else {
        GREEN
    };
    format!(
        "{color}[{}{}]{RESET} {:>3}%",
        "#".repeat(filled),
        "-".repeat(10 - filled),
        p
    )
}
