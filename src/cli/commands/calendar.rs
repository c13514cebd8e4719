use crate::cli::commands::open_session;
use crate::cli::parser::{Cli, Commands};
use crate::config::Config;
use crate::core::calendar::{GanttScale, calendar_rows, gantt_bar};
use crate::errors::AppResult;
use crate::ui::messages::{header, info};
use crate::utils::colors::{GREEN, RESET, YELLOW};
use crate::utils::date::{range_or_default, today};
use crate::utils::table::Table;
use chrono::Duration;

const DAYS_BEFORE: i64 = 7;
const DAYS_AFTER: i64 = 30;

pub fn handle(cli: &Cli, cfg: &Config) -> AppResult<()> {
    let Commands::Calendar {
        from,
        to,
        person,
        gantt,
    } = &cli.command
    else {
        return Ok(());
    };

    let now = today();
    let window = range_or_default(
        from.as_ref(),
        to.as_ref(),
        now - Duration::days(DAYS_BEFORE),
        now + Duration::days(DAYS_AFTER),
    )?;

    let (pool, session) = open_session(cli, cfg)?;
    let rows = calendar_rows(&pool.conn, &session, &window, person.as_deref())?;

    header(format!("Calendar {}", window));
    if rows.is_empty() {
        info("No assignments in this window.");
        return Ok(());
    }

    let scale = GanttScale::for_window(&window);
    let mut headers = vec!["Person", "Project", "Start", "End"];
    if *gantt {
        headers.push(scale.label());
    }

    let mut table = Table::with_headers(&headers);
    for v in &rows {
        let mut row = vec![
            v.person.clone(),
            v.project.clone(),
            v.range.start_str(),
            v.range.end_str(),
        ];
        if *gantt {
            let color = if v.confirmed { GREEN } else { YELLOW };
            row.push(format!("{color}{}{RESET}", gantt_bar(&v.range, &window, scale)));
        }
        table.add_row(row);
    }
    print!("{}", table.render());

    if *gantt {
        info(format!("{GREEN}confirmed{RESET} / {YELLOW}not confirmed{RESET}"));
    }
    Ok(())
}
