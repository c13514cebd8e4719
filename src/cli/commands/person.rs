use crate::cli::commands::open_session;
use crate::cli::parser::{Cli, Commands, PersonCommand};
use crate::config::Config;
use crate::core::import::{ImportAction, ImportLogic};
use crate::core::personnel::{PersonChanges, PersonnelLogic};
use crate::errors::AppResult;
use crate::models::date_range::DateRange;
use crate::models::project::HistoryEntry;
use crate::ui::messages::{header, info, success, warning};
use crate::utils::colors::{RESET, color_for_status};
use crate::utils::date::{require_date, today};
use crate::utils::formatting::{or_dash, yes_no};
use crate::utils::table::Table;
use std::path::Path;

pub(crate) fn print_history(entries: &[HistoryEntry]) {
    if entries.is_empty() {
        info("No history recorded.");
        return;
    }

    let mut table = Table::with_headers(&["When", "Who", "Record", "Action", "Field", "Old", "New"]);
    for h in entries {
        table.add_row(vec![
            h.timestamp.chars().take(19).collect(),
            h.username.clone(),
            format!("#{} {}", h.entity_id, h.entity_name),
            h.action.clone(),
            h.field.clone(),
            or_dash(h.old_value.as_deref()),
            or_dash(h.new_value.as_deref()),
        ]);
    }
    print!("{}", table.render());
}

pub fn handle(cli: &Cli, cfg: &Config) -> AppResult<()> {
    let Commands::Person { action } = &cli.command else {
        return Ok(());
    };

    let (mut pool, session) = open_session(cli, cfg)?;

    match action {
        PersonCommand::Add { name, title, area } => {
            let id = PersonnelLogic::add(&pool.conn, &session, name, title.as_deref(), area.as_deref())?;
            success(format!("Person '{}' added (#{})", name.trim(), id));
        }

        PersonCommand::List { all } => {
            let people = PersonnelLogic::list(&pool.conn, &session, *all, today())?;
            if people.is_empty() {
                info("No personnel registered.");
                return Ok(());
            }

            let mut headers = vec!["ID", "Name", "Title", "Area", "Status"];
            if *all {
                headers.push("Active");
            }
            let mut table = Table::with_headers(&headers);
            for s in &people {
                let mut row = vec![
                    s.person.id.to_string(),
                    s.person.name.clone(),
                    or_dash(s.person.title.as_deref()),
                    or_dash(s.person.area.as_deref()),
                    format!("{}{}{}", color_for_status(s.busy), s.label(), RESET),
                ];
                if *all {
                    row.push(yes_no(s.person.active).to_string());
                }
                table.add_row(row);
            }
            print!("{}", table.render());
        }

        PersonCommand::Edit {
            id,
            name,
            title,
            area,
        } => {
            let changes = PersonChanges {
                name: name.clone(),
                title: title.clone(),
                area: area.clone(),
            };
            let changed = PersonnelLogic::edit(&pool.conn, &session, *id, &changes)?;
            if changed.is_empty() {
                info("Nothing changed.");
            } else {
                success(format!("Person #{} updated: {}", id, changed.join(", ")));
            }
        }

        PersonCommand::Deactivate { id } => {
            if PersonnelLogic::set_active(&pool.conn, &session, *id, false)? {
                success(format!("Person #{} deactivated", id));
            } else {
                info(format!("Person #{} is already inactive", id));
            }
        }

        PersonCommand::Activate { id } => {
            if PersonnelLogic::set_active(&pool.conn, &session, *id, true)? {
                success(format!("Person #{} activated", id));
            } else {
                info(format!("Person #{} is already active", id));
            }
        }

        PersonCommand::Available { from, to } => {
            let range = DateRange::new(require_date(from)?, require_date(to)?)?;
            let people = PersonnelLogic::available(&pool.conn, &session, &range)?;

            header(format!("Available {}", range));
            if people.is_empty() {
                warning("Nobody is free for the whole range.");
                return Ok(());
            }
            let mut table = Table::with_headers(&["ID", "Name", "Title", "Area"]);
            for p in people {
                table.add_row(vec![
                    p.id.to_string(),
                    p.name,
                    or_dash(p.title.as_deref()),
                    or_dash(p.area.as_deref()),
                ]);
            }
            print!("{}", table.render());
        }

        PersonCommand::Import { file, dry_run } => {
            let plan = ImportLogic::plan_file(&pool.conn, &session, Path::new(file))?;

            header("Import plan");
            for action in &plan.actions {
                match action {
                    ImportAction::Insert { name, .. } => println!("  + {}", name),
                    ImportAction::Update { before, after } => println!(
                        "  ~ {}: title {} → {}, area {} → {}",
                        before.name,
                        or_dash(before.title.as_deref()),
                        or_dash(after.title.as_deref()),
                        or_dash(before.area.as_deref()),
                        or_dash(after.area.as_deref())
                    ),
                    ImportAction::Skip { line, reason } => println!("  - line {}: {}", line, reason),
                }
            }
            for e in &plan.errors {
                warning(e);
            }
            info(format!(
                "New: {}  Update: {}  Skipped: {}  Errors: {}",
                plan.inserts(),
                plan.updates(),
                plan.skipped(),
                plan.errors.len()
            ));

            if *dry_run {
                info("Dry run: nothing written.");
            } else if !plan.has_changes() {
                info("Nothing to import.");
            } else {
                let report = ImportLogic::apply(&mut pool, &session, &plan)?;
                success(format!(
                    "Import completed: {} added, {} updated",
                    report.inserted, report.updated
                ));
            }
        }

        PersonCommand::History { id } => {
            print_history(&PersonnelLogic::history(&pool.conn, &session, *id)?);
        }
    }

    Ok(())
}
