use crate::cli::commands::open_session;
use crate::cli::parser::{AssignCommand, Cli, Commands};
use crate::config::Config;
use crate::core::assign::{AssignLogic, AssignOutcome, AssignRequest};
use crate::db::assignments::AssignmentFilter;
use crate::db::projects::get_live_project;
use crate::errors::AppResult;
use crate::models::date_range::DateRange;
use crate::ui::messages::{header, info, success, warning};
use crate::utils::colors::{GREY, RESET};
use crate::utils::date::{parse_optional_date, today};
use crate::utils::formatting::yes_no;
use crate::utils::load_bar;
use crate::utils::table::Table;

fn report(outcome: &AssignOutcome) {
    for c in &outcome.forced {
        warning(format!("Forced: {}", c.describe()));
    }
    if outcome.created.is_empty() {
        info("Nobody was assigned.");
    } else {
        let ids: Vec<String> = outcome.created.iter().map(|id| format!("#{id}")).collect();
        success(format!("Created assignment(s) {}", ids.join(", ")));
    }
}

pub fn handle(cli: &Cli, cfg: &Config) -> AppResult<()> {
    let Commands::Assign { action } = &cli.command else {
        return Ok(());
    };

    let (mut pool, session) = open_session(cli, cfg)?;

    match action {
        AssignCommand::Add {
            project,
            persons,
            from,
            to,
            force,
        } => {
            // 1️⃣ Range: explicit bounds fall back to the project's own dates
            let from = parse_optional_date(from.as_ref())?;
            let to = parse_optional_date(to.as_ref())?;
            let range = if from.is_some() || to.is_some() {
                let p = get_live_project(&pool.conn, *project)?;
                Some(DateRange::new(
                    from.unwrap_or(p.range.start),
                    to.unwrap_or(p.range.end),
                )?)
            } else {
                None
            };

            let req = AssignRequest {
                project_id: *project,
                person_ids: persons.clone(),
                range,
                force: *force,
            };
            report(&AssignLogic::apply(&mut pool, &session, &req)?);
        }

        AssignCommand::Suggest {
            project,
            limit,
            as_of,
        } => {
            let as_of = parse_optional_date(as_of.as_ref())?.unwrap_or_else(today);
            let picks = AssignLogic::suggest(&pool.conn, cfg, &session, *project, as_of, *limit)?;

            header(format!("Suggestions for project #{} (load as of {})", project, as_of));
            if picks.is_empty() {
                warning("Nobody is available for the whole project range.");
                return Ok(());
            }
            let mut table = Table::with_headers(&["ID", "Name", "Assignments", "Load"]);
            for s in picks {
                table.add_row(vec![
                    s.person_id.to_string(),
                    s.name,
                    s.assignments_in_window.to_string(),
                    load_bar(s.load_percent),
                ]);
            }
            print!("{}", table.render());
        }

        AssignCommand::Auto {
            project,
            limit,
            as_of,
        } => {
            let as_of = parse_optional_date(as_of.as_ref())?.unwrap_or_else(today);
            report(&AssignLogic::auto(&mut pool, cfg, &session, *project, as_of, Some(*limit))?);
        }

        AssignCommand::List {
            person,
            project,
            all,
        } => {
            let filter = AssignmentFilter {
                person_id: *person,
                project_id: *project,
                include_inactive: *all,
                ..Default::default()
            };
            let rows = AssignLogic::list(&pool.conn, &session, &filter)?;
            if rows.is_empty() {
                info("No assignments found.");
                return Ok(());
            }

            let mut table = Table::with_headers(&["ID", "Person", "Project", "Start", "End", "Confirmed", "Active"]);
            for v in rows {
                let active = if v.active {
                    yes_no(true).to_string()
                } else {
                    format!("{GREY}{}{RESET}", yes_no(false))
                };
                table.add_row(vec![
                    v.id.to_string(),
                    v.person,
                    v.project,
                    v.range.start_str(),
                    v.range.end_str(),
                    yes_no(v.confirmed).to_string(),
                    active,
                ]);
            }
            print!("{}", table.render());
        }

        AssignCommand::End { id } => {
            let a = AssignLogic::end(&pool.conn, &session, *id)?;
            success(format!("Assignment #{} ended ({})", a.id, a.range));
        }
    }

    Ok(())
}
