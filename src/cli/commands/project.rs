use crate::cli::commands::open_session;
use crate::cli::commands::person::print_history;
use crate::cli::parser::{Cli, Commands, ProjectCommand};
use crate::config::Config;
use crate::core::projects::ProjectLogic;
use crate::errors::AppResult;
use crate::models::project::ProjectChanges;
use crate::ui::messages::{info, success};
use crate::utils::colors::{GREEN, GREY, RESET, YELLOW};
use crate::utils::date::{parse_optional_date, require_date};
use crate::utils::formatting::or_dash;
use crate::utils::table::Table;

pub fn handle(cli: &Cli, cfg: &Config) -> AppResult<()> {
    let Commands::Project { action } = &cli.command else {
        return Ok(());
    };

    let (pool, session) = open_session(cli, cfg)?;
    let conn = &pool.conn;

    match action {
        ProjectCommand::Add {
            name,
            code,
            status,
            start,
            end,
            confirmed,
        } => {
            let input = ProjectChanges {
                name: Some(name.clone()),
                code: code.clone(),
                status: status.clone(),
                start: Some(require_date(start)?),
                end: Some(require_date(end)?),
                confirmed: Some(*confirmed),
            };
            let id = ProjectLogic::create(conn, &session, &input)?;
            success(format!("Project '{}' created (#{})", name.trim(), id));
        }

        ProjectCommand::List { all } => {
            let projects = ProjectLogic::list(conn, &session, *all)?;
            if projects.is_empty() {
                info("No projects found.");
                return Ok(());
            }

            let mut table = Table::with_headers(&["ID", "Name", "Code", "Status", "Start", "End", "Confirmation"]);
            for p in projects {
                let confirmation = if p.deleted {
                    format!("{GREY}deleted{RESET}")
                } else if p.confirmed {
                    format!("{GREEN}{}{RESET}", p.confirmation_label())
                } else {
                    format!("{YELLOW}{}{RESET}", p.confirmation_label())
                };
                table.add_row(vec![
                    p.id.to_string(),
                    p.name.clone(),
                    or_dash(p.code.as_deref()),
                    p.status.clone(),
                    p.range.start_str(),
                    p.range.end_str(),
                    confirmation,
                ]);
            }
            print!("{}", table.render());
        }

        ProjectCommand::Edit {
            id,
            name,
            code,
            status,
            start,
            end,
            confirmed,
        } => {
            let changes = ProjectChanges {
                name: name.clone(),
                code: code.clone(),
                status: status.clone(),
                start: parse_optional_date(start.as_ref())?,
                end: parse_optional_date(end.as_ref())?,
                confirmed: *confirmed,
            };
            let changed = ProjectLogic::edit(conn, &session, *id, &changes)?;
            if changed.is_empty() {
                info("Nothing changed.");
            } else {
                success(format!("Project #{} updated: {}", id, changed.join(", ")));
            }
        }

        ProjectCommand::Delete { id } => {
            let project = ProjectLogic::delete(conn, &session, *id)?;
            success(format!("Project '{}' deleted", project.name));
        }

        ProjectCommand::History { id } => {
            print_history(&ProjectLogic::history(conn, &session, *id)?);
        }
    }

    Ok(())
}
