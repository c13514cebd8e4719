use crate::cli::commands::open_session;
use crate::cli::parser::{AuditCommand, Cli, Commands};
use crate::config::Config;
use crate::db::audit::list_entries;
use crate::errors::AppResult;
use crate::models::role::Permission;
use crate::ui::messages::info;
use crate::utils::table::Table;

pub fn handle(cli: &Cli, cfg: &Config) -> AppResult<()> {
    let Commands::Audit {
        action: AuditCommand::List { limit, username },
    } = &cli.command
    else {
        return Ok(());
    };

    let (pool, session) = open_session(cli, cfg)?;
    session.require(Permission::ViewAudit)?;

    let entries = list_entries(&pool.conn, *limit, username.as_deref())?;
    if entries.is_empty() {
        info("Audit trail is empty.");
        return Ok(());
    }

    let mut table = Table::with_headers(&["ID", "When", "User", "Action", "Entity", "Detail"]);
    for e in entries {
        let entity = match e.entity_id {
            Some(id) => format!("{} #{}", e.entity, id),
            None => e.entity,
        };
        table.add_row(vec![
            e.id.to_string(),
            e.timestamp.chars().take(19).collect(),
            e.username,
            e.action,
            entity,
            e.detail,
        ]);
    }
    print!("{}", table.render());
    Ok(())
}
