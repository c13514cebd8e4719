use crate::cli::commands::open_session;
use crate::cli::parser::{Cli, Commands};
use crate::config::Config;
use crate::export::ExportLogic;
use crate::errors::AppResult;

pub fn handle(cli: &Cli, cfg: &Config) -> AppResult<()> {
    if let Commands::Export {
        what,
        format,
        file,
        range,
        force,
    } = &cli.command
    {
        let (mut pool, session) = open_session(cli, cfg)?;
        ExportLogic::export(
            &mut pool,
            &session,
            *what,
            *format,
            file,
            range.as_deref(),
            *force,
        )?;
    }
    Ok(())
}
