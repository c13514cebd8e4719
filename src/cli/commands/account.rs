use crate::cli::commands::open_session;
use crate::cli::parser::{AccountCommand, Cli, Commands};
use crate::config::Config;
use crate::core::users::UserLogic;
use crate::db::pool::DbPool;
use crate::errors::AppResult;
use crate::ui::messages::success;
use chrono::Local;

pub fn handle(cli: &Cli, cfg: &Config) -> AppResult<()> {
    let Commands::Account { action } = &cli.command else {
        return Ok(());
    };

    match action {
        AccountCommand::Password {
            new_password,
            confirm,
        } => {
            let (pool, session) = open_session(cli, cfg)?;
            UserLogic::change_own_password(&pool.conn, cfg, &session, new_password, confirm)?;
            success("Password changed");
        }

        // no login: the token is the credential
        AccountCommand::RedeemToken {
            username,
            token,
            new_password,
        } => {
            let pool = DbPool::open(cfg)?;
            UserLogic::redeem_token(&pool.conn, cfg, username, token, new_password, Local::now())?;
            success(format!("Password of '{}' updated", username));
        }
    }

    Ok(())
}
