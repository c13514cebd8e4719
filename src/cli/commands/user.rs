use crate::cli::commands::open_session;
use crate::cli::parser::{Cli, Commands, UserCommand};
use crate::config::Config;
use crate::core::users::UserLogic;
use crate::errors::AppResult;
use crate::models::role::Role;
use crate::ui::messages::{info, success, warning};
use crate::utils::colors::{RED, RESET};
use crate::utils::formatting::yes_no;
use crate::utils::table::Table;
use chrono::Local;

pub fn handle(cli: &Cli, cfg: &Config) -> AppResult<()> {
    let Commands::User { action } = &cli.command else {
        return Ok(());
    };

    let (pool, session) = open_session(cli, cfg)?;
    let conn = &pool.conn;

    match action {
        UserCommand::Add {
            username,
            role,
            new_password,
        } => {
            let role = Role::parse(role)?;
            let id = UserLogic::create(conn, cfg, &session, username, role, new_password)?;
            success(format!("User '{}' created (#{}, {})", username.trim(), id, role));
        }

        UserCommand::List => {
            let now = Local::now();
            let users = UserLogic::list(conn, &session)?;

            let mut table = Table::with_headers(&["ID", "Username", "Role", "Active", "Failed", "Locked until"]);
            for u in users {
                let locked = match u.locked_until {
                    Some(t) if u.is_locked(now) => {
                        format!("{RED}{}{RESET}", t.format("%Y-%m-%d %H:%M"))
                    }
                    _ => "--".to_string(),
                };
                table.add_row(vec![
                    u.id.to_string(),
                    u.username,
                    u.role.to_string(),
                    yes_no(u.active).to_string(),
                    u.failed_attempts.to_string(),
                    locked,
                ]);
            }
            print!("{}", table.render());
        }

        UserCommand::Role { username, role } => {
            let role = Role::parse(role)?;
            UserLogic::change_role(conn, &session, username, role)?;
            success(format!("'{}' is now {}", username, role));
        }

        UserCommand::Enable { username } => {
            UserLogic::set_active(conn, &session, username, true)?;
            success(format!("User '{}' enabled", username));
        }

        UserCommand::Disable { username } => {
            UserLogic::set_active(conn, &session, username, false)?;
            success(format!("User '{}' disabled", username));
        }

        UserCommand::ResetPassword {
            username,
            new_password,
        } => {
            UserLogic::reset_password(conn, cfg, &session, username, new_password)?;
            success(format!("Password of '{}' reset", username));
        }

        UserCommand::Unlock { username } => {
            UserLogic::unlock(conn, &session, username)?;
            success(format!("User '{}' unlocked", username));
        }

        UserCommand::ResetToken { username } => {
            let (token, expires) = UserLogic::issue_reset_token(conn, cfg, &session, username, Local::now())?;
            success(format!("Reset token for '{}':", username));
            println!("{}", token);
            info(format!("Valid until {}", expires.format("%Y-%m-%d %H:%M")));
            warning("The token is shown only once.");
        }
    }

    Ok(())
}
