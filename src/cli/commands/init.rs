use crate::config::Config;
use crate::core::users::UserLogic;
use crate::db::log;
use crate::db::pool::DbPool;
use crate::db::users::count_users;
use crate::errors::{AppError, AppResult};
use crate::ui::messages::{header, success, warning};

use crate::cli::parser::{Cli, Commands};
use crate::db::initialize::init_db;

/// Handle the `init` command
///
/// This initializes:
///  - the config directory (if missing)
///  - the configuration file
///  - the SQLite database (prod or test mode)
///  - all pending DB migrations
///  - the first admin account, when no user exists yet
pub fn handle(cli: &Cli) -> AppResult<()> {
    let Commands::Init {
        admin_user,
        admin_password,
    } = &cli.command
    else {
        return Ok(());
    };

    //
    // 1️⃣ CONFIGURATION
    //
    let db_path = Config::init_all(cli.db.clone(), cli.test)?;

    let mut cfg = if cli.test {
        Config::default()
    } else {
        Config::load()?
    };
    cfg.database = db_path.to_string_lossy().to_string();

    header("Initializing rStaffPlan");

    //
    // 2️⃣ DATABASE (tables + migrations)
    //
    let pool = DbPool::open(&cfg)?;
    init_db(&pool.conn)?;
    success(format!("Database initialized at {}", cfg.database));

    if let Err(e) = log::ttlog(
        &pool.conn,
        "init",
        "Database initialized",
        &format!("Database initialized at {}", cfg.database),
    ) {
        warning(format!("Failed to write internal log: {}", e));
    }

    //
    // 3️⃣ FIRST ADMIN
    //
    if count_users(&pool.conn)? == 0 {
        let Some(password) = admin_password else {
            return Err(AppError::Validation(
                "no user exists yet: pass --admin-password to create the first admin".into(),
            ));
        };

        UserLogic::bootstrap_admin(&pool.conn, &cfg, admin_user, password)?;
        log::ttlog(
            &pool.conn,
            "bootstrap",
            admin_user,
            "First admin account created",
        )?;
        success(format!("Admin user '{}' created", admin_user.trim()));
    }

    success("rStaffPlan initialization completed!");
    Ok(())
}
