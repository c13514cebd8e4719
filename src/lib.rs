//! rStaffPlan library root.
//! Exposes the CLI parser, the high-level run() function and the internal modules.

pub mod cli;
pub mod config;
pub mod core;
pub mod db;
pub mod errors;
pub mod export;
pub mod models;
pub mod ui;
pub mod utils;

use clap::Parser;
use cli::commands;
use cli::parser::{Cli, Commands};
use config::Config;
use errors::AppResult;
use tracing_subscriber::EnvFilter;
use utils::path::expand_tilde;

/// Central command dispatcher
pub fn dispatch(cli: &Cli, cfg: &Config) -> AppResult<()> {
    match &cli.command {
        Commands::Init { .. } => commands::init::handle(cli),
        Commands::Config { .. } => commands::config::handle(&cli.command, cfg),
        Commands::Db { .. } => commands::db::handle(&cli.command, cfg),
        Commands::Log { .. } => commands::log::handle(&cli.command, cfg),
        Commands::Backup { .. } => commands::backup::handle(&cli.command, cfg),
        Commands::Export { .. } => commands::export::handle(cli, cfg),
        Commands::User { .. } => commands::user::handle(cli, cfg),
        Commands::Account { .. } => commands::account::handle(cli, cfg),
        Commands::Person { .. } => commands::person::handle(cli, cfg),
        Commands::Project { .. } => commands::project::handle(cli, cfg),
        Commands::Assign { .. } => commands::assign::handle(cli, cfg),
        Commands::Calendar { .. } => commands::calendar::handle(cli, cfg),
        Commands::Dashboard { .. } => commands::dashboard::handle(cli, cfg),
        Commands::Audit { .. } => commands::audit::handle(cli, cfg),
    }
}

/// Diagnostics go to stderr so they never mix with tables on stdout.
/// `RUST_LOG` selects the level, `warn` otherwise.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Entry point used by main.rs
pub fn run() -> AppResult<()> {
    // 1️⃣ parse CLI
    let cli = Cli::parse();
    init_tracing();

    // 2️⃣ load config once (a broken config file must not block test runs)
    let mut cfg = match Config::load() {
        Ok(cfg) => cfg,
        Err(e) if cli.test => {
            tracing::warn!(error = %e, "ignoring configuration file in test mode");
            Config::default()
        }
        Err(e) => return Err(e),
    };

    // 3️⃣ command-line override of the database path
    if let Some(custom_db) = &cli.db {
        cfg.database = expand_tilde(custom_db).to_string_lossy().to_string();
    }
    tracing::debug!(database = %cfg.database, "configuration loaded");

    // 4️⃣ hand everything to the dispatcher
    dispatch(&cli, &cfg)
}
