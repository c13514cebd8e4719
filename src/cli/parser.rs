use crate::export::{ExportFormat, ExportTarget};
use clap::{Parser, Subcommand};

/// Command-line interface definition for rStaffPlan
/// CLI application to plan personnel assignments on projects with SQLite
#[derive(Parser)]
#[command(
    name = "rstaffplan",
    version = env!("CARGO_PKG_VERSION"),
    about = "Personnel planning CLI: projects, assignments, availability and overlap checks on SQLite",
    long_about = None
)]
pub struct Cli {
    /// Override database path (useful for tests or custom DB)
    #[arg(global = true, long = "db")]
    pub db: Option<String>,

    /// Username to log in with
    #[arg(global = true, long = "user", env = "RSTAFFPLAN_USER")]
    pub user: Option<String>,

    /// Password to log in with
    #[arg(
        global = true,
        long = "password",
        env = "RSTAFFPLAN_PASSWORD",
        hide_env_values = true
    )]
    pub password: Option<String>,

    /// Run in test mode (no config file update)
    #[arg(global = true, long = "test", hide = true)]
    pub test: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database and configuration
    Init {
        /// Username of the first administrator
        #[arg(long = "admin-user", default_value = "admin")]
        admin_user: String,

        /// Password of the first administrator (required while no user exists)
        #[arg(long = "admin-password", env = "RSTAFFPLAN_ADMIN_PASSWORD", hide_env_values = true)]
        admin_password: Option<String>,
    },

    /// Manage the configuration file (view or edit)
    Config {
        #[arg(long = "print", help = "Print the current configuration file")]
        print_config: bool,

        #[arg(long = "check", help = "Check configuration file for missing fields")]
        check: bool,

        #[arg(long = "migrate", help = "Add missing fields with their default values")]
        migrate: bool,

        #[arg(
            long = "edit",
            help = "Edit the configuration file (default editor: $EDITOR, or nano/notepad)"
        )]
        edit_config: bool,

        #[arg(
            long = "editor",
            help = "Specify the editor to use (vim, nano, or custom path)"
        )]
        editor: Option<String>,
    },

    /// Manage the database (migrations, integrity checks, etc.)
    Db {
        #[arg(long = "migrate", help = "Run pending database migrations")]
        migrate: bool,

        #[arg(long = "check", help = "Check database integrity")]
        check: bool,

        #[arg(long = "vacuum", help = "Optimize the database using VACUUM")]
        vacuum: bool,

        #[arg(long = "info", help = "Show database information")]
        info: bool,
    },

    /// Print the internal log table
    Log {
        #[arg(long = "print", help = "Print rows from the internal log table")]
        print: bool,
    },

    /// Create a backup copy of the database
    Backup {
        /// Destination file path (absolute path required)
        #[arg(long, value_name = "FILE")]
        file: String,

        /// Compress the backup (zip on Windows, tar.gz elsewhere)
        #[arg(long)]
        compress: bool,

        /// Overwrite the destination without confirmation
        #[arg(long, short = 'f')]
        force: bool,
    },

    /// Export personnel, projects or assignments
    Export {
        #[arg(long, value_enum)]
        what: ExportTarget,

        #[arg(long, value_enum, default_value = "csv")]
        format: ExportFormat,

        /// Output file path (absolute path required)
        #[arg(long, value_name = "FILE")]
        file: String,

        /// Keep only records intersecting the range.
        ///
        /// YYYY, YYYY-MM, YYYY-MM-DD, or start:end in the same format
        /// (e.g. "2025-06:2025-08"). "all" disables the filter.
        #[arg(long, value_name = "RANGE")]
        range: Option<String>,

        /// Overwrite output file without confirmation
        #[arg(long, short = 'f')]
        force: bool,
    },

    /// Administer user accounts
    User {
        #[command(subcommand)]
        action: UserCommand,
    },

    /// Your own account (password change, reset tokens)
    Account {
        #[command(subcommand)]
        action: AccountCommand,
    },

    /// Manage personnel
    Person {
        #[command(subcommand)]
        action: PersonCommand,
    },

    /// Manage projects
    Project {
        #[command(subcommand)]
        action: ProjectCommand,
    },

    /// Assign personnel to projects
    Assign {
        #[command(subcommand)]
        action: AssignCommand,
    },

    /// Show assignments in a date window
    Calendar {
        /// First day (YYYY-MM-DD, default: 7 days ago)
        #[arg(long)]
        from: Option<String>,

        /// Last day (YYYY-MM-DD, default: 30 days ahead)
        #[arg(long)]
        to: Option<String>,

        /// Only this person (name, case-insensitive)
        #[arg(long)]
        person: Option<String>,

        /// Draw a text Gantt bar per assignment
        #[arg(long)]
        gantt: bool,
    },

    /// KPIs, alerts and weekly load heatmap
    Dashboard {
        /// Only this person (name, case-insensitive)
        #[arg(long)]
        person: Option<String>,

        /// Reference date (YYYY-MM-DD, default: today)
        #[arg(long = "as-of")]
        as_of: Option<String>,
    },

    /// Inspect the audit trail
    Audit {
        #[command(subcommand)]
        action: AuditCommand,
    },
}

#[derive(Subcommand)]
pub enum UserCommand {
    /// Create a user
    Add {
        username: String,

        /// admin, manager or user
        #[arg(long, default_value = "user")]
        role: String,

        #[arg(long = "new-password")]
        new_password: String,
    },

    /// List users
    List,

    /// Change the role of a user
    Role { username: String, role: String },

    /// Enable a user
    Enable { username: String },

    /// Disable a user
    Disable { username: String },

    /// Set a new password (also clears the lockout)
    ResetPassword {
        username: String,

        #[arg(long = "new-password")]
        new_password: String,
    },

    /// Clear failed attempts and lockout
    Unlock { username: String },

    /// Issue a one-time password reset token
    ResetToken { username: String },
}

#[derive(Subcommand)]
pub enum AccountCommand {
    /// Change your own password
    Password {
        #[arg(long = "new-password")]
        new_password: String,

        #[arg(long)]
        confirm: String,
    },

    /// Set a new password with a reset token (no login needed)
    RedeemToken {
        username: String,

        #[arg(long)]
        token: String,

        #[arg(long = "new-password")]
        new_password: String,
    },
}

#[derive(Subcommand)]
pub enum PersonCommand {
    /// Add a person
    Add {
        name: String,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        area: Option<String>,
    },

    /// List personnel with their Busy/Available state
    List {
        /// Include inactive personnel
        #[arg(long)]
        all: bool,
    },

    /// Edit a person (empty value clears title/area)
    Edit {
        id: i64,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        area: Option<String>,
    },

    /// Mark a person as inactive
    Deactivate { id: i64 },

    /// Mark a person as active again
    Activate { id: i64 },

    /// Personnel free for a whole date range
    Available {
        #[arg(long)]
        from: String,

        #[arg(long)]
        to: String,
    },

    /// Bulk import from CSV (columns: nombre|name, cargo|title, area)
    Import {
        #[arg(long, value_name = "FILE")]
        file: String,

        /// Show the plan without writing anything
        #[arg(long = "dry-run")]
        dry_run: bool,
    },

    /// Change history, newest first
    History { id: Option<i64> },
}

#[derive(Subcommand)]
pub enum ProjectCommand {
    /// Create a project
    Add {
        name: String,

        #[arg(long)]
        code: Option<String>,

        #[arg(long)]
        status: Option<String>,

        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        start: String,

        /// End date (YYYY-MM-DD)
        #[arg(long)]
        end: String,

        #[arg(long)]
        confirmed: bool,
    },

    /// List projects, most recent start first
    List {
        /// Include deleted projects
        #[arg(long)]
        all: bool,
    },

    /// Edit a project
    Edit {
        id: i64,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        code: Option<String>,

        #[arg(long)]
        status: Option<String>,

        #[arg(long)]
        start: Option<String>,

        #[arg(long)]
        end: Option<String>,

        /// true or false
        #[arg(long)]
        confirmed: Option<bool>,
    },

    /// Soft-delete a project (its assignments stop counting)
    Delete { id: i64 },

    /// Change history, newest first
    History { id: Option<i64> },
}

#[derive(Subcommand)]
pub enum AssignCommand {
    /// Assign one or more people to a project
    Add {
        #[arg(long)]
        project: i64,

        /// Person ids
        #[arg(long = "person", num_args = 1.., required = true)]
        persons: Vec<i64>,

        /// Start date (default: project start)
        #[arg(long)]
        from: Option<String>,

        /// End date (default: project end)
        #[arg(long)]
        to: Option<String>,

        /// Accept conflicts on an unconfirmed project
        #[arg(long)]
        force: bool,
    },

    /// Rank available people for a project by current load
    Suggest {
        #[arg(long)]
        project: i64,

        #[arg(long)]
        limit: Option<usize>,

        /// Load reference date (default: today)
        #[arg(long = "as-of")]
        as_of: Option<String>,
    },

    /// Assign the top suggestions
    Auto {
        #[arg(long)]
        project: i64,

        #[arg(long, default_value_t = 1)]
        limit: usize,

        #[arg(long = "as-of")]
        as_of: Option<String>,
    },

    /// List assignments
    List {
        #[arg(long)]
        person: Option<i64>,

        #[arg(long)]
        project: Option<i64>,

        /// Include ended assignments and deleted projects
        #[arg(long)]
        all: bool,
    },

    /// End (soft-delete) an assignment
    End { id: i64 },
}

#[derive(Subcommand)]
pub enum AuditCommand {
    /// Newest entries first
    List {
        #[arg(long, default_value_t = 50)]
        limit: usize,

        /// Only entries of this username (`--user` is the login flag)
        #[arg(long = "username")]
        username: Option<String>,
    },
}
