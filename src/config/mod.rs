use crate::errors::AppResult;
use crate::utils::path::expand_tilde;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::io::Write;
use std::path::PathBuf;

pub mod migrate; // use submodule at src/config/migrate.rs

/// Environment variable overriding the configured database path.
pub const DB_ENV: &str = "RSTAFFPLAN_DB";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: String,
    #[serde(default = "default_max_failed_logins")]
    pub max_failed_logins: i64,
    #[serde(default = "default_lockout_minutes")]
    pub lockout_minutes: i64,
    #[serde(default = "default_min_password_length")]
    pub min_password_length: usize,
    #[serde(default = "default_reset_token_minutes")]
    pub reset_token_minutes: i64,
    #[serde(default = "default_load_window_days")]
    pub load_window_days: u32,
    #[serde(default = "default_load_per_assignment")]
    pub load_per_assignment: i64,
    #[serde(default = "default_ending_soon_days")]
    pub ending_soon_days: i64,
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
}

pub(crate) fn default_max_failed_logins() -> i64 {
    5
}
pub(crate) fn default_lockout_minutes() -> i64 {
    10
}
pub(crate) fn default_min_password_length() -> usize {
    8
}
pub(crate) fn default_reset_token_minutes() -> i64 {
    60
}
pub(crate) fn default_load_window_days() -> u32 {
    30
}
pub(crate) fn default_load_per_assignment() -> i64 {
    20
}
pub(crate) fn default_ending_soon_days() -> i64 {
    7
}
pub(crate) fn default_busy_timeout_ms() -> u64 {
    5000
}

impl Default for Config {
    fn default() -> Self {
        Self::with_database(Self::database_file().to_string_lossy().to_string())
    }
}

impl Config {
    pub fn with_database(database: String) -> Self {
        Self {
            database,
            max_failed_logins: default_max_failed_logins(),
            lockout_minutes: default_lockout_minutes(),
            min_password_length: default_min_password_length(),
            reset_token_minutes: default_reset_token_minutes(),
            load_window_days: default_load_window_days(),
            load_per_assignment: default_load_per_assignment(),
            ending_soon_days: default_ending_soon_days(),
            busy_timeout_ms: default_busy_timeout_ms(),
        }
    }

    /// Return the standard configuration directory depending on the platform
    pub fn config_dir() -> PathBuf {
        if cfg!(target_os = "windows") {
            let appdata = env::var("APPDATA").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(appdata).join("rstaffplan")
        } else {
            let home = env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".rstaffplan")
        }
    }

    /// Return the full path of the config file
    pub fn config_file() -> PathBuf {
        Self::config_dir().join("rstaffplan.conf")
    }

    /// Return the full path of the SQLite database
    pub fn database_file() -> PathBuf {
        Self::config_dir().join("rstaffplan.sqlite")
    }

    /// Load configuration from file, or return defaults if not found.
    /// `RSTAFFPLAN_DB` overrides the configured database path.
    pub fn load() -> AppResult<Self> {
        let path = Self::config_file();

        let mut cfg = if path.exists() {
            let content = fs::read_to_string(&path)?;
            serde_yaml::from_str::<Config>(&content)?
        } else {
            Config::default()
        };

        if let Ok(db) = env::var(DB_ENV)
            && !db.trim().is_empty()
        {
            cfg.database = db;
        }

        cfg.database = expand_tilde(&cfg.database).to_string_lossy().to_string();
        Ok(cfg)
    }

    /// Initialize configuration and database files
    pub fn init_all(custom_name: Option<String>, is_test: bool) -> AppResult<PathBuf> {
        let dir = Self::config_dir();

        // DB name: user provided or default
        let db_path = if let Some(name) = custom_name {
            let p = expand_tilde(&name);
            if p.is_absolute() { p } else { dir.join(p) }
        } else {
            dir.join("rstaffplan.sqlite")
        };

        if let Some(parent) = db_path.parent() {
            fs::create_dir_all(parent)?;
        }

        // Write config file
        if !is_test {
            fs::create_dir_all(&dir)?;
            let config = Config::with_database(db_path.to_string_lossy().to_string());
            let yaml = serde_yaml::to_string(&config)?;
            let mut file = fs::File::create(Self::config_file())?;
            file.write_all(yaml.as_bytes())?;
            println!("✅ Config file: {:?}", Self::config_file());
        }

        // Create empty DB file if not exists
        if !db_path.exists() {
            fs::File::create(&db_path)?;
        }

        println!("✅ Database:    {:?}", db_path);

        Ok(db_path)
    }
}
