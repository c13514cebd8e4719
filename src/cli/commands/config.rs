use crate::config::Config;
use crate::config::migrate::{add_missing_keys, missing_keys};
use crate::errors::AppResult;
use crate::ui::messages::{error, info, success, warning};

use crate::cli::parser::Commands;
use std::process::Command;

fn default_editor() -> String {
    std::env::var("EDITOR")
        .or_else(|_| std::env::var("VISUAL"))
        .unwrap_or_else(|_| {
            if cfg!(target_os = "windows") {
                "notepad".to_string()
            } else {
                "nano".to_string()
            }
        })
}

fn run_editor(editor: &str, path: &std::path::Path) -> bool {
    matches!(Command::new(editor).arg(path).status(), Ok(s) if s.success())
}

/// Handle the `config` subcommand
pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Config {
        print_config,
        check,
        migrate,
        edit_config,
        editor,
    } = cmd
    {
        let path = Config::config_file();

        // ---- PRINT CONFIG ----
        if *print_config {
            println!("📄 Current configuration ({}):\n", path.display());
            println!("{}", serde_yaml::to_string(cfg)?);
        }

        // ---- CHECK ----
        if *check {
            if !path.exists() {
                warning(format!("{} does not exist: run `init` first", path.display()));
            } else {
                let missing = missing_keys(&path)?;
                if missing.is_empty() {
                    success("Configuration file is complete.");
                } else {
                    warning(format!(
                        "Missing keys: {} (run `config --migrate`)",
                        missing.join(", ")
                    ));
                }
            }
        }

        // ---- MIGRATE ----
        if *migrate {
            if path.exists() {
                add_missing_keys(&path)?;
            } else {
                warning(format!("{} does not exist: run `init` first", path.display()));
            }
        }

        // ---- EDIT CONFIG ----
        if *edit_config {
            let fallback = default_editor();
            let editor_to_use = editor.clone().unwrap_or_else(|| fallback.clone());

            if run_editor(&editor_to_use, &path) {
                success(format!(
                    "Configuration file edited successfully using '{}'",
                    editor_to_use
                ));
            } else {
                warning(format!(
                    "Editor '{}' not available, falling back to '{}'",
                    editor_to_use, fallback
                ));

                if run_editor(&fallback, &path) {
                    success(format!(
                        "Configuration file edited successfully using fallback '{}'",
                        fallback
                    ));
                } else {
                    error(format!(
                        "Failed to edit configuration file using fallback '{}'",
                        fallback
                    ));
                }
            }
        }

        if !(*print_config || *check || *migrate || *edit_config) {
            info("Nothing to do: use --print, --check, --migrate or --edit.");
        }
    }

    Ok(())
}
