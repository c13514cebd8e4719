use crate::errors::{AppError, AppResult};
use crate::ui::messages::{info, success};
use serde_yaml::{Mapping, Value};
use std::fs;
use std::path::Path;

/// Every key the current `Config` writes, with its default value.
fn default_mapping(database: &str) -> AppResult<Mapping> {
    let defaults = super::Config::with_database(database.to_string());
    match serde_yaml::to_value(&defaults)? {
        Value::Mapping(map) => Ok(map),
        _ => Err(AppError::Config("default configuration is not a mapping".into())),
    }
}

fn read_mapping(conf_file: &Path) -> AppResult<Mapping> {
    let content = fs::read_to_string(conf_file)?;
    match serde_yaml::from_str::<Value>(&content)? {
        Value::Mapping(map) => Ok(map),
        Value::Null => Ok(Mapping::new()),
        _ => Err(AppError::Config(format!(
            "{} does not contain a YAML mapping",
            conf_file.display()
        ))),
    }
}

/// Return the configuration keys missing from `conf_file`.
pub fn missing_keys(conf_file: &Path) -> AppResult<Vec<String>> {
    let current = read_mapping(conf_file)?;
    let defaults = default_mapping("")?;

    Ok(defaults
        .keys()
        .filter(|k| !current.contains_key(*k))
        .filter_map(|k| k.as_str().map(str::to_string))
        .collect())
}

/// Add every missing key to `conf_file` with its default value, keeping the
/// values already present. Returns the keys that were added.
pub fn add_missing_keys(conf_file: &Path) -> AppResult<Vec<String>> {
    let mut current = read_mapping(conf_file)?;

    let database = current
        .get(Value::String("database".into()))
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| super::Config::database_file().to_string_lossy().to_string());

    let mut added = Vec::new();
    for (key, value) in default_mapping(&database)? {
        if !current.contains_key(&key) {
            if let Some(name) = key.as_str() {
                added.push(name.to_string());
            }
            current.insert(key, value);
        }
    }

    if added.is_empty() {
        info("Configuration is up to date.");
        return Ok(added);
    }

    let serialized = serde_yaml::to_string(&Value::Mapping(current))?;
    fs::write(conf_file, serialized)?;

    success(format!(
        "Configuration migrated: added {}",
        added.join(", ")
    ));

    Ok(added)
}
