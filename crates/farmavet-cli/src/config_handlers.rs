//! Handlers for `farmavet config ...`.
//!
//! Each handler returns the text to print so the dispatch function owns
//! stdout. Keys are dotted paths into the TOML form of [`FarmavetConfig`],
//! e.g. `server.port` or `auth.session_ttl_secs`.

use std::path::{Path, PathBuf};

use farmavet_core::traits::ConfigManager;
use farmavet_core::{Error, FarmavetConfig, Result};

use crate::cli::ConfigAction;

// ============================================================================
// Dispatch
// ============================================================================

/// Run a config action and print its output.
pub fn handle_config_command(config_path: Option<&str>, action: ConfigAction) -> Result<()> {
    let output = match action {
        ConfigAction::Path => config_path_report(config_path)?,
        ConfigAction::Get { key } => config_get(config_path, &key)?,
        ConfigAction::Set { key, value } => config_set(config_path, &key, &value)?,
        ConfigAction::Init { file, force } => config_init(file.as_deref(), force)?,
        ConfigAction::Export { docker_env } => {
            let config = FarmavetConfig::load(config_path)?;
            config_export(&config, docker_env)?
        }
    };
    println!("{output}");
    Ok(())
}

// ============================================================================
// Handlers
// ============================================================================

/// Resolved config file path, with a hint when it does not exist yet.
pub fn config_path_report(config_path: Option<&str>) -> Result<String> {
    let path = resolve(config_path)?;
    let mut out = path.display().to_string();
    if !path.exists() {
        out.push_str("\n(file does not exist; run `farmavet config init` to create it)");
    }
    Ok(out)
}

/// Value at a dotted key of the effective configuration.
pub fn config_get(config_path: Option<&str>, key: &str) -> Result<String> {
    let config = FarmavetConfig::load(config_path)?;
    let value = to_toml_value(&config)?;
    get_nested_value(&value, key)
        .map(format_toml_value)
        .ok_or_else(|| Error::config(format!("Key '{key}' not found in configuration")))
}

/// Set a dotted key in the config file.
///
/// Only keys that exist in the configuration are accepted, and the edited
/// file must still load as a valid configuration before it is written.
pub fn config_set(config_path: Option<&str>, key: &str, value: &str) -> Result<String> {
    let path = resolve(config_path)?;
    if !path.exists() {
        return Err(Error::config(format!(
            "Config file does not exist at {}. Run `farmavet config init` first.",
            path.display()
        )));
    }
    let defaults = to_toml_value(&FarmavetConfig::default())?;
    if get_nested_value(&defaults, key).is_none() {
        return Err(Error::config(format!("Unknown configuration key '{key}'")));
    }

    let content = std::fs::read_to_string(&path).map_err(|e| Error::io_with_path(e, &path))?;
    let mut doc: toml::Value = toml::from_str(&content)
        .map_err(|e| Error::config(format!("Failed to parse {}: {e}", path.display())))?;
    set_nested_value(&mut doc, key, parse_value(value))?;

    let rendered = toml::to_string_pretty(&doc).map_err(|e| Error::config(e.to_string()))?;
    toml::from_str::<FarmavetConfig>(&rendered)
        .map_err(|e| Error::config(format!("Invalid value for '{key}': {e}")))?;
    std::fs::write(&path, rendered).map_err(|e| Error::io_with_path(e, &path))?;

    Ok(format!("Set {key} = {value} in {}", path.display()))
}

/// Write a default config file.
pub fn config_init(file: Option<&str>, force: bool) -> Result<String> {
    let path = match file {
        Some(p) => PathBuf::from(p),
        None => FarmavetConfig::default_config_path()
            .ok_or_else(|| Error::config("Could not determine config directory"))?,
    };
    if path.exists() && !force {
        return Err(Error::config(format!(
            "Config file already exists at {}. Use --force to overwrite.",
            path.display()
        )));
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| Error::io_with_path(e, parent))?;
    }
    let rendered = FarmavetConfig::default().to_toml_string()?;
    std::fs::write(&path, rendered).map_err(|e| Error::io_with_path(e, &path))?;
    Ok(format!("Config file created at {}", path.display()))
}

/// Configuration as `KEY=VALUE` lines, or `--env KEY=VALUE` for Docker.
pub fn config_export(config: &FarmavetConfig, docker_env: bool) -> Result<String> {
    let lines: Vec<String> = config
        .to_env_vars()?
        .into_iter()
        .map(|(key, value)| {
            if docker_env {
                format!("--env {key}={value}")
            } else {
                format!("{key}={value}")
            }
        })
        .collect();
    Ok(lines.join("\n"))
}

fn resolve(config_path: Option<&str>) -> Result<PathBuf> {
    FarmavetConfig::resolve_config_path(config_path)
        .ok_or_else(|| Error::config("Could not determine config directory for this platform"))
}

fn to_toml_value(config: &FarmavetConfig) -> Result<toml::Value> {
    toml::Value::try_from(config).map_err(|e| Error::config(e.to_string()))
}

// ============================================================================
// TOML dotted-key helpers
// ============================================================================

/// Navigate a dotted key path in a TOML value tree.
pub fn get_nested_value<'a>(value: &'a toml::Value, key: &str) -> Option<&'a toml::Value> {
    key.split('.')
        .try_fold(value, |current, part| current.as_table()?.get(part))
}

/// Set a value at a dotted key path, creating intermediate tables as needed.
pub fn set_nested_value(root: &mut toml::Value, key: &str, value: toml::Value) -> Result<()> {
    let mut parts: Vec<&str> = key.split('.').collect();
    let last = parts
        .pop()
        .filter(|p| !p.is_empty())
        .ok_or_else(|| Error::config("Empty key path"))?;

    let mut current = root;
    for part in parts {
        let table = current
            .as_table_mut()
            .ok_or_else(|| Error::config("Cannot navigate into a non-table value"))?;
        current = table
            .entry(part.to_string())
            .or_insert(toml::Value::Table(toml::map::Map::new()));
    }
    current
        .as_table_mut()
        .ok_or_else(|| Error::config("Cannot set key on a non-table value"))?
        .insert(last.to_string(), value);
    Ok(())
}

/// Parse a command-line value: bool, then integer, then float, else string.
pub fn parse_value(s: &str) -> toml::Value {
    match s {
        "true" => toml::Value::Boolean(true),
        "false" => toml::Value::Boolean(false),
        _ => s
            .parse::<i64>()
            .map(toml::Value::Integer)
            .or_else(|_| s.parse::<f64>().map(toml::Value::Float))
            .unwrap_or_else(|_| toml::Value::String(s.to_string())),
    }
}

/// Format a TOML value for stdout.
pub fn format_toml_value(value: &toml::Value) -> String {
    match value {
        toml::Value::String(s) => s.clone(),
        toml::Value::Integer(i) => i.to_string(),
        toml::Value::Float(f) => f.to_string(),
        toml::Value::Boolean(b) => b.to_string(),
        toml::Value::Datetime(dt) => dt.to_string(),
        toml::Value::Array(_) | toml::Value::Table(_) => {
            toml::to_string_pretty(value).unwrap_or_else(|_| format!("{value:?}"))
        }
    }
}

/// Whether `path` holds a file that loads as a configuration.
pub fn is_valid_config_file(path: &Path) -> bool {
    path.to_str()
        .is_some_and(|p| path.exists() && FarmavetConfig::load(Some(p)).is_ok())
}

// ============================================================================
// Tests
// ============================================================================
