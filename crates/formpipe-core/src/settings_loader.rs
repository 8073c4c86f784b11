//! Settings loading from configuration files.
//!
//! This module loads [`Settings`] from TOML or JSON and applies environment
//! variable overrides.
//!
//! ## Loading Order
//!
//! 1. Start with default settings.
//! 2. Load from a TOML or JSON file (overriding defaults).
//! 3. Apply environment variable overrides (highest priority).
//!
//! ## Environment Variable Mapping
//!
//! | Env Var | Setting |
//! |---|---|
//! | `FORMPIPE_DEBUG` | `debug` |
//! | `FORMPIPE_LOG_LEVEL` | `log_level` |
//! | `FORMPIPE_BIND_ADDRESS` | `bind_address` |
//! | `FORMPIPE_SAVE_SUBMISSIONS` | `save_submissions` |
//! | `FORMPIPE_EMAIL_SUBMISSIONS` | `email_submissions` |
//! | `FORMPIPE_TESTING` | `testing` |
//! | `FORMPIPE_EMAIL_BACKEND` | `email_backend` |
//! | `FORMPIPE_DEFAULT_FROM_EMAIL` | `default_from_email` |
//! | `FORMPIPE_SUBMISSIONS_PATH` | `submissions_path` |
//! | `FORMPIPE_FORMS_PATH` | `forms_path` |
//!
//! ## Examples
//!
//! ```rust,no_run
//! use formpipe_core::settings_loader;
//!
//! let settings = settings_loader::from_toml_file_with_env("formpipe.toml").unwrap();
//! ```

use std::path::{Path, PathBuf};

use crate::error::FormError;
use crate::settings::Settings;

/// Loads settings from a TOML string.
///
/// Any fields not present in the TOML keep their default values.
pub fn from_toml_str(toml_str: &str) -> Result<Settings, FormError> {
    // Deserialize into a JSON value first so it can be merged over the
    // serialized defaults.
    let toml_value: toml::Value = toml::from_str(toml_str)
        .map_err(|e| FormError::ConfigurationError(format!("Failed to parse TOML: {e}")))?;

    merge_over_defaults(toml_to_json(toml_value), "TOML")
}

/// Loads settings from a TOML file.
pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Settings, FormError> {
    from_toml_str(&read_config(path.as_ref(), "TOML")?)
}

/// Loads settings from a TOML file and then applies environment variable overrides.
pub fn from_toml_file_with_env(path: impl AsRef<Path>) -> Result<Settings, FormError> {
    let mut settings = from_toml_file(path)?;
    apply_env_overrides(&mut settings);
    Ok(settings)
}

/// Loads settings from a JSON string.
pub fn from_json_str(json_str: &str) -> Result<Settings, FormError> {
    let json_value: serde_json::Value = serde_json::from_str(json_str)
        .map_err(|e| FormError::ConfigurationError(format!("Failed to parse JSON: {e}")))?;

    merge_over_defaults(json_value, "JSON")
}

/// Loads settings from a JSON file.
pub fn from_json_file(path: impl AsRef<Path>) -> Result<Settings, FormError> {
    from_json_str(&read_config(path.as_ref(), "JSON")?)
}

/// Loads settings from a file, choosing the format by extension.
///
/// Files ending in `.json` are parsed as JSON, everything else as TOML.
/// Environment overrides are applied afterwards.
pub fn from_file_with_env(path: impl AsRef<Path>) -> Result<Settings, FormError> {
    let path = path.as_ref();
    let mut settings = match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => from_json_file(path)?,
        _ => from_toml_file(path)?,
    };
    apply_env_overrides(&mut settings);
    Ok(settings)
}

/// Loads settings from just environment variables (starting from defaults).
pub fn from_env() -> Settings {
    let mut settings = Settings::default();
    apply_env_overrides(&mut settings);
    settings
}

/// Applies `FORMPIPE_*` environment variable overrides to a settings struct.
///
/// Boolean values accept "true", "1" and "yes" (case-insensitive); anything
/// else is false.
pub fn apply_env_overrides(settings: &mut Settings) {
    if let Ok(val) = std::env::var("FORMPIPE_DEBUG") {
        settings.debug = parse_bool(&val);
    }

    if let Ok(val) = std::env::var("FORMPIPE_LOG_LEVEL") {
        settings.log_level = val;
    }

    if let Ok(val) = std::env::var("FORMPIPE_BIND_ADDRESS") {
        settings.bind_address = val;
    }

    if let Ok(val) = std::env::var("FORMPIPE_SAVE_SUBMISSIONS") {
        settings.save_submissions = parse_bool(&val);
    }

    if let Ok(val) = std::env::var("FORMPIPE_EMAIL_SUBMISSIONS") {
        settings.email_submissions = parse_bool(&val);
    }

    if let Ok(val) = std::env::var("FORMPIPE_TESTING") {
        settings.testing = parse_bool(&val);
    }

    if let Ok(val) = std::env::var("FORMPIPE_EMAIL_BACKEND") {
        settings.email_backend = val;
    }

    if let Ok(val) = std::env::var("FORMPIPE_DEFAULT_FROM_EMAIL") {
        settings.default_from_email = val;
    }

    if let Ok(val) = std::env::var("FORMPIPE_SUBMISSIONS_PATH") {
        settings.submissions_path = Some(PathBuf::from(val));
    }

    if let Ok(val) = std::env::var("FORMPIPE_FORMS_PATH") {
        settings.forms_path = Some(PathBuf::from(val));
    }
}

// ============================================================
// Helpers
// ============================================================

fn parse_bool(val: &str) -> bool {
    matches!(val.to_lowercase().as_str(), "true" | "1" | "yes")
}

fn read_config(path: &Path, format: &str) -> Result<String, FormError> {
    std::fs::read_to_string(path).map_err(|e| {
        FormError::ConfigurationError(format!(
            "Failed to read {format} file '{}': {e}",
            path.display()
        ))
    })
}

fn merge_over_defaults(value: serde_json::Value, format: &str) -> Result<Settings, FormError> {
    let default_json = serde_json::to_value(Settings::default()).map_err(|e| {
        FormError::ConfigurationError(format!("Failed to serialize default settings: {e}"))
    })?;

    let merged = merge_json(default_json, value);
    serde_json::from_value(merged).map_err(|e| {
        FormError::ConfigurationError(format!("Failed to deserialize settings from {format}: {e}"))
    })
}

/// Converts a TOML value to a `serde_json::Value`.
fn toml_to_json(value: toml::Value) -> serde_json::Value {
    match value {
        toml::Value::String(s) => serde_json::Value::String(s),
        toml::Value::Integer(i) => serde_json::json!(i),
        toml::Value::Float(f) => serde_json::json!(f),
        toml::Value::Boolean(b) => serde_json::Value::Bool(b),
        toml::Value::Datetime(dt) => serde_json::Value::String(dt.to_string()),
        toml::Value::Array(arr) => {
            serde_json::Value::Array(arr.into_iter().map(toml_to_json).collect())
        }
        toml::Value::Table(table) => {
            let map: serde_json::Map<String, serde_json::Value> = table
                .into_iter()
                .map(|(k, v)| (k, toml_to_json(v)))
                .collect();
            serde_json::Value::Object(map)
        }
    }
}

/// Deep-merges two JSON values. The `override_val` takes precedence.
fn merge_json(base: serde_json::Value, override_val: serde_json::Value) -> serde_json::Value {
    match (base, override_val) {
        (serde_json::Value::Object(mut base_map), serde_json::Value::Object(override_map)) => {
            for (key, override_v) in override_map {
                let merged = if let Some(base_v) = base_map.remove(&key) {
                    merge_json(base_v, override_v)
                } else {
                    override_v
                };
                base_map.insert(key, merged);
            }
            serde_json::Value::Object(base_map)
        }
        (_, override_val) => override_val,
    }
}
