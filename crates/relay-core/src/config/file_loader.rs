//! File-based configuration loading

use super::router::RouterConfig;
use crate::error::{RelayError, RelayResult};
use std::fs;
use std::path::Path;

/// Load configuration from a file
///
/// Supports JSON, TOML, and YAML formats based on file extension; any
/// other extension is rejected before parsing.
/// The result is not validated; use `RouterConfig::load` for that.
pub fn load_from_file(path: &Path) -> RelayResult<RouterConfig> {
    let content = fs::read_to_string(path).map_err(|e| {
        RelayError::io_with_path(
            format!("Failed to read config file: {}", e),
            path.display().to_string(),
        )
    })?;

    let config: RouterConfig = match path.extension().and_then(|s| s.to_str()) {
        Some("toml") => toml::from_str(&content).map_err(|e| {
            RelayError::config_with_context(
                format!("Failed to parse TOML config: {}", e),
                format!("Deserializing TOML configuration from '{}'", path.display()),
            )
        })?,
        Some("yaml") | Some("yml") => serde_yaml::from_str(&content).map_err(|e| {
            RelayError::config_with_context(
                format!("Failed to parse YAML config: {}", e),
                format!("Deserializing YAML configuration from '{}'", path.display()),
            )
        })?,
        Some("json") => serde_json::from_str(&content).map_err(|e| {
            RelayError::config_with_context(
                format!("Failed to parse JSON config: {}", e),
                format!("Deserializing JSON configuration from '{}'", path.display()),
            )
        })?,
        other => {
            return Err(RelayError::config_with_context(
                format!(
                    "Unsupported config file extension '{}' (expected toml, yaml, yml or json)",
                    other.unwrap_or("")
                ),
                path.display().to_string(),
            ));
        }
    };

    Ok(config)
}
