//! Configuration file location

use anyhow::{Context, Result, anyhow};
use std::path::PathBuf;

/// Resolve the configuration path
///
/// `explicit` already carries `--config` or `RELAY_CONFIG` (clap reads the
/// variable). Without it the per-user default is used.
pub fn resolve(explicit: Option<&str>) -> Result<PathBuf> {
    match explicit.map(str::trim).filter(|p| !p.is_empty()) {
        Some(raw) => expand(raw),
        None => default_path()
            .ok_or_else(|| anyhow!("Cannot determine the home directory; pass --config")),
    }
}

/// `~/.config/relay/relay.toml`
pub fn default_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".config").join("relay").join("relay.toml"))
}

fn expand(raw: &str) -> Result<PathBuf> {
    let expanded = shellexpand::full(raw)
        .with_context(|| format!("Failed to expand config path '{}'", raw))?;
    Ok(PathBuf::from(expanded.as_ref()))
}
