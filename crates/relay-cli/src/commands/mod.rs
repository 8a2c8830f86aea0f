//! CLI commands

pub mod ask;
pub mod chain;
pub mod check;
pub mod targets;

use anyhow::{Context, Result};
use relay_core::RouterConfig;
use std::path::Path;

/// Load and validate the routing configuration
pub fn load_config(path: &Path) -> Result<RouterConfig> {
    RouterConfig::load(path)
        .with_context(|| format!("Failed to load configuration from {}", path.display()))
}
