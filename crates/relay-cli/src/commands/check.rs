//! Check command: load and validate the configuration

use crate::console::CliConsole;
use anyhow::Result;
use relay_core::ChainResolver;
use std::path::Path;
use std::process::ExitCode;

pub fn run(config_path: &Path) -> Result<ExitCode> {
    let console = CliConsole::new(true);
    let config = match super::load_config(config_path) {
        Ok(config) => config,
        Err(err) => {
            console.error(&format!("{:#}", err));
            return Ok(ExitCode::FAILURE);
        }
    };

    let resolver = ChainResolver::new(&config);
    for target in &config.targets {
        let chain = resolver.resolve(&target.name)?;
        console.info(&format!("{}: {}", target.name, chain.join(" -> ")));
        if target.provider.uses_api_key() && target.resolve_api_key().is_none() {
            console.warn(&format!(
                "Target '{}' has no API key in its config or environment",
                target.name
            ));
        }
    }

    console.success(&format!(
        "{} is valid: {} target(s), {} fallback rule(s)",
        config_path.display(),
        config.targets.len(),
        config.fallbacks.len()
    ));
    Ok(ExitCode::SUCCESS)
}
