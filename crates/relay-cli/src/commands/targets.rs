//! Targets command

use crate::console::CliConsole;
use anyhow::Result;
use colored::*;
use std::path::Path;
use std::process::ExitCode;

pub fn list(config_path: &Path) -> Result<ExitCode> {
    let console = CliConsole::new(false);
    let config = super::load_config(config_path)?;

    console.print_header("Targets");
    for target in &config.targets {
        let mut limits = Vec::new();
        if let Some(rpm) = target.rpm {
            limits.push(format!("{} rpm", rpm));
        }
        if let Some(max) = target.max_concurrent {
            limits.push(format!("{} concurrent", max));
        }
        let key = if !target.provider.uses_api_key() {
            format!("aws {}", target.resolve_region()).cyan()
        } else if target.resolve_api_key().is_some() {
            "key".green()
        } else {
            "no key".yellow()
        };
        println!(
            "  {} {} {} {}",
            target.name.bold(),
            target.label().dimmed(),
            key,
            limits.join(", ")
        );
    }

    console.print_header("Fallbacks");
    if config.fallbacks.is_empty() {
        println!("  {}", "(none)".dimmed());
    }
    for (primary, fallbacks) in config.fallbacks.iter() {
        println!("  {} -> {}", primary.bold(), fallbacks.join(", "));
    }
    Ok(ExitCode::SUCCESS)
}
