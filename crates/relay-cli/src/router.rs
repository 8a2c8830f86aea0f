//! Command routing

use crate::args::{Cli, Commands};
use crate::{commands, config_path};
use anyhow::Result;
use std::process::ExitCode;
use tracing::debug;

/// Dispatch a parsed command line
pub async fn route(cli: Cli) -> Result<ExitCode> {
    let path = config_path::resolve(cli.config.as_deref())?;
    debug!(config = %path.display(), "Using configuration file");

    match cli.command {
        Commands::Ask(args) => commands::ask::execute(args, &path, cli.verbose).await,
        Commands::Chain { name } => commands::chain::show(&name, &path),
        Commands::Targets => commands::targets::list(&path),
        Commands::Check => commands::check::run(&path),
    }
}
