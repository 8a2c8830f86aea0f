//! relay CLI application
//!
//! Routes a question across the fallback chain configured in a routing file.
//!
//! ```bash
//! relay ask "What is the capital of France?" --model openai-gpt4o
//! relay chain openai-gpt4o
//! relay targets
//! relay check
//! ```
//!
//! The configuration path comes from `--config`, then `RELAY_CONFIG`, then
//! `~/.config/relay/relay.toml`. Provider keys may live in a `.env` file.

mod args;
mod commands;
mod config_path;
mod console;
mod router;

use args::Cli;
use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_json);
    router::route(cli).await
}

/// Logs go to stderr so `--json` output stays machine-readable.
/// `RUST_LOG` is honoured unless `--verbose` asks for debug output.
fn init_tracing(verbose: bool, json: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}
