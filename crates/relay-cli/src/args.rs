//! CLI argument definitions using clap

use clap::{Args, Parser, Subcommand};
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "relay")]
#[command(about = "Route model requests across providers with automatic fallback")]
#[command(version)]
pub struct Cli {
    /// Path to the routing configuration file
    #[arg(long, short = 'c', global = true, env = "RELAY_CONFIG")]
    pub config: Option<String>,

    /// Enable debug logging
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Ask a question, falling back across targets until one answers
    Ask(AskArgs),

    /// Show the resolved fallback chain of a target
    Chain {
        /// Logical target name
        name: String,
    },

    /// List configured targets and fallback rules
    Targets,

    /// Load and validate the configuration
    Check,
}

#[derive(Args, Debug)]
pub struct AskArgs {
    /// The question to ask
    pub question: String,

    /// Primary target by logical name (defaults to the first configured target)
    #[arg(long, short, conflicts_with = "model_id")]
    pub model: Option<String>,

    /// Primary target by provider model identifier
    #[arg(long)]
    pub model_id: Option<String>,

    /// System instruction
    #[arg(long, short)]
    pub system: Option<String>,

    /// Sampling temperature, overriding the target's
    #[arg(long)]
    pub temperature: Option<f32>,

    /// Maximum tokens to generate, overriding the target's
    #[arg(long)]
    pub max_tokens: Option<u32>,

    /// Explicit chain of target names, replacing the configured fallbacks
    #[arg(long, value_delimiter = ',')]
    pub chain: Option<Vec<String>>,

    /// Only try the primary target
    #[arg(long)]
    pub no_fallback: bool,

    /// Give up on the whole call after this long (e.g. "30s", "2m")
    #[arg(long, value_parser = humantime_serde::re::humantime::parse_duration)]
    pub deadline: Option<Duration>,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,
}
