//! Ask command: route one question through the fallback engine

use crate::args::AskArgs;
use crate::console::CliConsole;
use anyhow::{Result, anyhow};
use colored::*;
use relay_core::{
    CallOptions, ChainFailure, FallbackEngine, RouteError, RouteRequest, RouteSuccess,
    RouterConfig,
};
use serde_json::json;
use std::path::Path;
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Where the call starts
#[derive(Debug, PartialEq, Eq)]
enum Primary {
    Name(String),
    ModelId(String),
}

pub async fn execute(args: AskArgs, config_path: &Path, verbose: bool) -> Result<ExitCode> {
    let console = CliConsole::new(verbose);
    let config = super::load_config(config_path)?;
    let primary = primary_for(&args, &config)?;
    let engine = FallbackEngine::builder(config).build()?;

    let token = CancellationToken::new();
    let interrupt = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            interrupt.cancel();
        }
    });

    let request = build_request(&args);
    let options = build_options(&args, token);
    console.info(&format!("Routing via {:?}", primary));

    let result = match &primary {
        Primary::Name(name) => engine.route(name, request, options).await,
        Primary::ModelId(model_id) => engine.route_model_id(model_id, request, options).await,
    };

    match result {
        Ok(success) => {
            if args.json {
                println!("{}", serde_json::to_string_pretty(&success)?);
            } else {
                print_success(&console, &success);
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(RouteError::Config(err)) => Err(err.into()),
        Err(err) => {
            if args.json {
                println!("{}", serde_json::to_string_pretty(&failure_json(&err))?);
            } else {
                print_failure(&console, &err);
            }
            Ok(ExitCode::FAILURE)
        }
    }
}

fn primary_for(args: &AskArgs, config: &RouterConfig) -> Result<Primary> {
    if let Some(model_id) = &args.model_id {
        return Ok(Primary::ModelId(model_id.clone()));
    }
    if let Some(model) = &args.model {
        return Ok(Primary::Name(model.clone()));
    }
    if let Some(first) = args.chain.as_ref().and_then(|chain| chain.first()) {
        return Ok(Primary::Name(first.clone()));
    }
    config
        .targets
        .first()
        .map(|target| Primary::Name(target.name.clone()))
        .ok_or_else(|| anyhow!("No targets configured"))
}

fn build_request(args: &AskArgs) -> RouteRequest {
    let mut request = RouteRequest::new(args.question.clone());
    if let Some(system) = &args.system {
        request = request.with_system(system.clone());
    }
    if let Some(temperature) = args.temperature {
        request = request.with_temperature(temperature);
    }
    if let Some(max_tokens) = args.max_tokens {
        request = request.with_max_tokens(max_tokens);
    }
    request
}

fn build_options(args: &AskArgs, token: CancellationToken) -> CallOptions {
    let mut options = CallOptions::default().with_cancel(token);
    if let Some(chain) = &args.chain {
        options = options.with_chain(chain.iter().cloned());
    }
    if args.no_fallback {
        options = options.without_fallback();
    }
    if let Some(deadline) = args.deadline {
        debug!(deadline_ms = deadline.as_millis() as u64, "Call deadline set");
        options = options.with_timeout(deadline);
    }
    options
}

fn print_success(console: &CliConsole, success: &RouteSuccess) {
    let fallbacks = success
        .attempts
        .iter()
        .filter(|attempt| attempt.target != success.target)
        .count();
    console.info(&format!(
        "{} attempt(s), {} before the serving target",
        success.attempts.len(),
        fallbacks
    ));
    println!("{} {}", "▶".cyan().bold(), success.label.cyan());
    println!("{}", success.text());
    if let Some(usage) = &success.response.usage {
        console.info(&format!(
            "tokens: {} in / {} out",
            usage.input_tokens, usage.output_tokens
        ));
    }
}

fn print_failure(console: &CliConsole, err: &RouteError) {
    console.error(&err.to_string());
    if let RouteError::ChainExhausted(failure) = err {
        print_report(failure);
    }
}

fn print_report(failure: &ChainFailure) {
    for report in &failure.targets {
        println!(
            "  {} {} ({}): {} after {} attempt(s), {}",
            "•".red(),
            report.target.bold(),
            report.label.dimmed(),
            report.last_error,
            report.attempts,
            report.give_up
        );
        println!("    {}", report.message.dimmed());
    }
    for skipped in &failure.skipped {
        println!(
            "  {} {} skipped: {}",
            "•".yellow(),
            skipped.target.bold(),
            skipped.reason
        );
    }
}

fn failure_json(err: &RouteError) -> serde_json::Value {
    match err {
        RouteError::ChainExhausted(failure) => json!({
            "error": failure.final_kind.code(),
            "message": err.to_string(),
            "failure": failure,
        }),
        other => json!({
            "error": other.kind().code(),
            "message": other.to_string(),
            "attempts": other.attempts(),
        }),
    }
}
