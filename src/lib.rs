//! Relay
//!
//! Multi-provider model routing with retry, rate limiting and fallback
//! chains. This crate re-exports [`relay_core`]; the `relay` binary lives in
//! `crates/relay-cli`.
//!
//! ```no_run
//! use relay::{CallOptions, FallbackEngine, RouteRequest, RouterConfig};
//! use std::path::Path;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = RouterConfig::load(Path::new("relay.toml"))?;
//! let engine = FallbackEngine::builder(config).build()?;
//! let answer = engine
//!     .route("openai-gpt4o", RouteRequest::new("Hello"), CallOptions::default())
//!     .await?;
//! println!("{}: {}", answer.label, answer.text());
//! # Ok(())
//! # }
//! ```

pub use relay_core::*;
