//! Fallback execution engine
//!
//! Orchestrates chain resolution, admission, invocation and retry across the
//! targets of one call and returns the first success or an aggregated
//! failure that lists every invocation made.

mod builder;
mod cancel;
mod engine;
mod types;

#[cfg(test)]
mod tests;

pub use builder::FallbackEngineBuilder;
pub use engine::FallbackEngine;
pub use types::{
    Attempt, AttemptOutcome, CallOptions, CancelReason, ChainFailure, RouteError, RouteRequest,
    RouteSuccess, RouterResult, SkippedTarget, TargetReport,
};
