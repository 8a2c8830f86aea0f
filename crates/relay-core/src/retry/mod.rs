//! Retry policy for a single target
//!
//! Decides, given the kind of a failed attempt, how many attempts were made
//! and how long the target has been tried, whether to try the same target
//! again (and after which delay) or to give up on it. Giving up on a target
//! never ends the call; the fallback engine advances to the next target.

mod backoff;
mod config;
mod policy;


pub use backoff::ExponentialBackoff;
pub use config::RetryConfig;
pub use policy::{GiveUpReason, RetryDecision, RetryPolicy};
