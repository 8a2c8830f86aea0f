//! Error types for relay
//!
//! Two layers of errors live here:
//! - `ErrorKind`: the provider-agnostic failure taxonomy the retry policy and
//!   fallback engine reason about
//! - `RelayError`: the crate-wide error for configuration, IO and setup failures

mod constructors;
mod kind;
mod types;

pub use kind::ErrorKind;
pub use types::{RelayError, RelayResult};
