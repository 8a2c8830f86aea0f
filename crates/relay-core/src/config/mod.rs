//! Routing configuration
//!
//! Strongly typed, immutable configuration for targets and fallback rules.
//! A `RouterConfig` is loaded and validated once, then shared read-only
//! (typically behind an `Arc`) by every routed call.

pub mod defaults;
mod chains;
mod file_loader;
mod router;
mod target;


pub use chains::FallbackChains;
pub use file_loader::load_from_file;
pub use router::RouterConfig;
pub use target::{InvocationParams, ModelTarget, ProviderKind};
