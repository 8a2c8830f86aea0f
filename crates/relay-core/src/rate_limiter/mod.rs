//! Per-target admission control
//!
//! Each target may carry a requests-per-minute limit (sliding window) and a
//! cap on in-flight invocations. The guard is the only mutable state shared
//! between concurrent calls; every check-and-record is atomic per target.

mod guard;
mod types;
mod window;

#[cfg(test)]
mod tests;

pub use guard::RateGuard;
pub use types::{Admission, AdmissionPermit, RejectReason};
pub use window::SlidingWindow;
