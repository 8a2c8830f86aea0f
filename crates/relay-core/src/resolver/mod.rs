//! Chain resolution
//!
//! Turns a requested primary target into the ordered list of targets the
//! fallback engine walks through.

use crate::config::RouterConfig;
use crate::error::{RelayError, RelayResult};
use std::collections::HashSet;
use tracing::debug;


/// Resolves fallback chains against a configuration
#[derive(Debug, Clone, Copy)]
pub struct ChainResolver<'a> {
    config: &'a RouterConfig,
}

impl<'a> ChainResolver<'a> {
    pub fn new(config: &'a RouterConfig) -> Self {
        Self { config }
    }

    /// Ordered targets to try for `primary`
    ///
    /// The primary comes first, followed by its fallbacks in listed order,
    /// each expanded depth-first with its own fallbacks. Names already seen
    /// are skipped, so cycles terminate and the result never holds more
    /// entries than there are distinct targets.
    pub fn resolve(&self, primary: &str) -> RelayResult<Vec<String>> {
        if self.config.target(primary).is_none() {
            return Err(RelayError::config_with_context(
                format!("Unknown target '{}'", primary),
                "primary",
            ));
        }

        let limit = self.config.distinct_target_count();
        let mut seen = HashSet::new();
        let mut chain = Vec::new();
        self.expand(primary, limit, &mut seen, &mut chain)?;

        debug!(primary = %primary, chain = ?chain, "Resolved fallback chain");
        Ok(chain)
    }

    /// Validate a caller-supplied chain without expanding it
    pub fn resolve_override<S: AsRef<str>>(&self, names: &[S]) -> RelayResult<Vec<String>> {
        let mut seen = HashSet::new();
        let mut chain = Vec::with_capacity(names.len());
        for name in names.iter().map(AsRef::as_ref) {
            if self.config.target(name).is_none() {
                return Err(RelayError::config_with_context(
                    format!("Unknown target '{}' in override chain", name),
                    "chain",
                ));
            }
            if seen.insert(name) {
                chain.push(name.to_string());
            }
        }

        if chain.is_empty() {
            return Err(RelayError::config_with_context(
                "Override chain is empty",
                "chain",
            ));
        }
        Ok(chain)
    }

    fn expand<'n>(
        &self,
        name: &'n str,
        limit: usize,
        seen: &mut HashSet<&'n str>,
        chain: &mut Vec<String>,
    ) -> RelayResult<()>
    where
        'a: 'n,
    {
        if chain.len() >= limit || !seen.insert(name) {
            return Ok(());
        }
        chain.push(name.to_string());

        for fallback in self.config.fallbacks.fallbacks_for(name) {
            if self.config.target(fallback).is_none() {
                return Err(RelayError::config_with_context(
                    format!("Fallback '{}' of '{}' is not a configured target", fallback, name),
                    format!("fallbacks.{}", name),
                ));
            }
            self.expand(fallback, limit, seen, chain)?;
        }
        Ok(())
    }
}
