//! Top-level routing configuration and its load-time validation

use super::chains::FallbackChains;
use super::file_loader::load_from_file;
use super::target::ModelTarget;
use crate::error::{RelayError, RelayResult};
use crate::retry::RetryConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Targets, fallback rules and retry settings for one router
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RouterConfig {
    /// Retry policy shared by every target
    #[serde(default)]
    pub retry: RetryConfig,
    /// Invocable targets
    #[serde(default)]
    pub targets: Vec<ModelTarget>,
    /// Fallback rules keyed by target name
    #[serde(default)]
    pub fallbacks: FallbackChains,
}

impl RouterConfig {
    pub fn new(targets: Vec<ModelTarget>, fallbacks: FallbackChains) -> Self {
        Self {
            retry: RetryConfig::default(),
            targets,
            fallbacks,
        }
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Load a configuration file and validate it
    pub fn load(path: &Path) -> RelayResult<Self> {
        let config = load_from_file(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Look up a target by logical name
    pub fn target(&self, name: &str) -> Option<&ModelTarget> {
        self.targets.iter().find(|t| t.name == name)
    }

    /// Look up the first target serving the given provider model identifier
    pub fn target_by_model_id(&self, model_id: &str) -> Option<&ModelTarget> {
        self.targets.iter().find(|t| t.model == model_id)
    }

    /// Number of distinct target names
    pub fn distinct_target_count(&self) -> usize {
        self.targets
            .iter()
            .map(|t| t.name.as_str())
            .collect::<HashSet<_>>()
            .len()
    }

    /// Reject configurations the router cannot execute safely
    pub fn validate(&self) -> RelayResult<()> {
        if self.targets.is_empty() {
            return Err(RelayError::config("No targets configured"));
        }

        let mut names = HashSet::new();
        for (index, target) in self.targets.iter().enumerate() {
            let field = format!("targets[{}]", index);
            validate_target(target, &field)?;
            if !names.insert(target.name.as_str()) {
                return Err(RelayError::config_with_context(
                    format!("Duplicate target name '{}'", target.name),
                    field,
                ));
            }
        }

        for (primary, fallbacks) in self.fallbacks.iter() {
            let field = format!("fallbacks.{}", primary);
            if !names.contains(primary.as_str()) {
                return Err(RelayError::config_with_context(
                    format!("Fallback rule for unknown target '{}'", primary),
                    field,
                ));
            }
            for fallback in fallbacks {
                if fallback == primary {
                    return Err(RelayError::config_with_context(
                        format!("Target '{}' lists itself as a fallback", primary),
                        field,
                    ));
                }
                if !names.contains(fallback.as_str()) {
                    return Err(RelayError::config_with_context(
                        format!("Fallback '{}' is not a configured target", fallback),
                        field,
                    ));
                }
            }
        }

        if let Some(cycle) = self.fallbacks.find_cycle() {
            return Err(RelayError::config_with_context(
                format!("Fallback cycle: {}", cycle.join(" -> ")),
                "fallbacks",
            ));
        }

        self.retry.validate()
    }
}

fn validate_target(target: &ModelTarget, field: &str) -> RelayResult<()> {
    let invalid = |message: String| Err(RelayError::config_with_context(message, field));

    if target.name.trim().is_empty() {
        return invalid("Target name cannot be empty".to_string());
    }
    if target.model.trim().is_empty() {
        return invalid(format!("Target '{}' has an empty model id", target.name));
    }
    if target.rpm == Some(0) {
        return invalid(format!("Target '{}' has rpm = 0", target.name));
    }
    if target.max_concurrent == Some(0) {
        return invalid(format!("Target '{}' has max_concurrent = 0", target.name));
    }
    if !target.params.temperature.is_finite() || target.params.temperature < 0.0 {
        return invalid(format!("Target '{}' has an invalid temperature", target.name));
    }
    if target.params.max_tokens == 0 {
        return invalid(format!("Target '{}' has max_tokens = 0", target.name));
    }
    if target.params.timeout.is_zero() {
        return invalid(format!("Target '{}' has a zero timeout", target.name));
    }
    if let Some(region) = &target.region {
        if region.trim().is_empty() {
            return invalid(format!("Target '{}' has an empty region", target.name));
        }
    }
    if target.provider.is_gateway() && target.base_url.is_none() {
        return invalid(format!(
            "Gateway target '{}' requires base_url",
            target.name
        ));
    }
    Ok(())
}
