//! The fallback engine: walks a resolved chain until a target answers

use super::builder::FallbackEngineBuilder;
use super::cancel::CallCancel;
use super::types::{
    Attempt, AttemptOutcome, CallOptions, CancelReason, ChainFailure, RouteError, RouteRequest,
    RouteSuccess, RouterResult, SkippedTarget, TargetReport,
};
use crate::config::{ModelTarget, RouterConfig};
use crate::error::{ErrorKind, RelayError, RelayResult};
use crate::invoker::{InvokeError, InvokeResponse, InvokerRegistry, ProviderInvoker, invoke_with_timeout};
use crate::rate_limiter::{Admission, RateGuard, RejectReason};
use crate::resolver::ChainResolver;
use crate::retry::{GiveUpReason, RetryDecision, RetryPolicy};
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{Instant, sleep};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// How the engine finished with one target
enum TargetOutcome {
    Succeeded(InvokeResponse),
    Skipped {
        reason: RejectReason,
        retry_after: Option<Duration>,
    },
    Exhausted(TargetReport),
    Cancelled(CancelReason),
}

/// Routes requests across a chain of targets
///
/// The engine owns no per-call state; one instance serves any number of
/// concurrent calls. The rate guard is the only state shared between them.
#[derive(Debug)]
pub struct FallbackEngine {
    pub(super) config: Arc<RouterConfig>,
    pub(super) invokers: InvokerRegistry,
    pub(super) guard: Arc<RateGuard>,
    pub(super) policy: RetryPolicy,
}

impl FallbackEngine {
    pub fn builder(config: impl Into<Arc<RouterConfig>>) -> FallbackEngineBuilder {
        FallbackEngineBuilder::new(config)
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    pub fn guard(&self) -> &Arc<RateGuard> {
        &self.guard
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Chain a call for `primary` with `options` would walk
    pub fn resolve_chain(&self, primary: &str, options: &CallOptions) -> RelayResult<Vec<String>> {
        let resolver = ChainResolver::new(&self.config);
        let mut chain = match &options.chain {
            Some(names) => resolver.resolve_override(names)?,
            None => resolver.resolve(primary)?,
        };
        if !options.allow_fallback {
            chain.truncate(1);
        }
        Ok(chain)
    }

    /// Route a request starting at the target named by the provider model id
    pub async fn route_model_id(
        &self,
        model_id: &str,
        request: RouteRequest,
        options: CallOptions,
    ) -> RouterResult {
        let primary = self
            .config
            .target_by_model_id(model_id)
            .map(|target| target.name.clone())
            .ok_or_else(|| {
                RelayError::config_with_context(
                    format!("No target serves model '{}'", model_id),
                    "model_id",
                )
            })?;
        self.route(&primary, request, options).await
    }

    /// Route a request starting at `primary`
    ///
    /// Targets are tried strictly in chain order. The first success wins;
    /// otherwise every invocation is reported back in the failure.
    #[instrument(
        skip_all,
        fields(call_id = %Uuid::new_v4(), primary = %primary)
    )]
    pub async fn route(
        &self,
        primary: &str,
        request: RouteRequest,
        options: CallOptions,
    ) -> RouterResult {
        request.validate()?;
        let chain = self.resolve_chain(primary, &options)?;
        let targets = self.prepare(&chain)?;
        debug!(chain = ?chain, "Attempting chain");

        let cancel = CallCancel::from_options(&options);
        let mut attempts = Vec::new();
        let mut reports = Vec::new();
        let mut skipped = Vec::new();

        for (target, invoker) in targets {
            let outcome = self
                .run_target(target, invoker.as_ref(), &request, &cancel, &mut attempts)
                .await;

            match outcome {
                TargetOutcome::Succeeded(response) => {
                    info!(
                        target_name = %target.name,
                        label = %target.label(),
                        attempts = attempts.len(),
                        "Request served"
                    );
                    return Ok(RouteSuccess {
                        target: target.name.clone(),
                        label: target.label(),
                        response,
                        attempts,
                        skipped,
                    });
                }
                TargetOutcome::Skipped {
                    reason,
                    retry_after,
                } => {
                    warn!(target_name = %target.name, %reason, "Target not admitted, skipping");
                    skipped.push(SkippedTarget {
                        target: target.name.clone(),
                        reason,
                        retry_after,
                    });
                }
                TargetOutcome::Exhausted(report) => {
                    warn!(
                        target_name = %report.target,
                        error_kind = %report.last_error,
                        attempts = report.attempts,
                        give_up = %report.give_up,
                        "Target exhausted, advancing"
                    );
                    reports.push(report);
                }
                TargetOutcome::Cancelled(reason) => {
                    warn!(%reason, attempts = attempts.len(), "Call cancelled");
                    return Err(RouteError::Cancelled { reason, attempts });
                }
            }
        }

        let final_kind = reports
            .last()
            .map_or(ErrorKind::RateLimited, |report| report.last_error);
        warn!(error_kind = %final_kind, attempts = attempts.len(), "Chain exhausted");
        Err(RouteError::ChainExhausted(ChainFailure {
            targets: reports,
            skipped,
            attempts,
            final_kind,
        }))
    }

    /// Look up every target of the chain with its invoker
    fn prepare(
        &self,
        chain: &[String],
    ) -> RelayResult<Vec<(&ModelTarget, Arc<dyn ProviderInvoker>)>> {
        chain
            .iter()
            .map(|name| {
                let target = self.config.target(name).ok_or_else(|| {
                    RelayError::config(format!("Unknown target '{}'", name))
                })?;
                let invoker = self.invokers.resolve(target).ok_or_else(|| {
                    RelayError::config_with_context(
                        format!("No invoker registered for provider '{}'", target.provider),
                        format!("targets.{}", target.name),
                    )
                })?;
                Ok((target, invoker))
            })
            .collect()
    }

    async fn run_target(
        &self,
        target: &ModelTarget,
        invoker: &dyn ProviderInvoker,
        request: &RouteRequest,
        cancel: &CallCancel,
        attempts: &mut Vec<Attempt>,
    ) -> TargetOutcome {
        let invoke_request = request.for_target(target);
        let started = Instant::now();
        let mut number = 0u32;
        let mut last_error: Option<InvokeError> = None;

        loop {
            if let Some(reason) = cancel.check() {
                return TargetOutcome::Cancelled(reason);
            }

            let permit = match self.guard.admit(target) {
                Admission::Allowed(permit) => permit,
                Admission::Rejected {
                    reason,
                    retry_after,
                } => {
                    return match last_error {
                        None => TargetOutcome::Skipped {
                            reason,
                            retry_after,
                        },
                        Some(error) => TargetOutcome::Exhausted(report(
                            target,
                            number,
                            error,
                            GiveUpReason::AdmissionRejected,
                        )),
                    };
                }
            };

            number += 1;
            debug!(target_name = %target.name, attempt = number, "Invoking");
            let started_at = Utc::now();
            let attempt_start = Instant::now();

            let result = tokio::select! {
                biased;
                reason = cancel.cancelled() => {
                    drop(permit);
                    attempts.push(Attempt {
                        target: target.name.clone(),
                        number,
                        outcome: AttemptOutcome::Abandoned,
                        latency: attempt_start.elapsed(),
                        started_at,
                        backoff: None,
                    });
                    return TargetOutcome::Cancelled(reason);
                }
                result = invoke_with_timeout(invoker, target, &invoke_request) => result,
            };
            drop(permit);
            let latency = attempt_start.elapsed();

            let error = match result {
                Ok(response) => {
                    attempts.push(Attempt {
                        target: target.name.clone(),
                        number,
                        outcome: AttemptOutcome::Succeeded,
                        latency,
                        started_at,
                        backoff: None,
                    });
                    return TargetOutcome::Succeeded(response);
                }
                Err(error) => error,
            };

            let decision = self.policy.decide(&error, number, started.elapsed());
            let backoff = match decision {
                RetryDecision::Retry { delay } => Some(delay),
                RetryDecision::GiveUp(_) => None,
            };
            warn!(
                target_name = %target.name,
                attempt = number,
                error_kind = %error.kind,
                error = %error.message,
                backoff_ms = backoff.map(|d| d.as_millis() as u64),
                "Attempt failed"
            );
            attempts.push(Attempt {
                target: target.name.clone(),
                number,
                outcome: AttemptOutcome::Failed {
                    kind: error.kind,
                    message: error.message.clone(),
                },
                latency,
                started_at,
                backoff,
            });

            match decision {
                RetryDecision::GiveUp(give_up) => {
                    return TargetOutcome::Exhausted(report(target, number, error, give_up));
                }
                RetryDecision::Retry { delay } => {
                    last_error = Some(error);
                    tokio::select! {
                        biased;
                        reason = cancel.cancelled() => return TargetOutcome::Cancelled(reason),
                        _ = sleep(delay) => {}
                    }
                }
            }
        }
    }
}

fn report(
    target: &ModelTarget,
    attempts: u32,
    error: InvokeError,
    give_up: GiveUpReason,
) -> TargetReport {
    TargetReport {
        target: target.name.clone(),
        label: target.label(),
        attempts,
        last_error: error.kind,
        message: error.message,
        give_up,
    }
}
