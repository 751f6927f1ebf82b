use super::checker::Checker;
use super::context::CheckContext;
use super::models::{ComponentReport, ComponentStatus};
use std::time::Duration;
use tokio::time::Instant;

/// How a probe re-invokes a checker that reported `Fail`.
///
/// Only `Fail` is retried. `max_attempts` counts every invocation including the
/// first one; after the last failed attempt the `Fail` result itself is reported.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
    pub multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            initial_backoff: Duration::from_millis(10),
            max_backoff: Duration::from_millis(200),
            multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    /// Report the first result as is.
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Fixed delay between attempts.
    pub fn fixed(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            initial_backoff: delay,
            max_backoff: delay,
            multiplier: 1.0,
        }
    }

    pub fn next_backoff(&self, current: Duration) -> Duration {
        let multiplier = if self.multiplier.is_finite() {
            self.multiplier.max(1.0)
        } else {
            1.0
        };
        Duration::try_from_secs_f64(current.as_secs_f64() * multiplier)
            .unwrap_or(self.max_backoff)
            .min(self.max_backoff)
    }
}

/// Runs `checker` until it reports something other than `Fail`, the attempts run
/// out, or `ctx` is done. In the last case the report is `Timeout` carrying the
/// context error, never the stale `Fail`.
///
/// `started` is the beginning of the whole check so durations compare across components.
pub(crate) async fn run_probe(
    name: &str,
    checker: &dyn Checker,
    ctx: &CheckContext,
    started: Instant,
    policy: &RetryPolicy,
) -> ComponentReport {
    let max_attempts = policy.max_attempts.max(1);
    let mut backoff = policy.initial_backoff.min(policy.max_backoff);
    let mut attempt = 1;

    loop {
        let result = checker.check(ctx).await;
        if result.status != ComponentStatus::Fail {
            return ComponentReport::from_result(name, result, started.elapsed());
        }

        if let Some(err) = ctx.err() {
            tracing::warn!(component = name, attempt, "Component still failing at deadline: {}", err);
            return ComponentReport::timeout(name, err.to_string(), started.elapsed());
        }

        if attempt >= max_attempts {
            tracing::warn!(
                component = name,
                attempts = attempt,
                description = %result.description,
                "Component failed on every attempt"
            );
            return ComponentReport::from_result(name, result, started.elapsed());
        }

        tracing::debug!(
            component = name,
            attempt,
            backoff_ms = backoff.as_millis() as u64,
            description = %result.description,
            "Component failed, retrying"
        );

        if backoff.is_zero() {
            tokio::task::yield_now().await;
        } else {
            tokio::select! {
                err = ctx.done() => {
                    tracing::warn!(component = name, attempt, "Deadline hit during retry backoff: {}", err);
                    return ComponentReport::timeout(name, err.to_string(), started.elapsed());
                }
                _ = tokio::time::sleep(backoff) => {}
            }
            backoff = policy.next_backoff(backoff);
        }
        attempt += 1;
    }
}
