use super::aggregate;
use super::checker::Checker;
use super::context::CheckContext;
use super::dispatch;
use super::models::{OverallReport, Presence};
use super::probe::RetryPolicy;
use super::registry::{Registry, RegistryError};
use std::sync::Arc;
use tokio::time::Instant;

/// Registry of component checkers plus the protocol that polls them.
///
/// Build one per process and share it behind an `Arc` with whatever serves the
/// verdict; components may be (un)registered while checks are running.
#[derive(Default)]
pub struct HealthChecker {
    registry: Registry,
    retry_policy: RetryPolicy,
}

impl HealthChecker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_retry_policy(retry_policy: RetryPolicy) -> Self {
        Self {
            registry: Registry::new(),
            retry_policy,
        }
    }

    /// Registers a required component.
    pub fn register<C>(&self, name: &str, checker: C) -> Result<(), RegistryError>
    where
        C: Checker + 'static,
    {
        self.register_with(name, checker, Presence::Required)
    }

    pub fn register_with<C>(
        &self,
        name: &str,
        checker: C,
        presence: Presence,
    ) -> Result<(), RegistryError>
    where
        C: Checker + 'static,
    {
        self.registry.register(name, Arc::new(checker), presence)?;
        tracing::info!(component = name, presence = ?presence, "Registered health component");
        Ok(())
    }

    pub fn unregister(&self, name: &str) {
        if self.registry.unregister(name) {
            tracing::info!(component = name, "Unregistered health component");
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry_policy
    }

    /// Polls every registered component and reduces the results. Never fails:
    /// components that do not finish before `ctx` is done are reported as `Timeout`.
    pub async fn check(&self, ctx: &CheckContext) -> OverallReport {
        self.check_with_policy(ctx, &self.retry_policy).await
    }

    #[tracing::instrument(name = "Check health", skip_all)]
    pub async fn check_with_policy(&self, ctx: &CheckContext, policy: &RetryPolicy) -> OverallReport {
        let started = Instant::now();
        let components = self.registry.snapshot();

        // probes still running when this future is dropped get cancelled
        let scope = ctx.child();
        let _guard = scope.token().clone().drop_guard();

        let outcomes = dispatch::dispatch(components, &scope, started, policy);
        let report = aggregate::collect(outcomes, started).await;

        tracing::info!(
            status = %report.status,
            components = report.components.len(),
            duration_ms = report.duration.as_millis() as u64,
            "Health check finished"
        );
        report
    }
}
