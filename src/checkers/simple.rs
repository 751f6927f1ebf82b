use crate::health::{CheckContext, Checker, ComponentResult};
use async_trait::async_trait;

/// Always answers with the same result, e.g. a feature flag reported as `Off`.
#[derive(Debug, Clone)]
pub struct StaticChecker {
    result: ComponentResult,
}

impl StaticChecker {
    pub fn new(result: ComponentResult) -> Self {
        Self { result }
    }
}

#[async_trait]
impl Checker for StaticChecker {
    async fn check(&self, _ctx: &CheckContext) -> ComponentResult {
        self.result.clone()
    }
}

/// Wraps a synchronous closure. The closure runs on the runtime thread, so keep it cheap.
pub struct FnChecker<F> {
    check: F,
}

impl<F> FnChecker<F>
where
    F: Fn() -> ComponentResult + Send + Sync,
{
    pub fn new(check: F) -> Self {
        Self { check }
    }
}

#[async_trait]
impl<F> Checker for FnChecker<F>
where
    F: Fn() -> ComponentResult + Send + Sync,
{
    async fn check(&self, _ctx: &CheckContext) -> ComponentResult {
        (self.check)()
    }
}
