use super::context::CheckContext;
use super::models::ComponentResult;
use async_trait::async_trait;
use std::sync::Arc;

/// Reports the current health of one subsystem.
///
/// Every registered checker is invoked from its own task on each check, and a
/// failing checker is invoked again while the same check is still running, so
/// implementations must tolerate concurrent and repeated calls. Checkers should
/// stay async around slow I/O: once `ctx` fires the dispatcher drops the pending
/// call, which cannot interrupt blocking work.
#[async_trait]
pub trait Checker: Send + Sync {
    async fn check(&self, ctx: &CheckContext) -> ComponentResult;
}

#[async_trait]
impl<T: Checker + ?Sized> Checker for Arc<T> {
    async fn check(&self, ctx: &CheckContext) -> ComponentResult {
        (**self).check(ctx).await
    }
}
