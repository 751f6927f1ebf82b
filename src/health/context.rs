use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Why a [`CheckContext`] stopped accepting work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ContextError {
    #[error("context deadline exceeded")]
    DeadlineExceeded,
    #[error("context canceled")]
    Cancelled,
}

/// Deadline and cancellation signal shared by every probe of one check.
///
/// Cloning is cheap; all clones observe the same token and deadline.
#[derive(Debug, Clone, Default)]
pub struct CheckContext {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl CheckContext {
    /// A context that never expires on its own and is only done once cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_deadline(Instant::now() + timeout)
    }

    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            token: CancellationToken::new(),
            deadline: Some(deadline),
        }
    }

    /// Binds the context to an externally owned token, e.g. one tied to server shutdown.
    pub fn with_token(mut self, token: CancellationToken) -> Self {
        self.token = token;
        self
    }

    /// A context with the same deadline whose token is cancelled when the parent's is,
    /// but can also be cancelled on its own.
    pub fn child(&self) -> Self {
        Self {
            token: self.token.child_token(),
            deadline: self.deadline,
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// `None` while the context is live.
    pub fn err(&self) -> Option<ContextError> {
        if self.token.is_cancelled() {
            return Some(ContextError::Cancelled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Some(ContextError::DeadlineExceeded),
            _ => None,
        }
    }

    pub fn is_done(&self) -> bool {
        self.err().is_some()
    }

    /// Resolves once the deadline passes or the token is cancelled, and reports which.
    pub async fn done(&self) -> ContextError {
        match self.deadline {
            Some(deadline) => {
                tokio::select! {
                    _ = self.token.cancelled() => ContextError::Cancelled,
                    _ = tokio::time::sleep_until(deadline) => ContextError::DeadlineExceeded,
                }
            }
            None => {
                self.token.cancelled().await;
                ContextError::Cancelled
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_deadline_fires() {
        let ctx = CheckContext::with_timeout(Duration::from_millis(20));
        assert_eq!(ctx.err(), None);

        let err = ctx.done().await;
        assert_eq!(err, ContextError::DeadlineExceeded);
        assert!(ctx.is_done());
        assert_eq!(ctx.err().unwrap().to_string(), "context deadline exceeded");
    }

    #[tokio::test]
    async fn test_cancel_wins_over_deadline() {
        let ctx = CheckContext::with_timeout(Duration::from_secs(60));
        let clone = ctx.clone();
        clone.cancel();

        assert_eq!(ctx.done().await, ContextError::Cancelled);
        assert_eq!(ctx.err().unwrap().to_string(), "context canceled");
    }

    #[tokio::test]
    async fn test_child_follows_parent() {
        let parent = CheckContext::new();
        let child = parent.child();

        child.cancel();
        assert!(child.is_done());
        assert!(!parent.is_done());

        let child = parent.child();
        parent.cancel();
        assert_eq!(child.err(), Some(ContextError::Cancelled));
    }

    #[tokio::test]
    async fn test_external_token() {
        let shutdown = CancellationToken::new();
        let ctx = CheckContext::with_timeout(Duration::from_secs(60)).with_token(shutdown.clone());

        shutdown.cancel();
        assert_eq!(ctx.err(), Some(ContextError::Cancelled));
    }
}
