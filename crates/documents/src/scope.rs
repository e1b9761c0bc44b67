//! View-lifetime cancellation.
//!
//! A [`ViewScope`] is created with a view and closed when it goes away. Work
//! run through it resolves to `None` once the scope is closed, so late results
//! are dropped before anyone can write them.

use std::future::Future;

use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Default)]
pub struct ViewScope {
    token: CancellationToken,
}

impl ViewScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Child scope, closed with its parent or on its own.
    pub fn child(&self) -> Self {
        Self {
            token: self.token.child_token(),
        }
    }

    /// Run `fut` until it completes or the scope closes, whichever is first.
    pub async fn run<F: Future>(&self, fut: F) -> Option<F::Output> {
        if self.token.is_cancelled() {
            return None;
        }
        tokio::select! {
            biased;
            _ = self.token.cancelled() => None,
            out = fut => {
                // Closed while the result was in flight: discard it.
                if self.token.is_cancelled() { None } else { Some(out) }
            }
        }
    }

    pub fn close(&self) {
        self.token.cancel();
    }

    pub fn is_closed(&self) -> bool {
        self.token.is_cancelled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn open_scope_passes_results_through() {
        let scope = ViewScope::new();
        assert_eq!(scope.run(async { 7 }).await, Some(7));
    }

    #[tokio::test]
    async fn closed_scope_discards_results() {
        let scope = ViewScope::new();
        scope.close();
        assert_eq!(scope.run(async { 7 }).await, None);
        assert!(scope.is_closed());
    }

    #[tokio::test]
    async fn closing_mid_flight_cancels_pending_work() {
        let scope = ViewScope::new();
        let closer = scope.clone();

        let pending = scope.run(async {
            closer.close();
            tokio::task::yield_now().await;
            7
        });

        assert_eq!(pending.await, None);
    }

    #[test]
    fn child_closes_with_parent() {
        let parent = ViewScope::new();
        let child = parent.child();
        parent.close();
        assert!(child.is_closed());

        let parent = ViewScope::new();
        let child = parent.child();
        child.close();
        assert!(!parent.is_closed());
    }
}
