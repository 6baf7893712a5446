//! Application state shared across web handlers.

use crate::api::SchoolApi;
use crate::monitor::MonitorOptions;
use crate::students::StudentCache;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[derive(Clone)]
pub struct AppState {
    pub api: Arc<SchoolApi>,
    pub monitor: MonitorOptions,
    shutdown: CancellationToken,
}

impl AppState {
    pub fn new(api: Arc<SchoolApi>, monitor: MonitorOptions) -> Self {
        Self {
            api,
            monitor,
            shutdown: CancellationToken::new(),
        }
    }

    /// A fresh student cache for one view (a monitoring load or a preview).
    ///
    /// Dropped with the view, so a failed lookup is only remembered for that
    /// view. Server shutdown cancels its pending lookups.
    pub fn student_cache(&self) -> StudentCache {
        StudentCache::with_token(self.api.clone(), self.shutdown.child_token())
    }

    /// Token cancelled when the server begins shutting down.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Cancel outstanding background work (pending student lookups).
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn state() -> AppState {
        let api = SchoolApi::new(
            "http://127.0.0.1:9/api/".parse().unwrap(),
            None,
            Duration::from_secs(1),
            10,
        )
        .unwrap();
        AppState::new(Arc::new(api), MonitorOptions::default())
    }

    #[test]
    fn test_student_caches_are_independent() {
        let state = state();
        let first = state.student_cache();
        let second = state.student_cache();
        assert!(first.is_empty() && second.is_empty());

        state.shutdown();
        assert!(first.is_cancelled());
        assert!(second.is_cancelled());
        assert!(state.student_cache().is_cancelled());
    }
}
