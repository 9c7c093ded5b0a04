// Metrics hooks for the `matcher` crate.
//
// Callers install a global `MatchMetrics` implementation via [`set_match_metrics`];
// every call to `Matcher::find_similar_patterns` then reports its latency and
// candidate counts. No metrics backend is linked here.
use std::sync::{Arc, RwLock};
use std::time::Duration;

use once_cell::sync::OnceCell;

/// Outcome of one similarity query, as seen by a metrics observer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchObservation {
    /// Wall-clock time spent loading and scoring.
    pub latency: Duration,
    /// Patterns scored.
    pub considered: usize,
    /// Candidates returned after filtering and truncation.
    pub returned: usize,
    pub has_exact_match: bool,
}

/// Metrics observer for match operations.
pub trait MatchMetrics: Send + Sync {
    fn record_match(&self, observation: &MatchObservation);
}

fn metrics_lock() -> &'static RwLock<Option<Arc<dyn MatchMetrics>>> {
    static METRICS: OnceCell<RwLock<Option<Arc<dyn MatchMetrics>>>> = OnceCell::new();
    METRICS.get_or_init(|| RwLock::new(None))
}

pub(crate) fn metrics_recorder() -> Option<Arc<dyn MatchMetrics>> {
    let guard = metrics_lock()
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    guard.clone()
}

/// Install or clear the global match metrics recorder.
///
/// Usually called once at startup; every `Matcher` in the process shares it.
pub fn set_match_metrics(recorder: Option<Arc<dyn MatchMetrics>>) {
    let mut guard = metrics_lock()
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    *guard = recorder;
}
