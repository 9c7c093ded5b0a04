//! Bridges matcher observations onto the `metrics` facade.

use matcher::{MatchMetrics, MatchObservation};

/// Forwards every match to the process-wide `metrics` recorder.
pub struct PrometheusMatchMetrics;

impl MatchMetrics for PrometheusMatchMetrics {
    fn record_match(&self, observation: &MatchObservation) {
        metrics::counter!("uipm_match_requests_total").increment(1);
        metrics::histogram!("uipm_match_latency_seconds")
            .record(observation.latency.as_secs_f64());
        metrics::histogram!("uipm_match_patterns_considered").record(observation.considered as f64);
        metrics::histogram!("uipm_match_candidates_returned").record(observation.returned as f64);
        if observation.has_exact_match {
            metrics::counter!("uipm_match_exact_total").increment(1);
        }
    }
}
