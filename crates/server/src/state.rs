use crate::config::ServerConfig;
use crate::error::ServerResult;
use matcher::Matcher;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use store::PatternRepository;

/// Shared application state
#[derive(Clone)]
pub struct ServerState {
    /// Server configuration
    pub config: Arc<ServerConfig>,

    /// Pattern library (shared across requests)
    pub repository: Arc<PatternRepository>,

    /// Matcher over the same repository
    pub matcher: Arc<Matcher>,

    /// Prometheus render handle, present when a recorder is installed
    pub metrics: Option<PrometheusHandle>,
}

impl ServerState {
    /// Create new server state with the backend named in `config`.
    pub fn new(config: ServerConfig) -> ServerResult<Self> {
        let repository = Arc::new(PatternRepository::new(&config.backend())?);
        Ok(Self::with_repository(config, repository))
    }

    /// Create state around an existing repository.
    pub fn with_repository(config: ServerConfig, repository: Arc<PatternRepository>) -> Self {
        let matcher = Arc::new(Matcher::new(repository.clone()));
        Self {
            config: Arc::new(config),
            repository,
            matcher,
            metrics: None,
        }
    }

    /// Use a custom matcher (weights, threshold) over the state's repository.
    pub fn with_matcher(mut self, matcher: Matcher) -> Self {
        self.matcher = Arc::new(matcher);
        self
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}

/// Server metadata for health checks
#[derive(Debug, serde::Serialize)]
pub struct ServerMetadata {
    pub version: String,
    pub uptime_seconds: u64,
}
