//! Server initialization and routing
//!
//! This module handles the Axum server setup including:
//! - Router configuration for the pattern API
//! - Middleware stack (request ids, logging, compression, etc.)
//! - Metrics recorder installation
//! - Graceful shutdown handling

use crate::config::ServerConfig;
use crate::match_metrics::PrometheusMatchMetrics;
use crate::middleware::{log_requests, request_id};
use crate::routes::{api_info, not_found};
use crate::routes::{health, matching, patterns};
use crate::state::ServerState;
use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::middleware::from_fn;
use axum::routing::{get, post};
use axum::Router;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

/// Build the Axum router with all routes and middleware
///
/// Static segments (`/patterns/match`, `/patterns/reset`,
/// `/patterns/history`) take precedence over `/patterns/{id}`.
///
/// Middleware, outermost first:
/// 1. HTTP tracing
/// 2. Request ID tracking
/// 3. Request logging and request metrics
/// 4. CORS
/// 5. Compression
/// 6. Timeout handling
/// 7. Body size limit
pub fn build_router(state: Arc<ServerState>) -> Router {
    let cors = if state.config.enable_cors {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        CorsLayer::new()
    };

    let service_routes = Router::new()
        .route("/", get(api_info))
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        .route("/metrics", get(health::metrics))
        .route("/metadata", get(health::server_metadata));

    let pattern_routes = Router::new()
        .route(
            "/patterns",
            get(patterns::list_patterns).post(patterns::upsert_pattern),
        )
        .route("/patterns/match", post(matching::match_patterns))
        .route("/patterns/reset", post(patterns::reset_patterns))
        .route("/patterns/history", get(patterns::pattern_history))
        .route(
            "/patterns/{id}",
            get(patterns::get_pattern)
                .patch(patterns::rename_pattern)
                .delete(patterns::delete_pattern),
        )
        .route("/patterns/{id}/use", post(patterns::record_usage));

    Router::new()
        .merge(service_routes)
        .merge(pattern_routes)
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(state.config.max_body_size()))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            state.config.timeout(),
        ))
        .layer(CompressionLayer::new())
        .layer(cors)
        .layer(from_fn(log_requests))
        .layer(from_fn(request_id))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the UIPM HTTP server
///
/// Initializes logging and metrics, opens the pattern library named by
/// `config` and serves until SIGTERM or Ctrl+C.
///
/// # Example
///
/// ```rust,no_run
/// use server::ServerConfig;
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let config = ServerConfig::load()?;
///     server::start_server(config).await?;
///     Ok(())
/// }
/// ```
pub async fn start_server(config: ServerConfig) -> anyhow::Result<()> {
    // A global subscriber may already exist when embedded.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(&config.log_level))
        .with_target(false)
        .with_thread_ids(true)
        .with_thread_names(true)
        .json()
        .try_init();

    let mut state = ServerState::new(config.clone())?;

    if config.metrics_enabled {
        let handle = PrometheusBuilder::new().install_recorder()?;
        matcher::set_match_metrics(Some(Arc::new(PrometheusMatchMetrics)));
        state = state.with_metrics(handle);
    }

    let stats = state.repository.stats()?;
    let app = build_router(Arc::new(state));
    let addr: SocketAddr = config.socket_addr()?;

    tracing::info!(
        addr = %addr,
        patterns = stats.pattern_count,
        store = ?config.store_path,
        "Starting UIPM server"
    );
    tracing::info!(
        "Timeout: {}s, Max body: {}MB",
        config.timeout_secs,
        config.max_body_size_mb
    );
    tracing::info!(
        "CORS: {}, Metrics: {}",
        config.enable_cors,
        config.metrics_enabled
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Shutdown signal handler
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!(error = %err, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down..."),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down..."),
    }
}
