use crate::error::{ServerError, ServerResult};
use crate::routes::blocking;
use crate::state::{ServerMetadata, ServerState};
use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;
use std::sync::Arc;
use std::time::SystemTime;

/// Global server start time for uptime calculation
static SERVER_START_TIME: once_cell::sync::Lazy<SystemTime> =
    once_cell::sync::Lazy::new(SystemTime::now);

fn uptime_seconds() -> u64 {
    SERVER_START_TIME
        .elapsed()
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Health check endpoint (liveness)
/// Returns 200 if server is running
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "service": "uipm-server",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "uptime_seconds": uptime_seconds(),
    }))
}

/// Readiness check endpoint
///
/// Loads the pattern library, so an unreadable store fails the probe.
pub async fn readiness_check(
    State(state): State<Arc<ServerState>>,
) -> ServerResult<impl IntoResponse> {
    let repository = state.repository.clone();
    let stats = blocking(move || Ok(repository.stats()?)).await?;

    Ok(Json(json!({
        "status": "ready",
        "service": "uipm-server",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "uptime_seconds": uptime_seconds(),
        "components": {
            "api": "ready",
            "store": "ready",
        },
        "store": stats,
    })))
}

/// Prometheus metrics endpoint
pub async fn metrics(State(state): State<Arc<ServerState>>) -> ServerResult<impl IntoResponse> {
    if !state.config.metrics_enabled {
        return Err(ServerError::NotFound("Metrics endpoint".to_string()));
    }

    let body = match &state.metrics {
        Some(handle) => handle.render(),
        // No recorder installed (embedded/test use): expose uptime only.
        None => format!(
            "# TYPE uipm_uptime_seconds gauge\nuipm_uptime_seconds {}\n",
            uptime_seconds()
        ),
    };

    Ok(([(CONTENT_TYPE, "text/plain; version=0.0.4")], body))
}

/// Server metadata endpoint
pub async fn server_metadata() -> ServerResult<impl IntoResponse> {
    let metadata = ServerMetadata {
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: uptime_seconds(),
    };

    Ok(Json(metadata))
}
