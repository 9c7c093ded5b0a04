//! UIPM Server - HTTP REST API for the UI pattern library
//!
//! This crate exposes the pattern store and the structural matcher over a
//! small JSON API. It supports:
//!
//! - **Pattern Library**: Upsert by name, lookup, rename, delete, usage tracking and history
//! - **Matching**: Rank saved patterns against a structural fingerprint
//! - **Health & Metrics**: Liveness/readiness probes and Prometheus-compatible metrics
//!
//! # Features
//!
//! - **Middleware**: Compression, CORS, request ID tracking, structured logging
//! - **Configuration**: Environment variable and file-based configuration
//! - **Error Handling**: `{success: false, error: {code, message, details}}` envelopes
//! - **Graceful Shutdown**: Proper signal handling for production deployments
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use server::ServerConfig;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::load()?;
//!     server::start_server(config).await?;
//!     Ok(())
//! }
//! ```
//!
//! # API Endpoints
//!
//! - `GET /` - API information
//! - `GET /health` - Liveness probe
//! - `GET /ready` - Readiness probe, includes store statistics
//! - `GET /metrics` - Prometheus metrics
//! - `GET /metadata` - Server metadata
//! - `GET /patterns?sort=recent|frequent&limit=N` - List patterns
//! - `POST /patterns` - Create or update a pattern by name
//! - `POST /patterns/match` - Find similar patterns
//! - `POST /patterns/reset` - Empty the library
//! - `GET /patterns/history?limit=N` - Naming history, newest first
//! - `GET /patterns/{id}` - Get a pattern
//! - `PATCH /patterns/{id}` - Rename a pattern
//! - `DELETE /patterns/{id}` - Delete a pattern
//! - `POST /patterns/{id}/use` - Record a use of a pattern

pub mod config;
pub mod error;
pub mod match_metrics;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use server::{build_router, start_server};
pub use state::ServerState;
