//! # UIPM Matcher (`matcher`)
//!
//! ## Purpose
//!
//! `matcher` answers "which named pattern does this element look like?". It
//! sits on top of the pattern library (`store`) and compares a query
//! [`StructureFeatures`](features::StructureFeatures) against every stored
//! pattern with a pure, weighted, nine-factor structural score.
//!
//! ## Core Types
//!
//! - [`calculate_similarity`]: the pure scorer. Returns an aggregate score in
//!   [0, 1] plus a [`MatchReason`] per emitted [`Factor`].
//! - [`Weights`]: the factor weight table. [`Weights::default`] is the
//!   nine-factor table; [`Weights::legacy`] the older structure-only one.
//! - [`MatchOptions`]: `limit` (default 3) and `min_score` (default 0.5).
//! - [`MatchResult`]: ordered [`MatchCandidate`]s and `has_exact_match`,
//!   set when any returned candidate reaches [`EXACT_MATCH_THRESHOLD`].
//! - [`Matcher`]: runs queries against a shared
//!   [`PatternRepository`](store::PatternRepository).
//!
//! ## Example Usage
//!
//! ```
//! use std::sync::Arc;
//! use features::{LayoutMode, PositionZone, StructureFeatures};
//! use matcher::{MatchOptions, Matcher};
//! use store::{BackendConfig, PatternRepository, UpsertPatternRequest};
//!
//! let repo = Arc::new(PatternRepository::new(&BackendConfig::in_memory()).unwrap());
//! let toolbar = StructureFeatures::new(
//!     vec!["TEXT".into(), "ICON".into(), "TEXT".into()],
//!     LayoutMode::Horizontal,
//!     300.0,
//!     48.0,
//!     PositionZone::Bottom,
//! );
//! repo.upsert_pattern(UpsertPatternRequest::new("Toolbar", toolbar.clone())).unwrap();
//!
//! let matcher = Matcher::new(repo);
//! let result = matcher.find_similar_patterns(&toolbar, &MatchOptions::default()).unwrap();
//!
//! assert!(result.has_exact_match);
//! assert_eq!(result.candidates[0].pattern.name, "Toolbar");
//! ```
//!
//! ## Observability
//!
//! Install a [`MatchMetrics`] implementation via [`set_match_metrics`] to record
//! per-query latency and candidate counts. This is typically done once during
//! service startup so all [`Matcher`] instances share the same backend.

pub mod engine;
pub mod metrics;
pub mod scoring;
pub mod types;

pub use crate::engine::Matcher;
pub use crate::metrics::{set_match_metrics, MatchMetrics, MatchObservation};
pub use crate::scoring::{calculate_similarity, calculate_similarity_with, Similarity};
pub use crate::types::{
    Factor, MatchCandidate, MatchError, MatchOptions, MatchReason, MatchResult, Weights,
    DEFAULT_LIMIT, DEFAULT_MIN_SCORE, EXACT_MATCH_THRESHOLD,
};
