//! Workspace umbrella crate for UI Pattern Matching (UIPM).
//!
//! This crate stitches the fingerprint model, the persistent pattern library
//! and the structural matcher together so embedding callers can open a
//! library from one YAML file and work through a single [`Uipm`] handle.
//!
//! ```
//! use uipm::{LayoutMode, PositionZone, StructureFeatures, Uipm, UpsertPatternRequest};
//!
//! let uipm = Uipm::in_memory();
//! let tab = StructureFeatures::new(
//!     vec!["INSTANCE".into(), "INSTANCE".into(), "INSTANCE".into()],
//!     LayoutMode::Horizontal,
//!     375.0,
//!     56.0,
//!     PositionZone::Bottom,
//! );
//!
//! uipm.save_pattern(UpsertPatternRequest::new("TabBar", tab.clone())).unwrap();
//! let result = uipm.suggest(&tab).unwrap();
//! assert!(result.has_exact_match);
//! assert_eq!(result.candidates[0].pattern.name, "TabBar");
//! ```

pub mod config;

pub use config::{ConfigLoadError, StoreBackendKind, UipmConfig, WeightsPreset};
pub use features::{
    validate_name, FeatureGeometry, FieldError, LayoutMode, PositionZone, StructureFeatures,
    ValidationError,
};
pub use matcher::{
    calculate_similarity, calculate_similarity_with, set_match_metrics, Factor, MatchCandidate,
    MatchError, MatchMetrics, MatchObservation, MatchOptions, MatchReason, MatchResult, Matcher,
    Similarity, Weights, EXACT_MATCH_THRESHOLD,
};
pub use store::{
    BackendConfig, Pattern, PatternHistory, PatternRepository, PatternStore, StoreError,
    StoreStats, UpsertPatternRequest,
};

use std::sync::Arc;
use thiserror::Error;

/// Errors surfaced by the [`Uipm`] facade.
#[derive(Debug, Error)]
pub enum UipmError {
    #[error("configuration failure: {0}")]
    Config(#[from] ConfigLoadError),
    #[error("store failure: {0}")]
    Store(#[from] StoreError),
    #[error("matching failure: {0}")]
    Match(#[from] MatchError),
}

/// A pattern library plus a matcher over it, configured as one unit.
pub struct Uipm {
    repository: Arc<PatternRepository>,
    matcher: Matcher,
    defaults: MatchOptions,
}

impl Uipm {
    /// Open the library and build the matcher described by `config`.
    pub fn from_config(config: &UipmConfig) -> Result<Self, UipmError> {
        config.validate()?;

        let repository = Arc::new(PatternRepository::new(&config.store.backend_config())?);
        let matcher = Matcher::new(repository.clone())
            .with_weights(config.matcher.weights.resolve()?)?
            .with_exact_match_threshold(config.matcher.exact_match_threshold)?;

        tracing::info!(
            backend = ?config.store.backend,
            weights = ?config.matcher.weights.preset,
            "opened pattern library"
        );

        Ok(Self {
            repository,
            matcher,
            defaults: config.matcher.default_options(),
        })
    }

    /// Empty in-memory library with default matcher settings.
    pub fn in_memory() -> Self {
        let repository = Arc::new(PatternRepository::with_backend(Box::new(
            store::InMemoryBackend::new(),
        )));
        Self {
            matcher: Matcher::new(repository.clone()),
            repository,
            defaults: MatchOptions::default(),
        }
    }

    pub fn repository(&self) -> &Arc<PatternRepository> {
        &self.repository
    }

    pub fn matcher(&self) -> &Matcher {
        &self.matcher
    }

    pub fn default_options(&self) -> MatchOptions {
        self.defaults
    }

    /// Create the pattern, or refresh the one already holding the name.
    pub fn save_pattern(&self, request: UpsertPatternRequest) -> Result<Pattern, UipmError> {
        Ok(self.repository.upsert_pattern(request)?)
    }

    /// Rank the library against `features` with the configured defaults.
    pub fn suggest(&self, features: &StructureFeatures) -> Result<MatchResult, UipmError> {
        self.suggest_with(features, &self.defaults)
    }

    pub fn suggest_with(
        &self,
        features: &StructureFeatures,
        options: &MatchOptions,
    ) -> Result<MatchResult, UipmError> {
        Ok(self.matcher.find_similar_patterns(features, options)?)
    }
}
