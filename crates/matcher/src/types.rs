use features::ValidationError;
use serde::{Deserialize, Serialize};
use store::{Pattern, StoreError};
use thiserror::Error;

/// A candidate scoring at or above this is treated as the same pattern.
pub const EXACT_MATCH_THRESHOLD: f64 = 0.95;
/// Default number of candidates returned by a match.
pub const DEFAULT_LIMIT: usize = 3;
/// Default minimum score a candidate needs to be returned.
pub const DEFAULT_MIN_SCORE: f64 = 0.5;

/// Allowed drift when checking that a weight table sums to one.
const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// The nine signals compared between two fingerprints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Factor {
    ChildCount,
    ChildTypes,
    LayoutMode,
    PositionZone,
    AspectRatio,
    ChildNames,
    ParentName,
    VectorPathHash,
    TextFingerprint,
}

impl Factor {
    /// Evaluation order; also the order reasons are emitted in.
    pub const ALL: [Factor; 9] = [
        Factor::ChildCount,
        Factor::ChildTypes,
        Factor::LayoutMode,
        Factor::PositionZone,
        Factor::AspectRatio,
        Factor::ChildNames,
        Factor::ParentName,
        Factor::VectorPathHash,
        Factor::TextFingerprint,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Factor::ChildCount => "childCount",
            Factor::ChildTypes => "childTypes",
            Factor::LayoutMode => "layoutMode",
            Factor::PositionZone => "positionZone",
            Factor::AspectRatio => "aspectRatio",
            Factor::ChildNames => "childNames",
            Factor::ParentName => "parentName",
            Factor::VectorPathHash => "vectorPathHash",
            Factor::TextFingerprint => "textFingerprint",
        }
    }
}

impl std::fmt::Display for Factor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-factor weights used to aggregate factor scores.
///
/// Tables must sum to 1.0; see [`Weights::validate`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Weights {
    pub child_count: f64,
    pub child_types: f64,
    pub layout_mode: f64,
    pub position_zone: f64,
    pub aspect_ratio: f64,
    pub child_names: f64,
    pub parent_name: f64,
    pub vector_path_hash: f64,
    pub text_fingerprint: f64,
}

impl Default for Weights {
    /// The nine-factor table. Context signals (parent, vector path, text)
    /// carry just over half of the total weight.
    fn default() -> Self {
        Self {
            child_count: 0.08,
            child_types: 0.12,
            layout_mode: 0.06,
            position_zone: 0.06,
            aspect_ratio: 0.08,
            child_names: 0.08,
            parent_name: 0.17,
            vector_path_hash: 0.17,
            text_fingerprint: 0.18,
        }
    }
}

impl Weights {
    /// The earlier structure-only table. Context factors weigh nothing.
    ///
    /// Kept for comparison runs; scores under it are not comparable with
    /// scores under [`Weights::default`].
    pub fn legacy() -> Self {
        Self {
            child_count: 0.20,
            child_types: 0.25,
            layout_mode: 0.15,
            position_zone: 0.15,
            aspect_ratio: 0.15,
            child_names: 0.10,
            parent_name: 0.0,
            vector_path_hash: 0.0,
            text_fingerprint: 0.0,
        }
    }

    pub fn weight(&self, factor: Factor) -> f64 {
        match factor {
            Factor::ChildCount => self.child_count,
            Factor::ChildTypes => self.child_types,
            Factor::LayoutMode => self.layout_mode,
            Factor::PositionZone => self.position_zone,
            Factor::AspectRatio => self.aspect_ratio,
            Factor::ChildNames => self.child_names,
            Factor::ParentName => self.parent_name,
            Factor::VectorPathHash => self.vector_path_hash,
            Factor::TextFingerprint => self.text_fingerprint,
        }
    }

    pub fn total(&self) -> f64 {
        Factor::ALL.iter().map(|f| self.weight(*f)).sum()
    }

    /// Every weight must lie in [0, 1] and the table must sum to 1.0.
    pub fn validate(&self) -> Result<(), MatchError> {
        for factor in Factor::ALL {
            let w = self.weight(factor);
            if !w.is_finite() || !(0.0..=1.0).contains(&w) {
                return Err(MatchError::InvalidWeights(format!(
                    "{factor} weight must be between 0.0 and 1.0, got {w}"
                )));
            }
        }
        let total = self.total();
        if (total - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(MatchError::InvalidWeights(format!(
                "weights must sum to 1.0, got {total}"
            )));
        }
        Ok(())
    }
}

/// Why a candidate scored the way it did, one entry per emitted factor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchReason {
    pub factor: Factor,
    /// Factor score in [0, 1].
    pub score: f64,
    /// Human-readable comparison of both sides.
    pub detail: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchCandidate {
    pub pattern: Pattern,
    /// Aggregate score in [0, 1].
    pub score: f64,
    pub reasons: Vec<MatchReason>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
    /// Highest score first.
    pub candidates: Vec<MatchCandidate>,
    pub has_exact_match: bool,
}

impl MatchResult {
    /// Wrap already ordered candidates, flagging an exact match when any of
    /// them reaches `threshold`.
    pub fn from_candidates(candidates: Vec<MatchCandidate>, threshold: f64) -> Self {
        let has_exact_match = candidates.iter().any(|c| c.score >= threshold);
        Self {
            candidates,
            has_exact_match,
        }
    }

    pub fn empty() -> Self {
        Self {
            candidates: Vec::new(),
            has_exact_match: false,
        }
    }

    pub fn top(&self) -> Option<&MatchCandidate> {
        self.candidates.first()
    }
}

/// Per-call knobs for [`Matcher::find_similar_patterns`](crate::Matcher::find_similar_patterns).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchOptions {
    #[serde(default = "MatchOptions::default_limit")]
    pub limit: usize,
    #[serde(default = "MatchOptions::default_min_score")]
    pub min_score: f64,
}

impl MatchOptions {
    pub(crate) fn default_limit() -> usize {
        DEFAULT_LIMIT
    }

    pub(crate) fn default_min_score() -> f64 {
        DEFAULT_MIN_SCORE
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_min_score(mut self, min_score: f64) -> Self {
        self.min_score = min_score;
        self
    }

    pub fn validate(&self) -> Result<(), MatchError> {
        if self.limit == 0 {
            return Err(MatchError::InvalidOptions(
                "limit must be greater than zero".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.min_score) {
            return Err(MatchError::InvalidOptions(
                "min_score must be between 0.0 and 1.0".into(),
            ));
        }
        Ok(())
    }
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            limit: Self::default_limit(),
            min_score: Self::default_min_score(),
        }
    }
}

/// Errors produced by the matching layer.
#[derive(Debug, Error)]
pub enum MatchError {
    /// Per-call options out of range.
    #[error("invalid match options: {0}")]
    InvalidOptions(String),
    /// Weight table rejected.
    #[error("invalid weights: {0}")]
    InvalidWeights(String),
    /// The input fingerprint failed schema checks.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// Loading the pattern library failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}
