use std::cmp::Ordering;
use std::sync::Arc;
use std::time::Instant;

use features::StructureFeatures;
use store::{Pattern, PatternRepository};
use tracing::debug;

use crate::metrics::{metrics_recorder, MatchObservation};
use crate::scoring::calculate_similarity_with;
use crate::types::{
    MatchCandidate, MatchError, MatchOptions, MatchResult, Weights, EXACT_MATCH_THRESHOLD,
};


/// Scores fingerprints against the pattern library held by a repository.
pub struct Matcher {
    repository: Arc<PatternRepository>,
    weights: Weights,
    exact_match_threshold: f64,
}

impl Matcher {
    /// Matcher over `repository` with the default weight table.
    pub fn new(repository: Arc<PatternRepository>) -> Self {
        Self {
            repository,
            weights: Weights::default(),
            exact_match_threshold: EXACT_MATCH_THRESHOLD,
        }
    }

    /// Swap in another weight table. Rejects tables that do not sum to one.
    pub fn with_weights(mut self, weights: Weights) -> Result<Self, MatchError> {
        weights.validate()?;
        self.weights = weights;
        Ok(self)
    }

    pub fn with_exact_match_threshold(mut self, threshold: f64) -> Result<Self, MatchError> {
        if !(0.0..=1.0).contains(&threshold) {
            return Err(MatchError::InvalidOptions(
                "exact_match_threshold must be between 0.0 and 1.0".into(),
            ));
        }
        self.exact_match_threshold = threshold;
        Ok(self)
    }

    pub fn weights(&self) -> &Weights {
        &self.weights
    }

    pub fn repository(&self) -> &Arc<PatternRepository> {
        &self.repository
    }

    /// Score `input` against every stored pattern and return the best
    /// candidates scoring at least `options.min_score`, highest first.
    pub fn find_similar_patterns(
        &self,
        input: &StructureFeatures,
        options: &MatchOptions,
    ) -> Result<MatchResult, MatchError> {
        options.validate()?;
        input.validate()?;

        let start = Instant::now();
        let store = self.repository.load_store()?;
        let considered = store.patterns.len();

        let mut candidates = rank(input, &store.patterns, &self.weights, options.min_score);
        let above_threshold = candidates.len();
        candidates.truncate(options.limit);

        let result = MatchResult::from_candidates(candidates, self.exact_match_threshold);

        debug!(
            considered,
            candidates = above_threshold,
            min_score = options.min_score,
            "scored pattern library"
        );
        if let Some(top) = result.top() {
            debug!(
                name = %top.pattern.name,
                score = top.score,
                exact = result.has_exact_match,
                "top pattern match"
            );
        }

        if let Some(recorder) = metrics_recorder() {
            recorder.record_match(&MatchObservation {
                latency: start.elapsed(),
                considered,
                returned: result.candidates.len(),
                has_exact_match: result.has_exact_match,
            });
        }

        Ok(result)
    }

    /// Direct name lookup; no scoring.
    pub fn find_exact_pattern(&self, name: &str) -> Result<Option<Pattern>, MatchError> {
        Ok(self.repository.get_pattern_by_name(name)?)
    }
}

/// Score, filter and sort. Equal scores keep library order.
fn rank(
    input: &StructureFeatures,
    patterns: &[Pattern],
    weights: &Weights,
    min_score: f64,
) -> Vec<MatchCandidate> {
    let mut candidates: Vec<MatchCandidate> = patterns
        .iter()
        .filter_map(|pattern| {
            let similarity = calculate_similarity_with(input, &pattern.structure, weights);
            (similarity.score >= min_score).then(|| MatchCandidate {
                pattern: pattern.clone(),
                score: similarity.score,
                reasons: similarity.reasons,
            })
        })
        .collect();

    candidates.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    candidates
}
