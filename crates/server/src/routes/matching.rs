//! Structural similarity queries over the pattern library.

use crate::error::ServerResult;
use crate::routes::{blocking, ApiJson, ApiResponse};
use crate::state::ServerState;
use axum::extract::State;
use axum::response::IntoResponse;
use features::{FieldError, StructureFeatures, ValidationError};
use matcher::MatchOptions;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Largest `limit` a single match request may ask for.
pub const MAX_MATCH_LIMIT: usize = 10;

/// Body of `POST /patterns/match`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchRequest {
    pub structure: StructureFeatures,
    #[serde(default)]
    pub limit: Option<usize>,
    #[serde(default)]
    pub min_score: Option<f64>,
}

impl MatchRequest {
    /// Check the request bounds and the structure in one pass.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = Vec::new();
        if let Some(limit) = self.limit {
            if !(1..=MAX_MATCH_LIMIT).contains(&limit) {
                errors.push(FieldError::new(
                    "limit",
                    format!("must be between 1 and {MAX_MATCH_LIMIT}"),
                ));
            }
        }
        if let Some(min_score) = self.min_score {
            if !(0.0..=1.0).contains(&min_score) {
                errors.push(FieldError::new("minScore", "must be between 0 and 1"));
            }
        }
        if let Err(err) = self.structure.validate() {
            errors.extend(err.nested("structure").errors);
        }
        ValidationError::check(errors)
    }

    pub fn options(&self) -> MatchOptions {
        let defaults = MatchOptions::default();
        MatchOptions {
            limit: self.limit.unwrap_or(defaults.limit),
            min_score: self.min_score.unwrap_or(defaults.min_score),
        }
    }
}

/// `POST /patterns/match`
pub async fn match_patterns(
    State(state): State<Arc<ServerState>>,
    ApiJson(request): ApiJson<MatchRequest>,
) -> ServerResult<impl IntoResponse> {
    request.validate()?;

    let matcher = state.matcher.clone();
    let result = blocking(move || {
        Ok(matcher.find_similar_patterns(&request.structure, &request.options())?)
    })
    .await?;

    tracing::info!(
        candidates = result.candidates.len(),
        exact = result.has_exact_match,
        "pattern match served"
    );
    Ok(ApiResponse::ok(result))
}
