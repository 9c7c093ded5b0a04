//! Pattern library endpoints.

use crate::error::{ServerError, ServerResult};
use crate::routes::{blocking, ApiJson, ApiPath, ApiQuery, ApiResponse};
use crate::state::ServerState;
use axum::extract::State;
use axum::response::IntoResponse;
use features::validate_name;
use serde::Deserialize;
use std::sync::Arc;
use store::UpsertPatternRequest;

/// Ordering for the list endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternSort {
    /// Most recently used first.
    #[default]
    Recent,
    /// Most used first.
    Frequent,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub sort: PatternSort,
    #[serde(default)]
    pub limit: Option<String>,
}

impl ListQuery {
    pub fn limit(&self) -> usize {
        parse_limit(self.limit.as_deref()).unwrap_or(DEFAULT_LIST_LIMIT)
    }
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    #[serde(default)]
    pub limit: Option<String>,
}

impl HistoryQuery {
    pub fn limit(&self) -> usize {
        parse_limit(self.limit.as_deref()).unwrap_or(DEFAULT_HISTORY_LIMIT)
    }
}

#[derive(Debug, Deserialize)]
pub struct RenameRequest {
    pub name: String,
}

const DEFAULT_LIST_LIMIT: usize = 20;
const DEFAULT_HISTORY_LIMIT: usize = 50;

/// Leading decimal digits of `raw`, ignoring surrounding whitespace.
/// Missing, non-numeric, negative and zero values yield `None` so the
/// caller falls back to its default instead of rejecting the request.
fn parse_limit(raw: Option<&str>) -> Option<usize> {
    let raw = raw?.trim_start();
    let end = raw
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(raw.len());
    raw[..end].parse::<usize>().ok().filter(|&limit| limit > 0)
}

/// `GET /patterns`
pub async fn list_patterns(
    State(state): State<Arc<ServerState>>,
    ApiQuery(query): ApiQuery<ListQuery>,
) -> ServerResult<impl IntoResponse> {
    let sort = query.sort;
    let limit = query.limit();
    let repository = state.repository.clone();
    let patterns = blocking(move || {
        Ok(match sort {
            PatternSort::Recent => repository.get_recent_patterns(limit)?,
            PatternSort::Frequent => repository.get_frequent_patterns(limit)?,
        })
    })
    .await?;

    tracing::debug!(count = patterns.len(), sort = ?sort, "listed patterns");
    Ok(ApiResponse::ok(patterns))
}

/// `GET /patterns/{id}`
pub async fn get_pattern(
    State(state): State<Arc<ServerState>>,
    ApiPath(id): ApiPath<String>,
) -> ServerResult<impl IntoResponse> {
    let repository = state.repository.clone();
    let pattern = blocking(move || Ok(repository.get_pattern_by_id(&id)?))
        .await?
        .ok_or_else(ServerError::pattern_not_found)?;

    Ok(ApiResponse::ok(pattern))
}

/// `POST /patterns`: create, or update the pattern holding `name`.
pub async fn upsert_pattern(
    State(state): State<Arc<ServerState>>,
    ApiJson(request): ApiJson<UpsertPatternRequest>,
) -> ServerResult<impl IntoResponse> {
    request.validate()?;

    let repository = state.repository.clone();
    let pattern = blocking(move || Ok(repository.upsert_pattern(request)?)).await?;

    tracing::info!(name = %pattern.name, id = %pattern.id, "pattern upserted");
    Ok(ApiResponse::ok(pattern))
}

/// `DELETE /patterns/{id}`
pub async fn delete_pattern(
    State(state): State<Arc<ServerState>>,
    ApiPath(id): ApiPath<String>,
) -> ServerResult<impl IntoResponse> {
    let repository = state.repository.clone();
    let target = id.clone();
    let deleted = blocking(move || Ok(repository.delete_pattern(&target)?)).await?;

    if !deleted {
        return Err(ServerError::pattern_not_found());
    }
    tracing::info!(id = %id, "pattern deleted");
    Ok(ApiResponse::message("Pattern deleted"))
}

/// `POST /patterns/reset`
pub async fn reset_patterns(
    State(state): State<Arc<ServerState>>,
) -> ServerResult<impl IntoResponse> {
    let repository = state.repository.clone();
    blocking(move || Ok(repository.reset()?)).await?;

    Ok(ApiResponse::message("Pattern library has been reset"))
}

/// `POST /patterns/{id}/use`
pub async fn record_usage(
    State(state): State<Arc<ServerState>>,
    ApiPath(id): ApiPath<String>,
) -> ServerResult<impl IntoResponse> {
    let repository = state.repository.clone();
    let pattern = blocking(move || Ok(repository.record_pattern_usage(&id)?))
        .await?
        .ok_or_else(ServerError::pattern_not_found)?;

    Ok(ApiResponse::ok(pattern))
}

/// `PATCH /patterns/{id}` with `{"name": ...}`.
pub async fn rename_pattern(
    State(state): State<Arc<ServerState>>,
    ApiPath(id): ApiPath<String>,
    ApiJson(request): ApiJson<RenameRequest>,
) -> ServerResult<impl IntoResponse> {
    validate_name("name", &request.name)?;

    let repository = state.repository.clone();
    let pattern = blocking(move || Ok(repository.rename_pattern(&id, &request.name)?))
        .await?
        .ok_or_else(ServerError::pattern_not_found)?;

    Ok(ApiResponse::ok(pattern))
}

/// `GET /patterns/history`
pub async fn pattern_history(
    State(state): State<Arc<ServerState>>,
    ApiQuery(query): ApiQuery<HistoryQuery>,
) -> ServerResult<impl IntoResponse> {
    let limit = query.limit();
    let repository = state.repository.clone();
    let history = blocking(move || Ok(repository.get_history(limit)?)).await?;

    Ok(ApiResponse::ok(history))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_takes_leading_digits() {
        assert_eq!(parse_limit(Some("5")), Some(5));
        assert_eq!(parse_limit(Some(" 12")), Some(12));
        assert_eq!(parse_limit(Some("10abc")), Some(10));
        assert_eq!(parse_limit(Some("1.5")), Some(1));
    }

    #[test]
    fn unusable_limits_fall_back_to_defaults() {
        for raw in [None, Some(""), Some("abc"), Some("0"), Some("-3")] {
            let list = ListQuery {
                sort: PatternSort::Recent,
                limit: raw.map(str::to_string),
            };
            let history = HistoryQuery {
                limit: raw.map(str::to_string),
            };
            assert_eq!(list.limit(), DEFAULT_LIST_LIMIT, "{raw:?}");
            assert_eq!(history.limit(), DEFAULT_HISTORY_LIMIT, "{raw:?}");
        }
    }
}
