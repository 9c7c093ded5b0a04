use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use features::ValidationError;
use matcher::MatchError;
use serde::{Deserialize, Serialize};
use store::StoreError;

pub type ServerResult<T> = Result<T, ServerError>;

/// Server error types
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Invalid request: {0}")]
    Validation(ValidationError),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Store error: {0}")]
    Store(StoreError),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// API error response structure
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ServerError {
    pub fn pattern_not_found() -> Self {
        ServerError::NotFound("Pattern".to_string())
    }

    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServerError::Validation(_) | ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::NotFound(_) => StatusCode::NOT_FOUND,
            ServerError::Conflict(_) => StatusCode::CONFLICT,
            ServerError::Store(_) | ServerError::Internal(_) | ServerError::Config(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Get error code string
    pub fn error_code(&self) -> &'static str {
        match self {
            ServerError::Validation(_) => "VALIDATION_ERROR",
            ServerError::BadRequest(_) => "BAD_REQUEST",
            ServerError::NotFound(_) => "NOT_FOUND",
            ServerError::Conflict(_) => "CONFLICT",
            ServerError::Store(_) => "STORE_ERROR",
            ServerError::Internal(_) => "INTERNAL_ERROR",
            ServerError::Config(_) => "CONFIG_ERROR",
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            ServerError::Validation(err) => serde_json::to_value(&err.errors).ok(),
            _ => None,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, code = self.error_code(), "request failed");
        }

        let body = ErrorResponse {
            success: false,
            error: ErrorDetail {
                code: self.error_code().to_string(),
                message: self.to_string(),
                details: self.details(),
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<ValidationError> for ServerError {
    fn from(err: ValidationError) -> Self {
        ServerError::Validation(err)
    }
}

impl From<StoreError> for ServerError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Validation(v) => ServerError::Validation(v),
            StoreError::NameConflict(name) => {
                ServerError::Conflict(format!("pattern name already in use: {name}"))
            }
            other => ServerError::Store(other),
        }
    }
}

impl From<MatchError> for ServerError {
    fn from(err: MatchError) -> Self {
        match err {
            MatchError::Validation(v) => ServerError::Validation(v),
            MatchError::Store(e) => e.into(),
            MatchError::InvalidOptions(msg) => ServerError::BadRequest(msg),
            MatchError::InvalidWeights(msg) => ServerError::Config(msg),
        }
    }
}

impl From<JsonRejection> for ServerError {
    fn from(rejection: JsonRejection) -> Self {
        ServerError::Validation(ValidationError::single("body", rejection.body_text()))
    }
}

impl From<QueryRejection> for ServerError {
    fn from(rejection: QueryRejection) -> Self {
        ServerError::Validation(ValidationError::single("query", rejection.body_text()))
    }
}

impl From<PathRejection> for ServerError {
    fn from(rejection: PathRejection) -> Self {
        ServerError::BadRequest(rejection.body_text())
    }
}

impl From<tokio::task::JoinError> for ServerError {
    fn from(err: tokio::task::JoinError) -> Self {
        ServerError::Internal(format!("blocking task failed: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_errors_map_to_client_codes_where_appropriate() {
        let conflict: ServerError = StoreError::NameConflict("Card".into()).into();
        assert_eq!(conflict.status_code(), StatusCode::CONFLICT);

        let invalid: ServerError =
            StoreError::Validation(ValidationError::single("name", "must not be empty")).into();
        assert_eq!(invalid.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(invalid.error_code(), "VALIDATION_ERROR");

        let io: ServerError = StoreError::Io("disk full".into()).into();
        assert_eq!(io.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(io.error_code(), "STORE_ERROR");
    }

    #[test]
    fn match_option_errors_are_bad_requests() {
        let err: ServerError = MatchError::InvalidOptions("limit must be greater than zero".into()).into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn weight_errors_and_join_failures_are_server_side() {
        let weights: ServerError = MatchError::InvalidWeights("weights sum to 1.4".into()).into();
        assert_eq!(weights.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(weights.error_code(), "CONFIG_ERROR");

        let internal = ServerError::Internal("blocking task failed".into());
        assert_eq!(internal.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(internal.error_code(), "INTERNAL_ERROR");
    }

    #[test]
    fn every_variant_has_a_distinct_code_and_no_timeout_status() {
        let variants = [
            ServerError::Validation(ValidationError::single("name", "required")),
            ServerError::BadRequest("bad".into()),
            ServerError::NotFound("Pattern".into()),
            ServerError::Conflict("Card".into()),
            ServerError::Store(StoreError::Io("disk".into())),
            ServerError::Internal("boom".into()),
            ServerError::Config("weights".into()),
        ];
        let mut codes: Vec<&str> = variants.iter().map(ServerError::error_code).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), variants.len());
        // Timeouts are answered by the tower-http layer, not by this type.
        assert!(variants.iter().all(|e| e.status_code() != StatusCode::REQUEST_TIMEOUT));
    }

    #[test]
    fn validation_details_list_fields() {
        let err = ServerError::Validation(ValidationError::single("structure.width", "must be > 0"));
        let details = err.details().expect("details");
        assert_eq!(details[0]["field"], "structure.width");
    }
}
