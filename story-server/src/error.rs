//! Mapping from pipeline errors to JSON responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use story_core::validation::FieldIssue;
use story_core::{StoryError, ValidationError};
use tracing::{error, warn};

/// Body of every non-2xx reply.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issues: Option<Vec<FieldIssue>>,
}

/// A failed request, ready to be rendered.
#[derive(Debug)]
pub struct ApiError(pub StoryError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        if self.0.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }

    pub fn body(&self) -> ErrorBody {
        let issues = match &self.0 {
            StoryError::Validation(e) => Some(e.issues.clone()),
            _ => None,
        };
        ErrorBody {
            error: self.0.to_string(),
            reason: self.0.reason(),
            issues,
        }
    }

    /// Record the failure against the current span.
    pub fn log(&self) {
        let stage = self.0.stage();
        if self.0.is_client_error() {
            warn!(?stage, reason = ?self.0.reason(), "request rejected: {}", self.0);
        } else {
            error!(?stage, "request failed: {}", self.0);
        }
    }
}

impl From<StoryError> for ApiError {
    fn from(err: StoryError) -> Self {
        ApiError(err)
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError(StoryError::Validation(err))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.body())).into_response()
    }
}
