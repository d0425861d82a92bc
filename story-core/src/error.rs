//! Request-level error taxonomy.

use crate::catalog::ReferenceNotFound;
use crate::model::ModelError;
use crate::validation::ValidationError;
use serde::Serialize;
use thiserror::Error;

/// Pipeline stage a request was in when it ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Validating,
    Resolving,
    SafetyChecking,
    Generating,
    SuggestingChoices,
}

/// Why a story request did not succeed.
#[derive(Debug, Error)]
pub enum StoryError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    ReferenceNotFound(#[from] ReferenceNotFound),

    #[error("Content not appropriate for children")]
    SafetyRejection { reason: String },

    #[error("{source}")]
    Upstream {
        stage: Stage,
        #[source]
        source: ModelError,
    },
}

impl StoryError {
    pub fn upstream(stage: Stage, source: ModelError) -> Self {
        StoryError::Upstream { stage, source }
    }

    pub fn stage(&self) -> Stage {
        match self {
            StoryError::Validation(_) => Stage::Validating,
            StoryError::ReferenceNotFound(_) => Stage::Resolving,
            StoryError::SafetyRejection { .. } => Stage::SafetyChecking,
            StoryError::Upstream { stage, .. } => *stage,
        }
    }

    /// Whether the caller is at fault (4xx) rather than the service (5xx).
    pub fn is_client_error(&self) -> bool {
        !matches!(self, StoryError::Upstream { .. })
    }

    /// Human-readable detail to return alongside the error message.
    pub fn reason(&self) -> Option<String> {
        match self {
            StoryError::Validation(e) => Some(e.summary()),
            StoryError::SafetyRejection { reason } => Some(reason.clone()),
            StoryError::ReferenceNotFound(_) | StoryError::Upstream { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::Problem;

    #[test]
    fn test_classification() {
        let validation = StoryError::from(ValidationError::single("userPrompt", Problem::Missing));
        assert!(validation.is_client_error());
        assert_eq!(validation.stage(), Stage::Validating);
        assert_eq!(validation.reason().as_deref(), Some("userPrompt is required"));

        let rejected = StoryError::SafetyRejection {
            reason: "Too scary".into(),
        };
        assert!(rejected.is_client_error());
        assert_eq!(rejected.to_string(), "Content not appropriate for children");

        let upstream = StoryError::upstream(
            Stage::Generating,
            ModelError::Unavailable("503 from provider".into()),
        );
        assert!(!upstream.is_client_error());
        assert_eq!(upstream.stage(), Stage::Generating);
        assert_eq!(upstream.to_string(), "Model unavailable: 503 from provider");
        assert!(upstream.reason().is_none());
    }

    #[test]
    fn test_reference_message() {
        let err = StoryError::from(ReferenceNotFound {
            author_style_id: "x".into(),
            location_id: "y".into(),
        });
        assert_eq!(err.to_string(), "Invalid author style or location");
        assert_eq!(err.stage(), Stage::Resolving);
    }
}
