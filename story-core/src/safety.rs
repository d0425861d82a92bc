//! Safety gate for story prompts.
//!
//! Asks the safety model whether a prompt suits the target age before any
//! story is generated. The gate fails closed: if the model call errors or
//! the verdict cannot be decoded, the prompt is treated as inappropriate.

use crate::config::MODEL_CONFIG;
use crate::model::{ModelError, ModelMessage, ObjectRequest, StructuredModel};
use crate::schema::{AgeBand, SafetyValidation};
use std::sync::Arc;

/// Reason reported when no verdict could be obtained.
pub const SAFETY_FALLBACK_REASON: &str = "Unable to validate content safety";

pub struct SafetyGate {
    model: Arc<dyn StructuredModel>,
}

impl SafetyGate {
    pub fn new(model: Arc<dyn StructuredModel>) -> Self {
        Self { model }
    }

    /// The structured-output request used to judge `prompt`.
    pub fn request_for(prompt: &str, age: AgeBand) -> ObjectRequest {
        ObjectRequest::new(MODEL_CONFIG.safety, SafetyValidation::response_schema())
            .with_message(ModelMessage::system(format!(
                "You are a content safety validator for children's stories. Assess if the given prompt is appropriate for {age} year olds."
            )))
            .with_message(ModelMessage::user(format!(
                "Is this story prompt appropriate for {age} year olds: \"{prompt}\""
            )))
            .with_temperature(MODEL_CONFIG.safety_temperature)
    }

    /// Judge a prompt. Never errors; any failure becomes a rejection.
    pub async fn check(&self, prompt: &str, age: AgeBand) -> SafetyValidation {
        match self.judge(prompt, age).await {
            Ok(verdict) => verdict,
            Err(e) => {
                tracing::warn!(error = %e, "safety validation failed, treating prompt as inappropriate");
                SafetyValidation::rejected(SAFETY_FALLBACK_REASON)
            }
        }
    }

    async fn judge(&self, prompt: &str, age: AgeBand) -> Result<SafetyValidation, ModelError> {
        let value = self
            .model
            .generate_object(Self::request_for(prompt, age))
            .await?;
        serde_json::from_value(value).map_err(|e| ModelError::InvalidResponse(e.to_string()))
    }
}
