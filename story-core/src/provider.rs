//! [`StructuredModel`] backed by the Gemini API.

use crate::config::SAFETY_SETTINGS;
use crate::model::{MessageRole, ModelError, ObjectRequest, StructuredModel, TextStream};
use async_trait::async_trait;
use futures::StreamExt;
use gemini::{FinishReason, Gemini, Message, Request, StreamEvent};

pub struct GeminiModel {
    client: Gemini,
}

impl GeminiModel {
    pub fn new(client: Gemini) -> Self {
        Self { client }
    }

    /// Create from environment (GEMINI_API_KEY).
    pub fn from_env() -> Result<Self, gemini::Error> {
        Ok(Self::new(Gemini::from_env()?))
    }
}

/// Map an object request onto the provider's wire request.
///
/// System messages become the system instruction; every call carries the
/// fixed safety settings.
fn to_gemini_request(request: ObjectRequest) -> Request {
    let system = request
        .messages
        .iter()
        .filter(|m| m.role == MessageRole::System)
        .map(|m| m.content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n");

    let messages = request
        .messages
        .iter()
        .filter(|m| m.role == MessageRole::User)
        .map(|m| Message::user(m.content.clone()))
        .collect();

    let mut gemini_request = Request::new(messages)
        .with_model(request.model)
        .with_temperature(request.temperature)
        .with_response_schema(request.schema)
        .with_safety_settings(SAFETY_SETTINGS.to_vec());

    if !system.is_empty() {
        gemini_request = gemini_request.with_system(system);
    }
    if let Some(top_p) = request.top_p {
        gemini_request = gemini_request.with_top_p(top_p);
    }
    if let Some(top_k) = request.top_k {
        gemini_request = gemini_request.with_top_k(top_k);
    }
    if let Some(max) = request.max_output_tokens {
        gemini_request = gemini_request.with_max_output_tokens(max);
    }
    gemini_request
}

fn stream_item(event: Result<StreamEvent, gemini::Error>) -> Option<Result<String, ModelError>> {
    match event {
        Ok(StreamEvent::TextDelta { text }) => Some(Ok(text)),
        Ok(StreamEvent::Blocked { reason }) => Some(Err(ModelError::Blocked(reason))),
        Ok(StreamEvent::Finish { reason }) => {
            if reason != FinishReason::Stop {
                tracing::warn!(?reason, "generation finished early");
            }
            None
        }
        Ok(StreamEvent::Usage(usage)) => {
            tracing::debug!(
                prompt_tokens = usage.prompt_tokens,
                output_tokens = usage.output_tokens,
                "generation usage"
            );
            None
        }
        Err(e) => Some(Err(e.into())),
    }
}

#[async_trait]
impl StructuredModel for GeminiModel {
    async fn generate_object(&self, request: ObjectRequest) -> Result<serde_json::Value, ModelError> {
        let response = self.client.complete(to_gemini_request(request)).await?;
        if response.finish_reason == FinishReason::Safety {
            return Err(ModelError::Blocked("response withheld by provider filters".into()));
        }
        response
            .json()
            .map_err(|e| ModelError::InvalidResponse(e.to_string()))
    }

    async fn stream_object(&self, request: ObjectRequest) -> Result<TextStream, ModelError> {
        let events = self.client.stream(to_gemini_request(request)).await?;
        let stream = events.filter_map(|event| futures::future::ready(stream_item(event)));
        Ok(Box::pin(stream))
    }

    fn name(&self) -> &str {
        "gemini"
    }
}
