//! Structured-output model abstraction.
//!
//! The pipeline talks to the generation service only through
//! [`StructuredModel`], which keeps provider details out of the request
//! flow and lets tests script model replies.

use async_trait::async_trait;
use serde::Serialize;
use std::pin::Pin;
use thiserror::Error;
use tokio_stream::Stream;

/// Errors from a model call.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("{0}")]
    Provider(#[from] gemini::Error),

    #[error("Invalid model response: {0}")]
    InvalidResponse(String),

    #[error("Generation blocked: {0}")]
    Blocked(String),

    #[error("Generation timed out")]
    Timeout,

    #[error("Model unavailable: {0}")]
    Unavailable(String),
}

/// Who a message comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    System,
    User,
}

/// A role-tagged prompt message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelMessage {
    pub role: MessageRole,
    pub content: String,
}

impl ModelMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }
}

/// A request for one schema-conformant object.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObjectRequest {
    /// Model identifier
    pub model: String,
    /// Schema the reply must conform to
    pub schema: serde_json::Value,
    /// Ordered prompt messages
    pub messages: Vec<ModelMessage>,
    pub temperature: f32,
    pub top_p: Option<f32>,
    pub top_k: Option<u32>,
    pub max_output_tokens: Option<u32>,
}

impl ObjectRequest {
    pub fn new(model: impl Into<String>, schema: serde_json::Value) -> Self {
        Self {
            model: model.into(),
            schema,
            messages: Vec::new(),
            temperature: 1.0,
            top_p: None,
            top_k: None,
            max_output_tokens: None,
        }
    }

    pub fn with_message(mut self, message: ModelMessage) -> Self {
        self.messages.push(message);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_top_p(mut self, top_p: f32) -> Self {
        self.top_p = Some(top_p);
        self
    }

    pub fn with_top_k(mut self, top_k: u32) -> Self {
        self.top_k = Some(top_k);
        self
    }

    pub fn with_max_output_tokens(mut self, max: u32) -> Self {
        self.max_output_tokens = Some(max);
        self
    }

    /// Content of the first message with the given role.
    pub fn message(&self, role: MessageRole) -> Option<&str> {
        self.messages
            .iter()
            .find(|m| m.role == role)
            .map(|m| m.content.as_str())
    }
}

/// JSON text of an object, delivered incrementally.
pub type TextStream = Pin<Box<dyn Stream<Item = Result<String, ModelError>> + Send>>;

/// A provider that can produce schema-conformant objects.
#[async_trait]
pub trait StructuredModel: Send + Sync {
    /// Produce one complete object.
    async fn generate_object(&self, request: ObjectRequest) -> Result<serde_json::Value, ModelError>;

    /// Stream the object's JSON text.
    ///
    /// `Err` means the call failed before any text was produced; item
    /// errors mean the stream broke part way through.
    async fn stream_object(&self, request: ObjectRequest) -> Result<TextStream, ModelError>;

    /// Provider name, for logs.
    fn name(&self) -> &str;
}
