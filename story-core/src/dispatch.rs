//! Generation dispatcher.
//!
//! Opens the streaming chapter request and hands the text stream back for
//! relaying. The stream is not retried or buffered; it is only cut off once
//! the generation time ceiling passes.

use crate::config::{MAX_GENERATION_TIME, MODEL_CONFIG};
use crate::model::{ModelError, ModelMessage, ObjectRequest, StructuredModel, TextStream};
use crate::schema::ChapterGeneration;
use futures::StreamExt;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

pub struct GenerationDispatcher {
    model: Arc<dyn StructuredModel>,
    max_generation_time: Duration,
}

impl GenerationDispatcher {
    pub fn new(model: Arc<dyn StructuredModel>) -> Self {
        Self {
            model,
            max_generation_time: MAX_GENERATION_TIME,
        }
    }

    pub fn with_max_generation_time(mut self, max: Duration) -> Self {
        self.max_generation_time = max;
        self
    }

    /// The streaming request for one chapter.
    pub fn request_for(system_prompt: &str, instruction: &str) -> ObjectRequest {
        ObjectRequest::new(MODEL_CONFIG.generation, ChapterGeneration::response_schema())
            .with_message(ModelMessage::system(system_prompt))
            .with_message(ModelMessage::user(instruction))
            .with_temperature(MODEL_CONFIG.temperature)
            .with_top_p(MODEL_CONFIG.top_p)
            .with_top_k(MODEL_CONFIG.top_k)
            .with_max_output_tokens(MODEL_CONFIG.max_tokens)
    }

    /// Start generating a chapter.
    ///
    /// Waits for the first piece of text so that a call which fails before
    /// producing anything surfaces as an `Err` rather than an empty stream.
    pub async fn dispatch(
        &self,
        system_prompt: &str,
        instruction: &str,
    ) -> Result<TextStream, ModelError> {
        let deadline = Instant::now() + self.max_generation_time;
        let request = Self::request_for(system_prompt, instruction);

        let mut stream = tokio::time::timeout_at(deadline, self.model.stream_object(request))
            .await
            .map_err(|_| ModelError::Timeout)??;

        let first = match tokio::time::timeout_at(deadline, stream.next()).await {
            Err(_) => return Err(ModelError::Timeout),
            Ok(None) => {
                return Err(ModelError::InvalidResponse(
                    "generation produced no output".into(),
                ))
            }
            Ok(Some(Err(e))) => return Err(e),
            Ok(Some(Ok(text))) => text,
        };

        let rest = stream
            .inspect(|item| {
                if let Err(e) = item {
                    tracing::error!(error = %e, "generation stream failed mid-way");
                }
            })
            .take_until(tokio::time::sleep_until(deadline));

        Ok(Box::pin(futures::stream::once(async move { Ok::<_, ModelError>(first) }).chain(rest)))
    }
}
