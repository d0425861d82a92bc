//! Testing utilities for the story pipeline.
//!
//! `MockModel` returns scripted replies without API calls and records every
//! request it receives, so tests can assert which model calls happened.

use crate::model::{ModelError, ObjectRequest, StructuredModel, TextStream};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

/// A scripted reply to `generate_object`.
#[derive(Debug, Clone)]
pub enum MockObject {
    Reply(Value),
    Fail(String),
}

/// A scripted reply to `stream_object`.
#[derive(Debug, Clone)]
pub enum MockStream {
    /// Stream these chunks, then end.
    Chunks(Vec<String>),
    /// Fail before streaming starts.
    Fail(String),
    /// Stream these chunks, then fail mid-way.
    BreakAfter(Vec<String>, String),
}

/// Which trait method a recorded call went through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    Generate,
    Stream,
}

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub kind: CallKind,
    pub request: ObjectRequest,
}

/// A model that replays scripted responses in order.
#[derive(Default)]
pub struct MockModel {
    objects: Mutex<VecDeque<MockObject>>,
    streams: Mutex<VecDeque<MockStream>>,
    calls: Mutex<Vec<RecordedCall>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MockModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// A safety verdict approving the prompt.
    pub fn approve() -> Value {
        json!({"isAppropriate": true, "reason": "Gentle and age-appropriate"})
    }

    /// A safety verdict rejecting the prompt.
    pub fn reject(reason: &str) -> Value {
        json!({"isAppropriate": false, "reason": reason})
    }

    /// Queue a `generate_object` reply.
    pub fn with_object(self, value: Value) -> Self {
        lock(&self.objects).push_back(MockObject::Reply(value));
        self
    }

    /// Queue a failing `generate_object` call.
    pub fn with_object_failure(self, message: &str) -> Self {
        lock(&self.objects).push_back(MockObject::Fail(message.to_string()));
        self
    }

    /// Queue a `stream_object` reply made of these chunks.
    pub fn with_stream(self, chunks: &[&str]) -> Self {
        lock(&self.streams).push_back(MockStream::Chunks(to_strings(chunks)));
        self
    }

    /// Queue a `stream_object` call that fails before streaming.
    pub fn with_stream_failure(self, message: &str) -> Self {
        lock(&self.streams).push_back(MockStream::Fail(message.to_string()));
        self
    }

    /// Queue a stream that yields `chunks` and then breaks.
    pub fn with_broken_stream(self, chunks: &[&str], message: &str) -> Self {
        lock(&self.streams).push_back(MockStream::BreakAfter(
            to_strings(chunks),
            message.to_string(),
        ));
        self
    }

    /// Every request received, in order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        lock(&self.calls).clone()
    }

    pub fn generate_calls(&self) -> usize {
        self.count(CallKind::Generate)
    }

    pub fn stream_calls(&self) -> usize {
        self.count(CallKind::Stream)
    }

    pub fn total_calls(&self) -> usize {
        lock(&self.calls).len()
    }

    fn count(&self, kind: CallKind) -> usize {
        lock(&self.calls).iter().filter(|c| c.kind == kind).count()
    }

    fn record(&self, kind: CallKind, request: ObjectRequest) {
        lock(&self.calls).push(RecordedCall { kind, request });
    }
}

fn to_strings(chunks: &[&str]) -> Vec<String> {
    chunks.iter().map(|c| c.to_string()).collect()
}

#[async_trait]
impl StructuredModel for MockModel {
    async fn generate_object(&self, request: ObjectRequest) -> Result<Value, ModelError> {
        self.record(CallKind::Generate, request);
        let next = lock(&self.objects).pop_front();
        match next {
            Some(MockObject::Reply(value)) => Ok(value),
            Some(MockObject::Fail(message)) => Err(ModelError::Unavailable(message)),
            None => Err(ModelError::Unavailable("no scripted reply".into())),
        }
    }

    async fn stream_object(&self, request: ObjectRequest) -> Result<TextStream, ModelError> {
        self.record(CallKind::Stream, request);
        let next = lock(&self.streams).pop_front();
        let items: Vec<Result<String, ModelError>> = match next {
            Some(MockStream::Chunks(chunks)) => chunks.into_iter().map(Ok).collect(),
            Some(MockStream::BreakAfter(chunks, message)) => chunks
                .into_iter()
                .map(Ok)
                .chain(std::iter::once(Err(ModelError::Unavailable(message))))
                .collect(),
            Some(MockStream::Fail(message)) => return Err(ModelError::Unavailable(message)),
            None => return Err(ModelError::Unavailable("no scripted stream".into())),
        };
        Ok(Box::pin(futures::stream::iter(items)))
    }

    fn name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    #[tokio::test]
    async fn test_replies_in_order_then_fails() {
        let model = MockModel::new()
            .with_object(MockModel::approve())
            .with_object_failure("down");
        let request = ObjectRequest::new("m", json!({}));

        assert!(model.generate_object(request.clone()).await.is_ok());
        assert!(model.generate_object(request.clone()).await.is_err());
        assert!(model.generate_object(request).await.is_err());
        assert_eq!(model.generate_calls(), 3);
        assert_eq!(model.stream_calls(), 0);
    }

    #[tokio::test]
    async fn test_broken_stream() {
        let model = MockModel::new().with_broken_stream(&["a", "b"], "reset");
        let stream = model
            .stream_object(ObjectRequest::new("m", json!({})))
            .await
            .unwrap();
        let items: Vec<_> = stream.collect().await;
        assert_eq!(items.len(), 3);
        assert!(items[2].is_err());
        assert_eq!(model.calls()[0].kind, CallKind::Stream);
    }
}
