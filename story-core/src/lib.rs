//! Children's story generation pipeline.
//!
//! This crate provides:
//! - Static catalogs of author styles, locations and age guidelines
//! - Request validation that reports every offending field
//! - A fail-closed safety gate backed by a structured-output model
//! - Deterministic prompt composition
//! - Streaming chapter dispatch
//!
//! # Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use story_core::{GeminiModel, StoryService};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let service = StoryService::new(Arc::new(GeminiModel::from_env()?));
//!     let body = serde_json::from_str(include_str!("request.json"))?;
//!     let mut chapter = service.start_story(&body).await?;
//!     while let Some(chunk) = chapter.next().await {
//!         print!("{}", chunk?);
//!     }
//!     Ok(())
//! }
//! ```

pub mod catalog;
pub mod choices;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod model;
pub mod pipeline;
pub mod prompt;
pub mod provider;
pub mod safety;
pub mod schema;
pub mod testing;
pub mod validation;

// Primary public API
pub use catalog::{AgeGuidelines, ReferenceNotFound, StoryOptions};
pub use error::{Stage, StoryError};
pub use model::{ModelError, ModelMessage, ObjectRequest, StructuredModel, TextStream};
pub use pipeline::StoryService;
pub use provider::GeminiModel;
pub use safety::{SafetyGate, SAFETY_FALLBACK_REASON};
pub use schema::{
    AgeBand, AuthorStyle, ChapterGeneration, ChoiceGeneration, Location, SafetyValidation,
    StoryConfig,
};
pub use testing::MockModel;
pub use validation::{parse_body, ValidationError};
