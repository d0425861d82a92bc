//! HTTP surface for the story generator.
//!
//! Routes:
//! - `POST /api/story` streams the opening chapter as JSON text
//! - `POST /api/story/choices` suggests what the reader can do next
//! - `GET /api/story/options` lists author styles, locations and age bands

pub mod config;
pub mod error;
pub mod routes;

use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use story_core::StoryService;

pub use config::{ConfigError, ServerConfig, DEFAULT_LOG_FILTER};
pub use error::{ApiError, ErrorBody};

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<StoryService>,
}

impl AppState {
    pub fn new(service: StoryService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/story", post(routes::create_story))
        .route("/api/story/choices", post(routes::suggest_choices))
        .route("/api/story/options", get(routes::story_options))
        .with_state(state)
}
