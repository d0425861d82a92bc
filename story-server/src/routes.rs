//! HTTP handlers for the story API.

use crate::error::ApiError;
use crate::AppState;
use axum::body::{Body, Bytes};
use axum::extract::{Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use futures::{future, StreamExt, TryStreamExt};
use serde::Deserialize;
use story_core::catalog::StoryOptions;
use story_core::schema::ChoiceGeneration;
use story_core::{parse_body, TextStream};
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

/// Start a story: validate, gate, then stream the first chapter as raw JSON text.
pub async fn create_story(State(state): State<AppState>, body: Bytes) -> Response {
    let request_id = Uuid::new_v4();
    let span = info_span!("story_request", %request_id, route = "/api/story");

    async move {
        info!(bytes = body.len(), "story request received");
        let result = async {
            let body = parse_body(&body)?;
            let stream = state.service.start_story(&body).await?;
            Ok::<_, ApiError>(stream)
        }
        .await;

        match result {
            Ok(stream) => text_stream_response(stream),
            Err(err) => {
                err.log();
                err.into_response()
            }
        }
    }
    .instrument(span)
    .await
}

/// Suggest reader choices for a finished chapter.
pub async fn suggest_choices(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ChoiceGeneration>, ApiError> {
    let request_id = Uuid::new_v4();
    let span = info_span!("choices_request", %request_id, route = "/api/story/choices");

    async move {
        let body = parse_body(&body)?;
        Ok(Json(state.service.suggest_choices(&body).await?))
    }
    .instrument(span)
    .await
    .inspect_err(ApiError::log)
}

#[derive(Debug, Default, Deserialize)]
pub struct OptionsQuery {
    #[serde(rename = "targetAge")]
    pub target_age: Option<String>,
}

/// Catalog listing for building a request.
pub async fn story_options(
    State(state): State<AppState>,
    Query(query): Query<OptionsQuery>,
) -> Result<Json<StoryOptions>, ApiError> {
    state
        .service
        .options(query.target_age.as_deref())
        .map(Json)
        .map_err(ApiError::from)
}

/// Chunks go out as they arrive. A mid-stream failure ends the body early;
/// it has already been logged by the dispatcher.
fn text_stream_response(stream: TextStream) -> Response {
    let chunks = stream
        .take_while(|chunk| future::ready(chunk.is_ok()))
        .map_ok(Bytes::from);

    (
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        Body::from_stream(chunks),
    )
        .into_response()
}
