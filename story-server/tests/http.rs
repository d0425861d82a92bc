//! Router tests driven in-process with scripted model replies.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use story_core::{MockModel, StoryService};
use story_server::{router, AppState};
use tower::ServiceExt;

fn app(model: &Arc<MockModel>) -> Router {
    router(AppState::new(StoryService::new(model.clone())))
}

fn story_request() -> Value {
    json!({
        "authorStyle": {
            "id": "dr-seuss",
            "name": "Dr. Seuss",
            "description": "Whimsical rhymes",
            "examplePhrases": []
        },
        "location": {
            "id": "magical-forest",
            "name": "Enchanted Forest",
            "description": "A mystical woodland"
        },
        "userPrompt": "a bunny who learns to share",
        "targetAge": "3-5"
    })
}

fn post(uri: &str, body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(body.into())
        .unwrap()
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    post(uri, body.to_string())
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    serde_json::from_str(&body_text(response).await).unwrap()
}

#[tokio::test]
async fn test_story_streams_chapter_text() {
    let model = Arc::new(
        MockModel::new()
            .with_object(MockModel::approve())
            .with_stream(&[
                "{\"title\": \"Sharing Day\", ",
                "\"content\": \"Bunny found a basket of berries.\", ",
                "\"isConclusion\": false}",
            ]),
    );

    let response = app(&model)
        .oneshot(post_json("/api/story", &story_request()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers()[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/plain"));
    let chapter: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(chapter["title"], "Sharing Day");
    assert_eq!(chapter["isConclusion"], false);
}

#[tokio::test]
async fn test_missing_field_is_400_without_calls() {
    let model = Arc::new(MockModel::new());
    let mut body = story_request();
    body.as_object_mut().unwrap().remove("userPrompt");

    let response = app(&model)
        .oneshot(post_json("/api/story", &body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Invalid request");
    assert!(json["reason"].as_str().unwrap().contains("userPrompt"));
    assert_eq!(model.total_calls(), 0);
}

#[tokio::test]
async fn test_malformed_json_is_400() {
    let model = Arc::new(MockModel::new());
    let response = app(&model)
        .oneshot(post("/api/story", "{not json"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "Invalid request");
    assert_eq!(model.total_calls(), 0);
}

#[tokio::test]
async fn test_overlong_prompt_and_bad_age_are_400() {
    let mut long_prompt = story_request();
    long_prompt["userPrompt"] = json!("x".repeat(1001));
    let mut bad_age = story_request();
    bad_age["targetAge"] = json!("13-17");

    for body in [long_prompt, bad_age] {
        let model = Arc::new(MockModel::new());
        let response = app(&model)
            .oneshot(post_json("/api/story", &body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(model.total_calls(), 0);
    }
}

#[tokio::test]
async fn test_unknown_reference_is_400() {
    let model = Arc::new(MockModel::new());
    let mut body = story_request();
    body["location"]["id"] = json!("atlantis");

    let response = app(&model)
        .oneshot(post_json("/api/story", &body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await,
        json!({"error": "Invalid author style or location"})
    );
    assert_eq!(model.total_calls(), 0);
}

#[tokio::test]
async fn test_safety_rejection_is_400_with_reason() {
    let model = Arc::new(MockModel::new().with_object(MockModel::reject("Contains violence")));

    let response = app(&model)
        .oneshot(post_json("/api/story", &story_request()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await,
        json!({
            "error": "Content not appropriate for children",
            "reason": "Contains violence"
        })
    );
    assert_eq!(model.stream_calls(), 0);
}

#[tokio::test]
async fn test_upstream_failure_is_500() {
    let model = Arc::new(
        MockModel::new()
            .with_object(MockModel::approve())
            .with_stream_failure("service unavailable"),
    );

    let response = app(&model)
        .oneshot(post_json("/api/story", &story_request()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(response).await;
    assert!(json["error"].as_str().unwrap().contains("service unavailable"));
}

#[tokio::test]
async fn test_choices_endpoint() {
    let model = Arc::new(MockModel::new().with_object(json!({
        "choices": [{"text": "Follow the butterfly"}, {"text": "Go home for lunch"}]
    })));
    let body = json!({
        "config": story_request(),
        "chapter": {"title": "Sharing Day", "content": "Bunny found berries."}
    });

    let response = app(&model)
        .oneshot(post_json("/api/story/choices", &body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["choices"].as_array().unwrap().len(), 2);
    assert_eq!(json["choices"][0]["text"], "Follow the butterfly");
}

#[tokio::test]
async fn test_choices_missing_chapter_is_400() {
    let model = Arc::new(MockModel::new());
    let response = app(&model)
        .oneshot(post_json("/api/story/choices", &json!({"config": story_request()})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(model.total_calls(), 0);
}

#[tokio::test]
async fn test_options_endpoint() {
    let model = Arc::new(MockModel::new());

    let response = app(&model)
        .oneshot(
            Request::builder()
                .uri("/api/story/options?targetAge=6-8")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["authorStyles"].as_array().unwrap().len(), 5);
    assert_eq!(json["ageBands"], json!(["3-5", "6-8", "9-12"]));
    assert_eq!(json["defaults"]["authorStyle"], "dr-seuss");
    assert_eq!(json["limits"]["maxChoices"], 4);
    assert!(json["sensitiveTopics"].as_array().unwrap().len() > 0);

    let response = app(&model)
        .oneshot(
            Request::builder()
                .uri("/api/story/options?targetAge=99")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
