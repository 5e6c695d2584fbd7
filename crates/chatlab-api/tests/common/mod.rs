//! Shared test helpers for API integration tests.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use chatlab_core::clock::Clock;
use chatlab_core::rng::DeterministicRng;
use chatlab_core::sink::SessionSink;
use chatlab_dialogue::domain::condition::ConditionSet;
use chatlab_dialogue::domain::design::ExperimentDesign;
use chatlab_dialogue::domain::script::{Script, ScriptFormat, ScriptStore};
use chatlab_session::application::store::InMemorySessionStore;
use chatlab_test_support::{FixedClock, SequenceRng};
use http_body_util::BodyExt;
use tower::ServiceExt;

use chatlab_api::routes;
use chatlab_api::state::AppState;

/// The reference skincare-support script.
pub const GLOW_SCRIPT: &str = r#"[
    {"id": 1, "type": "message", "text": "Hi, welcome to Glow & Co. support!", "image": "assets/avatar.png"},
    {"id": 2, "type": "section_header", "text": "Part 1: About you"},
    {"id": 3, "type": "question", "text": {"High_Empathy": "How are you feeling about your skin today?", "High_Expertise": "Describe your skin type."}},
    {"id": 4, "type": "message", "text": {"High_Empathy": "Thank you for sharing.", "High_Expertise": "Noted."}},
    {"id": 5, "type": "question", "text": "Which products do you use now?"},
    {"id": 6, "type": "message", "text": "That's all, thanks!"}
]"#;

/// Fixed timestamp used across all integration tests.
fn fixed_clock() -> Arc<dyn Clock + Send + Sync> {
    Arc::new(FixedClock(
        chrono::TimeZone::with_ymd_and_hms(&chrono::Utc, 2026, 1, 15, 10, 0, 0).unwrap(),
    ))
}

/// Build the full app router over `script_json` with a deterministic
/// clock, the given assignment sequence, and `sink`. Uses the same route
/// structure as `main.rs`.
pub fn build_test_app(
    script_json: &str,
    assignments: Vec<usize>,
    sink: Arc<dyn SessionSink>,
) -> Router {
    let script = Script::parse(script_json, ScriptFormat::Json).unwrap();
    let conditions = ConditionSet::new(
        vec!["High_Empathy".to_owned(), "High_Expertise".to_owned()],
        None,
    )
    .unwrap();
    let design = Arc::new(ExperimentDesign::new(
        ScriptStore::from_script(script),
        conditions,
    ));
    let rng: Arc<Mutex<dyn DeterministicRng + Send>> =
        Arc::new(Mutex::new(SequenceRng::new(assignments)));
    let app_state = AppState::new(
        design,
        fixed_clock(),
        rng,
        Arc::new(InMemorySessionStore::new()),
        sink,
    );

    Router::new()
        .merge(routes::health::router())
        .nest("/api/v1/sessions", routes::sessions::router())
        .with_state(app_state)
}

/// Send a POST request with a JSON body and return the response.
pub async fn post_json(
    app: Router,
    uri: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}

/// Send a POST request with no body and return the response.
pub async fn post_empty(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}

/// Send a GET request and return the response.
pub async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}
