//! Handler-test helpers: state wired to local mock servers.

use std::{sync::Arc, time::Duration};

use axum::{http::StatusCode, response::Response};
use serde_json::{Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::core::app_state::{AppConfig, AppState};

/// Nothing listens on the discard port, so every outbound call fails fast.
const CLOSED: &str = "http://127.0.0.1:9";

pub(crate) fn test_state(webhook_secret: Option<&str>) -> Arc<AppState> {
    state_with(CLOSED, CLOSED, webhook_secret)
}

/// State whose GitLab and Ollama clients point at the given base URLs.
pub(crate) fn state_with(gitlab: &str, ollama: &str, webhook_secret: Option<&str>) -> Arc<AppState> {
    let mut vars = vec![
        ("OLLAMA_URL", ollama.to_string()),
        ("OLLAMA_MODEL", "llama3".to_string()),
        ("GITLAB_URL", gitlab.to_string()),
        ("GITLAB_TOKEN", "glpat-test".to_string()),
    ];
    if let Some(secret) = webhook_secret {
        vars.push(("WEBHOOK_SECRET", secret.to_string()));
    }
    let config = AppConfig::from_lookup(|key| {
        vars.iter().find(|(k, _)| *k == key).map(|(_, v)| v.clone())
    })
    .unwrap();
    AppState::build(config).unwrap()
}

/// `GET /user` plus the project lookup under `segment` (`42` or `team%2Fproj`).
pub(crate) async fn mount_project(server: &MockServer, segment: &str, id: u64) {
    Mock::given(method("GET"))
        .and(path("/api/v4/user"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "username": "bot" })))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/api/v4/projects/{segment}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": id,
            "path_with_namespace": "team/proj",
        })))
        .mount(server)
        .await;
}

pub(crate) async fn mount_merge_request(server: &MockServer, id: u64, iid: u64, title: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/api/v4/projects/{id}/merge_requests/{iid}")))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "iid": iid, "title": title })),
        )
        .mount(server)
        .await;
}

pub(crate) async fn mount_diff(server: &MockServer, id: u64, iid: u64, files: Value) {
    Mock::given(method("GET"))
        .and(path(format!("/api/v4/projects/{id}/merge_requests/{iid}/diffs")))
        .respond_with(ResponseTemplate::new(200).set_body_json(files))
        .mount(server)
        .await;
}

pub(crate) async fn mount_note(server: &MockServer, id: u64, iid: u64) {
    Mock::given(method("POST"))
        .and(path(format!("/api/v4/projects/{id}/merge_requests/{iid}/notes")))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": 900 })))
        .mount(server)
        .await;
}

/// Ollama answering `text` after `delay`.
pub(crate) async fn mount_generate(server: &MockServer, text: &str, delay: Duration) {
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "response": text, "done": true }))
                .set_delay(delay),
        )
        .mount(server)
        .await;
}

/// Number of note posts the GitLab mock has received.
pub(crate) async fn notes_posted(server: &MockServer) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|r| r.method.as_str() == "POST" && r.url.path().ends_with("/notes"))
        .count()
}

/// Polls until `want` notes were posted or `within` elapses.
pub(crate) async fn wait_for_notes(server: &MockServer, want: usize, within: Duration) -> usize {
    let deadline = tokio::time::Instant::now() + within;
    loop {
        let seen = notes_posted(server).await;
        if seen >= want || tokio::time::Instant::now() >= deadline {
            return seen;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
}

pub(crate) async fn read_json(resp: Response) -> (StatusCode, Value) {
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}
