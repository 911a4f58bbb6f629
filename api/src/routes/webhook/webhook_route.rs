use std::sync::Arc;

use axum::{
    extract::{Json, State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode},
    response::Response,
};
use sha2::{Digest, Sha256};
use tracing::{info, instrument, warn};

use crate::{
    core::{app_state::AppState, http::review_response::ReviewResponse},
    error_handler::{AppError, AppResult},
    routes::webhook::{
        intake::{IntakeResult, handle_event},
        webhook_payload::WebhookPayload,
    },
};

/// Header GitLab uses to send the configured webhook secret (`X-Gitlab-Token`).
pub const TOKEN_HEADER: &str = "x-gitlab-token";

/// POST /webhook/gitlab
///
/// Verifies the shared secret (when one is configured), filters the event and
/// runs at most one review on a detached task, so a sender that hangs up does
/// not cancel it. Business failures are answered with 200 and the
/// status in the body; malformed payloads get 400.
#[instrument(name = "gitlab_webhook_route", skip_all)]
pub async fn gitlab_webhook_route(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Result<Json<WebhookPayload>, JsonRejection>,
) -> AppResult<Response> {
    if let Some(secret) = state.webhook_secret.as_deref() {
        let provided = headers.get(TOKEN_HEADER).and_then(|v| v.to_str().ok());
        if !token_matches(provided, secret) {
            warn!("webhook rejected: invalid or missing {TOKEN_HEADER}");
            return Err(AppError::Unauthorized);
        }
    }

    let Json(payload) = body?;
    info!(kind = payload.kind().unwrap_or("unknown"), "received webhook");

    let result = handle_event(&state, &payload, state.default_project.as_ref())
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let body = match &result {
        IntakeResult::Skipped(reason) => ReviewResponse::skipped(reason.message(), reason.iid()),
        IntakeResult::Reviewed(outcome) => ReviewResponse::from(outcome),
    };
    Ok(body.into_response_with_status(StatusCode::OK))
}

/// Compares SHA-256 digests so timing does not depend on the secret's content.
fn token_matches(provided: Option<&str>, expected: &str) -> bool {
    let Some(provided) = provided.map(str::trim).filter(|v| !v.is_empty()) else {
        return false;
    };
    constant_time_eq(
        Sha256::digest(provided.as_bytes()).as_slice(),
        Sha256::digest(expected.as_bytes()).as_slice(),
    )
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{
        mount_diff, mount_generate, mount_note, mount_project, notes_posted, state_with,
        test_state, wait_for_notes,
    };
    use axum::{http::HeaderValue, response::IntoResponse};
    use serde_json::json;
    use std::time::Duration;
    use wiremock::MockServer;

    async fn call(
        state: Arc<AppState>,
        headers: HeaderMap,
        json: &str,
    ) -> (StatusCode, serde_json::Value) {
        let payload: WebhookPayload = serde_json::from_str(json).unwrap();
        let resp = gitlab_webhook_route(State(state), headers, Ok(Json(payload)))
            .await
            .into_response();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    const CLOSE_EVENT: &str = r#"{"object_kind":"merge_request","project":{"id":3},
        "object_attributes":{"iid":12,"action":"merge"}}"#;

    #[test]
    fn token_comparison() {
        assert!(token_matches(Some("s3cret"), "s3cret"));
        assert!(token_matches(Some(" s3cret "), "s3cret"));
        assert!(!token_matches(Some("s3cre"), "s3cret"));
        assert!(!token_matches(Some(""), "s3cret"));
        assert!(!token_matches(None, "s3cret"));
    }

    #[tokio::test]
    async fn wrong_token_is_rejected() {
        let mut headers = HeaderMap::new();
        headers.insert(TOKEN_HEADER, HeaderValue::from_static("wrong"));

        let (status, body) = call(test_state(Some("s3cret")), headers, CLOSE_EVENT).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "UNAUTHORIZED");
    }

    #[tokio::test]
    async fn missing_token_is_rejected_when_secret_is_set() {
        let (status, _) = call(test_state(Some("s3cret")), HeaderMap::new(), CLOSE_EVENT).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn matching_token_passes_to_intake() {
        let mut headers = HeaderMap::new();
        headers.insert(TOKEN_HEADER, HeaderValue::from_static("s3cret"));

        let (status, body) = call(test_state(Some("s3cret")), headers, CLOSE_EVENT).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "skipped");
        assert_eq!(body["message"], "Skipped MR 12 - action: merge");
        assert_eq!(body["mr_id"], 12);
    }

    #[tokio::test]
    async fn no_secret_configured_accepts_any_caller() {
        let (status, body) = call(
            test_state(None),
            HeaderMap::new(),
            r#"{"object_kind":"pipeline"}"#,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Event type pipeline not processed");
    }

    #[tokio::test]
    async fn missing_iid_is_bad_request() {
        let (status, body) = call(
            test_state(None),
            HeaderMap::new(),
            r#"{"object_kind":"merge_request","project":{"id":3},"object_attributes":{"action":"open"}}"#,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Missing merge request ID");
    }

    #[tokio::test]
    async fn unreachable_gitlab_is_acknowledged_with_error_body() {
        let (status, body) = call(
            test_state(None),
            HeaderMap::new(),
            r#"{"object_kind":"merge_request","project":{"id":3},
                "object_attributes":{"iid":5,"action":"open","title":"t"}}"#,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "error");
        assert_eq!(body["mr_id"], 5);
    }

    const OPEN_EVENT: &str = r#"{"object_kind":"merge_request","project":{"id":3},
        "object_attributes":{"iid":5,"action":"open","title":"Add orders table"}}"#;

    async fn gitlab_with_mr() -> MockServer {
        let gitlab = MockServer::start().await;
        mount_project(&gitlab, "3", 3).await;
        mount_diff(&gitlab, 3, 5, json!([{ "diff": "+name: orders\n" }])).await;
        mount_note(&gitlab, 3, 5).await;
        gitlab
    }

    #[tokio::test]
    async fn open_event_is_reviewed_end_to_end() {
        let gitlab = gitlab_with_mr().await;
        let ollama = MockServer::start().await;
        mount_generate(&ollama, "Looks fine.", Duration::ZERO).await;
        let mut headers = HeaderMap::new();
        headers.insert(TOKEN_HEADER, HeaderValue::from_static("s3cret"));

        let (status, body) = call(
            state_with(&gitlab.uri(), &ollama.uri(), Some("s3cret")),
            headers,
            OPEN_EVENT,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "success");
        assert_eq!(body["message"], "Review completed for MR 5");
        assert_eq!(body["mr_id"], 5);
        assert_eq!(notes_posted(&gitlab).await, 1);
    }

    #[tokio::test]
    async fn review_survives_sender_hanging_up() {
        let gitlab = gitlab_with_mr().await;
        let ollama = MockServer::start().await;
        mount_generate(&ollama, "Looks fine.", Duration::from_millis(600)).await;
        let state = state_with(&gitlab.uri(), &ollama.uri(), None);
        let payload: WebhookPayload = serde_json::from_str(OPEN_EVENT).unwrap();

        let request = gitlab_webhook_route(State(state), HeaderMap::new(), Ok(Json(payload)));
        let dropped = tokio::time::timeout(Duration::from_millis(150), request).await;
        assert!(dropped.is_err());

        assert_eq!(wait_for_notes(&gitlab, 1, Duration::from_secs(5)).await, 1);
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(notes_posted(&gitlab).await, 1);
    }
}
