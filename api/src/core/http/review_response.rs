use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use mr_reviewer::review::ReviewOutcome;
use serde::Serialize;

/// Body returned by the review and webhook endpoints.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct ReviewResponse {
    /// `success`, `skipped` or `error`.
    pub status: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mr_id: Option<u64>,
}

impl ReviewResponse {
    pub fn skipped(message: impl Into<String>, mr_id: Option<u64>) -> Self {
        Self {
            status: "skipped",
            message: message.into(),
            mr_id,
        }
    }

    /// HTTP status a manual caller gets for this body.
    pub fn manual_status(&self) -> StatusCode {
        if self.status == "error" {
            StatusCode::INTERNAL_SERVER_ERROR
        } else {
            StatusCode::OK
        }
    }

    pub fn into_response_with_status(self, status: StatusCode) -> Response {
        (status, Json(self)).into_response()
    }
}

impl From<&ReviewOutcome> for ReviewResponse {
    fn from(outcome: &ReviewOutcome) -> Self {
        let status = match outcome {
            ReviewOutcome::Success { .. } => "success",
            ReviewOutcome::Empty { .. } | ReviewOutcome::AlreadyReviewed { .. } => "skipped",
            ReviewOutcome::Error { .. } => "error",
        };
        Self {
            status,
            message: outcome.message(),
            mr_id: Some(outcome.request_id()),
        }
    }
}
