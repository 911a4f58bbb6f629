use std::sync::Arc;

use axum::{
    extract::{Query, State, rejection::QueryRejection},
    response::Response,
};
use mr_reviewer::{ProjectRef, git_providers::ChangeRequestRef, parse_merge_request_url};
use tracing::{info, instrument, warn};

use crate::{
    core::{app_state::AppState, http::review_response::ReviewResponse, review_task::run_detached},
    error_handler::{AppError, AppResult},
    routes::review::review_request::ReviewRequest,
};

const URL_HINT: &str = "Invalid GitLab MR URL. Expected format: \
                        https://gitlab.com/group/project/-/merge_requests/123";

/// GET|POST /review?pr_url=...
///
/// Reviews the merge request behind a web URL and waits for the result. The
/// review runs on a detached task and finishes even if the caller hangs up.
/// 200 on success or skip, 400 on an unparseable URL, 404 when the project
/// cannot be resolved, 500 on any later failure.
#[instrument(name = "review_route", skip_all)]
pub async fn review_route(
    State(state): State<Arc<AppState>>,
    query: Result<Query<ReviewRequest>, QueryRejection>,
) -> AppResult<Response> {
    let Query(req) = query?;
    info!(pr_url = %req.pr_url, "manual review requested");

    let (path, iid) =
        parse_merge_request_url(&req.pr_url).ok_or_else(|| AppError::BadRequest(URL_HINT.into()))?;

    let target = ChangeRequestRef {
        project: ProjectRef::Path(path.clone()),
        iid,
        title: None,
    };

    let outcome = match run_detached(Arc::clone(&state), target).await? {
        Ok(outcome) => outcome,
        Err(e) if e.is_not_found() => {
            warn!(project = %path, error = %e, "project not reachable");
            return Err(AppError::NotFound(format!(
                "Project not found: {path}. Check project path and access token."
            )));
        }
        Err(e) => return Err(e.into()),
    };

    let body = ReviewResponse::from(&outcome);
    let status = body.manual_status();
    Ok(body.into_response_with_status(status))
}
