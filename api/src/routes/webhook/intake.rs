//! Event intake: decides whether a webhook event starts a review.
//!
//! Only merge-request events with an `open`, `update` or `reopen` action are
//! reviewed. Everything else is skipped without touching GitLab.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use mr_reviewer::{
    ProjectRef,
    errors::MrResult,
    git_providers::ChangeRequestRef,
    review::ReviewOutcome,
};
use thiserror::Error;
use tracing::{error, info, instrument, warn};

use super::webhook_payload::WebhookPayload;
use crate::core::{app_state::AppState, review_task::run_detached};

/// Event kinds that describe a merge request.
pub const MERGE_REQUEST_KINDS: [&str; 2] = ["merge_request", "Merge Request Hook"];

/// Merge request actions that trigger a review.
pub const REVIEWED_ACTIONS: [&str; 3] = ["open", "update", "reopen"];

/// Why an event did not start a review.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    UnhandledEventKind(Option<String>),
    Action { iid: Option<u64>, action: String },
}

impl SkipReason {
    /// MR id the skipped event referred to, if any.
    pub fn iid(&self) -> Option<u64> {
        match self {
            SkipReason::UnhandledEventKind(_) => None,
            SkipReason::Action { iid, .. } => *iid,
        }
    }

    /// Message returned to the webhook sender.
    pub fn message(&self) -> String {
        match self {
            SkipReason::UnhandledEventKind(kind) => format!(
                "Event type {} not processed",
                kind.as_deref().unwrap_or("unknown")
            ),
            SkipReason::Action { iid, action } => match iid {
                Some(iid) => format!("Skipped MR {iid} - action: {action}"),
                None => format!("Skipped MR - action: {action}"),
            },
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::UnhandledEventKind(_) => f.write_str("unhandled-event-kind"),
            SkipReason::Action { action, .. } => write!(f, "action:{action}"),
        }
    }
}

/// Malformed events. These are answered with 400.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IntakeError {
    #[error("Missing merge request ID")]
    MissingIid,
    #[error("Missing project ID and no default project is configured")]
    MissingProject,
}

/// What the filter decided for one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Review(ChangeRequestRef),
    Skip(SkipReason),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntakeResult {
    Reviewed(ReviewOutcome),
    Skipped(SkipReason),
}

/// Something that can run one review.
pub trait ReviewRunner: Send + Sync {
    fn run_review(
        &self,
        target: &ChangeRequestRef,
    ) -> impl Future<Output = MrResult<ReviewOutcome>> + Send;
}

/// Runs the review on a detached task. Dropping the returned future leaves
/// the review running; a panicked task becomes an `Error` outcome.
impl ReviewRunner for Arc<AppState> {
    fn run_review(
        &self,
        target: &ChangeRequestRef,
    ) -> impl Future<Output = MrResult<ReviewOutcome>> + Send {
        let state = Arc::clone(self);
        let target = target.clone();
        async move {
            let request_id = target.iid;
            match run_detached(state, target).await {
                Ok(res) => res,
                Err(e) => {
                    error!(request_id, error = %e, "review task failed");
                    Ok(ReviewOutcome::Error {
                        request_id,
                        message: format!("Review task failed: {e}"),
                    })
                }
            }
        }
    }
}

/// Pure filtering step. The action check runs before the iid check, so a
/// closed MR without an iid is still a skip.
pub fn classify(
    payload: &WebhookPayload,
    default_project: Option<&ProjectRef>,
) -> Result<Decision, IntakeError> {
    let kind = payload.kind();
    if !kind.is_some_and(|k| MERGE_REQUEST_KINDS.contains(&k)) {
        return Ok(Decision::Skip(SkipReason::UnhandledEventKind(
            kind.map(str::to_string),
        )));
    }

    let mr = payload.merge_request();
    let iid = mr.and_then(|m| m.iid);
    let action = mr.and_then(|m| m.action.as_deref()).unwrap_or_default();
    if !REVIEWED_ACTIONS.contains(&action) {
        return Ok(Decision::Skip(SkipReason::Action {
            iid,
            action: action.to_string(),
        }));
    }

    let iid = iid.filter(|&i| i > 0).ok_or(IntakeError::MissingIid)?;
    let project = payload
        .project_id()
        .map(ProjectRef::Id)
        .or_else(|| default_project.cloned())
        .ok_or(IntakeError::MissingProject)?;

    Ok(Decision::Review(ChangeRequestRef {
        project,
        iid,
        title: mr
            .and_then(|m| m.title.clone())
            .filter(|t| !t.trim().is_empty()),
    }))
}

/// Filters the event and, when it qualifies, runs exactly one review.
///
/// A project that cannot be reached is reported as an `Error` outcome, not as
/// an intake error: the sender still gets a 200.
#[instrument(skip_all, fields(kind = payload.kind().unwrap_or("unknown")))]
pub async fn handle_event<R: ReviewRunner>(
    runner: &R,
    payload: &WebhookPayload,
    default_project: Option<&ProjectRef>,
) -> Result<IntakeResult, IntakeError> {
    let target = match classify(payload, default_project)? {
        Decision::Skip(reason) => {
            info!(%reason, "event skipped");
            return Ok(IntakeResult::Skipped(reason));
        }
        Decision::Review(target) => target,
    };

    info!(project = %target.project, iid = target.iid, "processing merge request event");
    let outcome = match runner.run_review(&target).await {
        Ok(outcome) => outcome,
        Err(e) => {
            warn!(project = %target.project, error = %e, "could not reach project");
            ReviewOutcome::Error {
                request_id: target.iid,
                message: format!("Failed to connect to GitLab project {}: {e}", target.project),
            }
        }
    };
    Ok(IntakeResult::Reviewed(outcome))
}
