//! Reviews run on their own task so a dropped HTTP request does not cancel
//! an in-flight generation or note post.

use std::sync::Arc;

use mr_reviewer::{errors::MrResult, git_providers::ChangeRequestRef, review::ReviewOutcome};
use tokio::task::JoinError;

use crate::core::app_state::AppState;

/// Spawns one review and waits for it. The task keeps running to completion
/// even if the returned future is dropped.
pub async fn run_detached(
    state: Arc<AppState>,
    target: ChangeRequestRef,
) -> Result<MrResult<ReviewOutcome>, JoinError> {
    tokio::spawn(async move { state.reviewer.review(&target).await }).await
}
