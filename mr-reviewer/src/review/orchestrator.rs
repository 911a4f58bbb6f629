//! Review state machine for one merge request.
//!
//! ```text
//! Start → DiffFetched → PromptBuilt → Generated → CommentPosted   (Success)
//!   │          │                          │
//!   │          ├─ empty diff ───────────► Empty
//!   │          └─ seen revision ────────► AlreadyReviewed
//!   └─ any failure ─────────────────────► Error
//! ```
//!
//! A failed generation still posts a warning note before ending in `Error`.
//! A note is posted at most once per run and never partially.

use std::fmt;

use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::review::comment::{success_comment, warning_comment};
use crate::review::ledger::{LedgerKey, ReviewLedger};
use crate::review::ports::{ChangeRequestHost, TextGenerator};
use crate::review::prompt::{MrInfo, build_review_prompt};
use crate::review::rules::RuleSet;
use ai_llm_service::GenerationResult;

/// Terminal result of one orchestration run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ReviewOutcome {
    /// Review generated and posted.
    Success { request_id: u64 },
    /// Nothing to review; nothing was generated or posted.
    Empty { request_id: u64 },
    /// This exact diff revision was already reviewed recently.
    AlreadyReviewed { request_id: u64 },
    /// The run failed; a warning note may have been posted.
    Error { request_id: u64, message: String },
}

impl ReviewOutcome {
    pub fn request_id(&self) -> u64 {
        match self {
            ReviewOutcome::Success { request_id }
            | ReviewOutcome::Empty { request_id }
            | ReviewOutcome::AlreadyReviewed { request_id }
            | ReviewOutcome::Error { request_id, .. } => *request_id,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, ReviewOutcome::Error { .. })
    }

    /// One-line summary for API responses and logs.
    pub fn message(&self) -> String {
        match self {
            ReviewOutcome::Success { request_id } => format!("Review completed for MR {request_id}"),
            ReviewOutcome::Empty { request_id } => format!("No changes found in MR {request_id}"),
            ReviewOutcome::AlreadyReviewed { request_id } => {
                format!("MR {request_id} was already reviewed at this revision")
            }
            ReviewOutcome::Error { message, .. } => message.clone(),
        }
    }
}

/// Progress marker, used in logs and error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewStage {
    Start,
    DiffFetched,
    PromptBuilt,
    Generated,
    CommentPosted,
}

impl fmt::Display for ReviewStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ReviewStage::Start => "start",
            ReviewStage::DiffFetched => "diff_fetched",
            ReviewStage::PromptBuilt => "prompt_built",
            ReviewStage::Generated => "generated",
            ReviewStage::CommentPosted => "comment_posted",
        };
        f.write_str(s)
    }
}

/// Drives one review against borrowed collaborators.
pub struct ReviewOrchestrator<'a, H, G> {
    host: &'a H,
    generator: &'a G,
    rules: &'a RuleSet,
    model: &'a str,
    ledger: &'a ReviewLedger,
}

impl<'a, H, G> ReviewOrchestrator<'a, H, G>
where
    H: ChangeRequestHost,
    G: TextGenerator,
{
    pub fn new(
        host: &'a H,
        generator: &'a G,
        rules: &'a RuleSet,
        model: &'a str,
        ledger: &'a ReviewLedger,
    ) -> Self {
        Self {
            host,
            generator,
            rules,
            model,
            ledger,
        }
    }

    /// Runs the review for merge request `iid`.
    ///
    /// `title` skips the metadata lookup when the caller already has it.
    #[instrument(skip_all, fields(project = self.host.project_id(), iid = iid))]
    pub async fn run(&self, iid: u64, title: Option<&str>) -> ReviewOutcome {
        let mut stage = ReviewStage::Start;

        let title = match title.map(str::trim).filter(|t| !t.is_empty()) {
            Some(t) => t.to_string(),
            None => match self.host.get_change_request(iid).await {
                Ok(mr) => mr.title,
                Err(e) => {
                    warn!(error = %e, %stage, "merge request lookup failed");
                    return fail(iid, format!("Failed to fetch MR {iid}: {e}"));
                }
            },
        };

        let diff = match self.host.get_diff(iid).await {
            Ok(d) => d,
            Err(e) => {
                warn!(error = %e, %stage, "diff fetch failed");
                return fail(iid, format!("Failed to fetch MR diff: {e}"));
            }
        };
        if diff.is_empty() {
            info!("no diff found; nothing to review");
            return ReviewOutcome::Empty { request_id: iid };
        }
        stage = ReviewStage::DiffFetched;
        debug!(%stage, files = diff.fragment_count(), "diff fetched");

        let key = LedgerKey {
            project: self.host.project_id(),
            iid,
            diff_digest: diff.digest(),
        };
        if self.ledger.contains(&key) {
            info!(digest = %key.diff_digest, "revision already reviewed");
            return ReviewOutcome::AlreadyReviewed { request_id: iid };
        }

        let diff_text = diff.to_prompt_text();
        let prompt = build_review_prompt(
            self.rules,
            &diff_text,
            &MrInfo {
                title: &title,
                iid,
            },
        );
        stage = ReviewStage::PromptBuilt;
        debug!(%stage, prompt_chars = prompt.len(), "prompt ready");

        info!(model = %self.model, "calling generation backend");
        let generated = self.generator.generate(&prompt, self.model).await;
        stage = ReviewStage::Generated;

        let review = match generated {
            GenerationResult::Text(text) => text,
            failure => {
                let message = failure
                    .failure_message()
                    .unwrap_or_else(|| "Generation failed".to_string());
                warn!(%stage, %message, "generation failed; posting warning note");
                if let Err(e) = self.host.post_comment(iid, &warning_comment(&message)).await {
                    warn!(error = %e, "warning note could not be posted");
                }
                return fail(iid, message);
            }
        };

        if !self.ledger.record_if_new(&key) {
            info!(digest = %key.diff_digest, "concurrent run already delivered this revision");
            return ReviewOutcome::AlreadyReviewed { request_id: iid };
        }

        match self
            .host
            .post_comment(iid, &success_comment(self.model, &review))
            .await
        {
            Ok(note_id) => {
                stage = ReviewStage::CommentPosted;
                info!(%stage, note_id, "review posted");
                ReviewOutcome::Success { request_id: iid }
            }
            Err(e) => {
                self.ledger.release(&key);
                warn!(error = %e, %stage, "posting review failed");
                fail(iid, format!("Failed to post comment: {e}"))
            }
        }
    }
}

fn fail(request_id: u64, message: String) -> ReviewOutcome {
    ReviewOutcome::Error {
        request_id,
        message,
    }
}
