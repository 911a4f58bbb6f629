//! Table-definition review: URL parsing, prompt assembly, the per-MR state
//! machine and the notes it leaves behind.

pub mod comment;
pub mod ledger;
pub mod orchestrator;
pub mod ports;
pub mod prompt;
pub mod rules;
pub mod url;

pub use ledger::{LedgerKey, ReviewLedger};
pub use orchestrator::{ReviewOrchestrator, ReviewOutcome, ReviewStage};
pub use ports::{ChangeRequestHost, TextGenerator};
pub use prompt::{MrInfo, build_review_prompt};
pub use rules::RuleSet;
pub use url::parse_merge_request_url;
