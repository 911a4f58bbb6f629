//! Public entry for the mr-reviewer pipeline.
//!
//! One review run for a merge request:
//!
//! 1) **Connect**: authenticate against GitLab and resolve the project
//! 2) **Fetch**: title (unless supplied) and the per-file unified diff
//! 3) **Prompt**: table-definition rules + MR info + diff
//! 4) **Generate**: one non-streaming Ollama call
//! 5) **Publish**: one note on the MR (review or warning)
//!
//! The pipeline uses `tracing` for logging and avoids `async-trait` and heap
//! trait objects. Collaborators are plain generics over the traits in
//! [`review::ports`].

pub mod errors;
pub mod git_providers;
pub mod review;

use std::sync::Arc;

use tracing::{info, instrument};

use ai_llm_service::OllamaService;
use errors::MrResult;
use git_providers::{ChangeRequestRef, GitLabClient, ProviderConfig};
use review::{ReviewLedger, ReviewOrchestrator, ReviewOutcome, RuleSet};

/// Long-lived reviewer shared by all requests.
///
/// Cheap to share behind an `Arc`; every run opens its own project handle.
#[derive(Debug)]
pub struct Reviewer {
    provider: ProviderConfig,
    generator: OllamaService,
    rules: RuleSet,
    ledger: Arc<ReviewLedger>,
}

impl Reviewer {
    pub fn new(
        provider: ProviderConfig,
        generator: OllamaService,
        rules: RuleSet,
        ledger: Arc<ReviewLedger>,
    ) -> Self {
        Self {
            provider,
            generator,
            rules,
            ledger,
        }
    }

    /// Model name used for generation and shown in posted notes.
    pub fn model(&self) -> &str {
        self.generator.model()
    }

    /// Checks the configured token with the host. Called once at startup.
    pub async fn verify_access(&self) -> MrResult<String> {
        let client = GitLabClient::new(&self.provider)?;
        let username = client.authenticate().await?;
        info!(%username, "authenticated with GitLab");
        Ok(username)
    }

    /// Runs one review.
    ///
    /// `Err` means the project could not be reached at all. Every later
    /// failure is reported inside [`ReviewOutcome::Error`].
    #[instrument(skip_all, fields(project = %target.project, iid = target.iid))]
    pub async fn review(&self, target: &ChangeRequestRef) -> MrResult<ReviewOutcome> {
        let project = GitLabClient::connect(&self.provider, &target.project).await?;
        let outcome = ReviewOrchestrator::new(
            &project,
            &self.generator,
            &self.rules,
            self.generator.model(),
            &self.ledger,
        )
        .run(target.iid, target.title.as_deref())
        .await;
        info!(outcome = ?outcome, "review finished");
        Ok(outcome)
    }
}

// -----------------------------------------------------------------------------
// Convenience re-exports for downstream users
// -----------------------------------------------------------------------------
pub use errors::Error;
pub use git_providers::ProjectRef;
pub use review::parse_merge_request_url;

#[cfg(test)]
mod tests {
    use super::*;
    use ai_llm_service::{LlmModelConfig, LlmProvider};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn reviewer(gitlab: &str, ollama: &str) -> Reviewer {
        let generator = OllamaService::new(LlmModelConfig {
            provider: LlmProvider::Ollama,
            model: "llama3".into(),
            endpoint: ollama.into(),
            timeout_secs: Some(5),
        })
        .unwrap();
        Reviewer::new(
            ProviderConfig::from_host_url(gitlab, "tok"),
            generator,
            RuleSet::builtin(),
            Arc::new(ReviewLedger::default()),
        )
    }

    #[tokio::test]
    async fn unknown_project_is_reported_as_not_found() {
        let gitlab = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v4/user"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"username": "bot"})),
            )
            .mount(&gitlab)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v4/projects/404"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&gitlab)
            .await;

        let r = reviewer(&gitlab.uri(), "http://127.0.0.1:9");
        let target = ChangeRequestRef {
            project: ProjectRef::Id(404),
            iid: 1,
            title: None,
        };
        let err = r.review(&target).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn full_run_posts_review_note() {
        let gitlab = MockServer::start().await;
        let ollama = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v4/user"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"username": "bot"})),
            )
            .mount(&gitlab)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v4/projects/group%2Fschemas"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": 42,
                "path_with_namespace": "group/schemas"
            })))
            .mount(&gitlab)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v4/projects/42/merge_requests/7/diffs"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"diff": "+name: customer_orders\n", "new_path": "tables/orders.yaml"}
            ])))
            .mount(&gitlab)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/v4/projects/42/merge_requests/7/notes"))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({"id": 900})))
            .expect(1)
            .mount(&gitlab)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"response": "Action: APPROVE"})),
            )
            .mount(&ollama)
            .await;

        let r = reviewer(&gitlab.uri(), &ollama.uri());
        let target = ChangeRequestRef {
            project: ProjectRef::Path("group/schemas".into()),
            iid: 7,
            title: Some("Add orders".into()),
        };
        let outcome = r.review(&target).await.unwrap();
        assert_eq!(outcome, ReviewOutcome::Success { request_id: 7 });
    }
}
