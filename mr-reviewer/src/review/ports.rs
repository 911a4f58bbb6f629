//! Seams between the orchestrator and its remote collaborators.
//!
//! Plain `impl Future + Send` return types, no `async-trait` and no boxing.
//! Production code plugs in [`GitLabProject`] and [`OllamaService`]; tests
//! plug in in-memory fakes.

use std::future::Future;

use ai_llm_service::{GenerationResult, OllamaService};

use crate::errors::MrResult;
use crate::git_providers::{ChangeRequest, DiffText, GitLabProject};

/// Repository host operations, bound to one resolved project.
pub trait ChangeRequestHost: Send + Sync {
    /// Numeric id of the bound project.
    fn project_id(&self) -> u64;

    fn get_change_request(&self, iid: u64)
    -> impl Future<Output = MrResult<ChangeRequest>> + Send;

    fn get_diff(&self, iid: u64) -> impl Future<Output = MrResult<DiffText>> + Send;

    /// Posts one note; returns the host's note id.
    fn post_comment(&self, iid: u64, body: &str) -> impl Future<Output = MrResult<u64>> + Send;
}

/// Text-to-text generation.
pub trait TextGenerator: Send + Sync {
    fn generate(&self, prompt: &str, model: &str)
    -> impl Future<Output = GenerationResult> + Send;
}

impl ChangeRequestHost for GitLabProject {
    fn project_id(&self) -> u64 {
        self.handle().id
    }

    fn get_change_request(
        &self,
        iid: u64,
    ) -> impl Future<Output = MrResult<ChangeRequest>> + Send {
        GitLabProject::get_change_request(self, iid)
    }

    fn get_diff(&self, iid: u64) -> impl Future<Output = MrResult<DiffText>> + Send {
        GitLabProject::get_diff(self, iid)
    }

    fn post_comment(&self, iid: u64, body: &str) -> impl Future<Output = MrResult<u64>> + Send {
        GitLabProject::post_comment(self, iid, body)
    }
}

impl TextGenerator for OllamaService {
    fn generate(
        &self,
        prompt: &str,
        model: &str,
    ) -> impl Future<Output = GenerationResult> + Send {
        OllamaService::generate(self, prompt, model)
    }
}
