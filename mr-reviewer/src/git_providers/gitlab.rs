//! GitLab provider (REST v4).
//!
//! Endpoints used:
//! - GET  /user                                          (token check)
//! - GET  /projects/:id                                  (id or url-encoded path)
//! - GET  /projects/:id/merge_requests/:iid
//! - GET  /projects/:id/merge_requests/:iid/diffs        (paginated via `x-next-page`)
//! - POST /projects/:id/merge_requests/:iid/notes

use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info, instrument};

use crate::errors::{ConfigError, MrResult, ProviderError};
use crate::git_providers::ProviderConfig;
use crate::git_providers::types::*;

/// Page size for list endpoints (GitLab maximum).
const PER_PAGE: u32 = 100;

/// Upper bound on followed pages. A longer diff is an error, never truncated.
const MAX_PAGES: u32 = 50;

#[derive(Debug, Clone)]
pub struct GitLabClient {
    http: Client,
    base_api: String, // e.g. "https://gitlab.com/api/v4"
    token: String,    // "PRIVATE-TOKEN"
}

impl GitLabClient {
    /// Builds a client. No network traffic happens here.
    pub fn new(cfg: &ProviderConfig) -> MrResult<Self> {
        if cfg.token.trim().is_empty() {
            return Err(ConfigError::MissingToken.into());
        }
        let base = cfg.base_api.trim().trim_end_matches('/');
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(ConfigError::InvalidBaseUrl(cfg.base_api.clone()).into());
        }

        let http = Client::builder()
            .user_agent("mr-reviewer/0.1")
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http,
            base_api: base.to_string(),
            token: cfg.token.clone(),
        })
    }

    /// Verifies the token against `GET /user` and returns the bot's username.
    pub async fn authenticate(&self) -> MrResult<String> {
        let url = format!("{}/user", self.base_api);
        let user: GitLabUser = send_json(self.get(&url)).await?;
        debug!(username = %user.username, "gitlab token accepted");
        Ok(user.username)
    }

    /// Resolves a project by numeric id or `group/project` path.
    pub async fn resolve_project(&self, project: &ProjectRef) -> MrResult<ProjectHandle> {
        let url = format!("{}/projects/{}", self.base_api, project.api_segment());
        send_json(self.get(&url)).await
    }

    /// Authenticates once, resolves `project`, and returns a handle bound to it.
    #[instrument(skip_all, fields(project = %project))]
    pub async fn connect(cfg: &ProviderConfig, project: &ProjectRef) -> MrResult<GitLabProject> {
        let client = Self::new(cfg)?;
        client.authenticate().await?;
        let handle = client.resolve_project(project).await?;
        info!(
            id = handle.id,
            path = %handle.path_with_namespace,
            "connected to GitLab project"
        );
        Ok(GitLabProject {
            client,
            project: handle,
        })
    }

    fn get(&self, url: &str) -> RequestBuilder {
        self.http.get(url).header("PRIVATE-TOKEN", &self.token)
    }

    fn post(&self, url: &str) -> RequestBuilder {
        self.http.post(url).header("PRIVATE-TOKEN", &self.token)
    }
}

/// Client bound to one resolved project.
#[derive(Debug, Clone)]
pub struct GitLabProject {
    client: GitLabClient,
    project: ProjectHandle,
}

impl GitLabProject {
    pub fn handle(&self) -> &ProjectHandle {
        &self.project
    }

    fn mr_url(&self, iid: u64) -> String {
        format!(
            "{}/projects/{}/merge_requests/{}",
            self.client.base_api, self.project.id, iid
        )
    }

    /// Fetches merge request metadata.
    pub async fn get_change_request(&self, iid: u64) -> MrResult<ChangeRequest> {
        send_json(self.client.get(&self.mr_url(iid))).await
    }

    /// Fetches every file-level diff fragment, in host order across pages.
    pub async fn get_diff(&self, iid: u64) -> MrResult<DiffText> {
        let url = format!("{}/diffs", self.mr_url(iid));
        let mut fragments = Vec::new();
        let mut page = 1u32;

        loop {
            let resp = check_status(
                self.client
                    .get(&url)
                    .query(&[("page", page), ("per_page", PER_PAGE)])
                    .send()
                    .await?,
            )?;
            let next = next_page(&resp);
            let files: Vec<GitLabMrDiffFile> = resp.json().await?;
            debug!(page, files = files.len(), "diff page fetched");
            fragments.extend(files.into_iter().map(|f| f.diff.unwrap_or_default()));

            match next {
                None => break,
                Some(n) if n > MAX_PAGES => {
                    return Err(ProviderError::InvalidResponse(format!(
                        "diff exceeds {MAX_PAGES} pages of {PER_PAGE} files"
                    ))
                    .into());
                }
                Some(n) if n > page => page = n,
                Some(n) => {
                    return Err(ProviderError::InvalidResponse(format!(
                        "diff pagination went backwards: page {page} points to {n}"
                    ))
                    .into());
                }
            }
        }

        Ok(DiffText::from_fragments(fragments))
    }

    /// Posts a general (non-inline) note on the merge request. Returns the note id.
    pub async fn post_comment(&self, iid: u64, body: &str) -> MrResult<u64> {
        let url = format!("{}/notes", self.mr_url(iid));
        let note: GitLabNote = send_json(self.client.post(&url).json(&json!({ "body": body }))).await?;
        info!(iid, note_id = note.id, "posted review note");
        Ok(note.id)
    }
}

/// Sends a request, maps error statuses, and decodes JSON.
async fn send_json<T>(req: RequestBuilder) -> MrResult<T>
where
    T: for<'de> Deserialize<'de>,
{
    let resp = check_status(req.send().await?)?;
    Ok(resp.json::<T>().await?)
}

/// Maps non-2xx responses to [`ProviderError`], keeping `Retry-After` on 429.
fn check_status(resp: Response) -> MrResult<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let retry_after = resp
        .headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse::<u64>().ok());
    Err(ProviderError::from_status(status.as_u16(), retry_after).into())
}

fn next_page(resp: &Response) -> Option<u32> {
    resp.headers()
        .get("x-next-page")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse::<u32>().ok())
}

/// --- GitLab response shapes (subset of fields we actually use) ---

#[derive(Debug, Deserialize)]
struct GitLabUser {
    username: String,
}

#[derive(Debug, Deserialize)]
struct GitLabMrDiffFile {
    #[serde(default)]
    diff: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GitLabNote {
    id: u64,
}
