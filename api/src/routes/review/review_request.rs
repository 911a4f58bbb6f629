use serde::Deserialize;

/// Query string of the manual trigger: `?pr_url=<merge request web URL>`.
#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    pub pr_url: String,
}
