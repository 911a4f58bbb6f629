//! Provider-agnostic data model for change requests and diffs.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// How a repository is addressed on the host.
///
/// A purely numeric identifier is an id; anything else is a path such as
/// `group/subgroup/project`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProjectRef {
    Id(u64),
    Path(String),
}

impl ProjectRef {
    /// Parses a configured or payload-supplied identifier. Blank input yields `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        let s = raw.trim().trim_matches('/');
        if s.is_empty() {
            return None;
        }
        if s.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(id) = s.parse::<u64>() {
                return Some(ProjectRef::Id(id));
            }
        }
        Some(ProjectRef::Path(s.to_string()))
    }

    /// Path segment for REST calls: numeric id as-is, paths URL-encoded.
    pub fn api_segment(&self) -> String {
        match self {
            ProjectRef::Id(id) => id.to_string(),
            ProjectRef::Path(path) => urlencoding::encode(path).into_owned(),
        }
    }
}

impl fmt::Display for ProjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProjectRef::Id(id) => write!(f, "{id}"),
            ProjectRef::Path(path) => f.write_str(path),
        }
    }
}

/// A reviewable unit: one merge request inside one repository.
///
/// `title` is optional: webhook payloads carry it inline, manual triggers
/// do not and the orchestrator looks it up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeRequestRef {
    pub project: ProjectRef,
    pub iid: u64,
    pub title: Option<String>,
}

/// Resolved repository on the host.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectHandle {
    pub id: u64,
    pub path_with_namespace: String,
    #[serde(default)]
    pub web_url: Option<String>,
}

/// Merge request metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeRequest {
    pub iid: u64,
    pub title: String,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub web_url: Option<String>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Ordered per-file unified diff fragments of one merge request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffText {
    fragments: Vec<String>,
}

impl DiffText {
    pub fn from_fragments(fragments: Vec<String>) -> Self {
        Self { fragments }
    }

    /// True when no fragment carries any non-whitespace content.
    pub fn is_empty(&self) -> bool {
        self.fragments.iter().all(|f| f.trim().is_empty())
    }

    pub fn fragment_count(&self) -> usize {
        self.fragments.len()
    }

    /// Fragments joined by a single newline, in host order.
    pub fn to_prompt_text(&self) -> String {
        self.fragments.join("\n")
    }

    /// Lowercase hex SHA-256 of the joined text. Identifies a diff revision.
    pub fn digest(&self) -> String {
        let mut h = Sha256::new();
        h.update(self.to_prompt_text().as_bytes());
        format!("{:x}", h.finalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn project_ref_parses_ids_and_paths() {
        assert_eq!(ProjectRef::parse("42"), Some(ProjectRef::Id(42)));
        assert_eq!(
            ProjectRef::parse("/team/sub/proj/"),
            Some(ProjectRef::Path("team/sub/proj".into()))
        );
        assert_eq!(ProjectRef::parse("   "), None);
    }

    #[test]
    fn path_segment_is_url_encoded() {
        let p = ProjectRef::Path("team/proj".into());
        assert_eq!(p.api_segment(), "team%2Fproj");
        assert_eq!(ProjectRef::Id(7).api_segment(), "7");
    }

    #[test]
    fn diff_joins_fragments_with_single_newline() {
        let d = DiffText::from_fragments(vec!["a\n".into(), "b".into()]);
        assert_eq!(d.to_prompt_text(), "a\n\nb");
        assert!(!d.is_empty());
    }

    #[test]
    fn empty_fragment_list_is_empty_diff() {
        assert!(DiffText::from_fragments(Vec::new()).is_empty());
        assert!(DiffText::from_fragments(vec![String::new(), "\n".into()]).is_empty());
    }

    #[test]
    fn digest_changes_with_content() {
        let a = DiffText::from_fragments(vec!["+name: orders".into()]);
        let b = DiffText::from_fragments(vec!["+name: Orders".into()]);
        assert_eq!(a.digest(), a.clone().digest());
        assert_ne!(a.digest(), b.digest());
        assert_eq!(a.digest().len(), 64);
    }
}
