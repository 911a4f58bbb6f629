//! Merge request web URL parsing.
//!
//! `https://gitlab.example.com/group/sub/project/-/merge_requests/123`
//! resolves to `("group/sub/project", 123)`.

use lazy_static::lazy_static;
use regex::Regex;
use reqwest::Url;

lazy_static! {
    /// Lazy prefix stops at the first `/-/merge_requests/` marker.
    static ref MR_PATH: Regex =
        Regex::new(r"^/?(.+?)/-/merge_requests/([^/]+)").expect("static regex");
}

/// Parses a merge request URL into `(project_path, iid)`.
///
/// Returns `None` for unparseable URLs, paths without the marker, an empty
/// project path, or an id segment that is not a plain decimal number.
pub fn parse_merge_request_url(raw: &str) -> Option<(String, u64)> {
    let url = Url::parse(raw.trim()).ok()?;
    let caps = MR_PATH.captures(url.path())?;

    let project = caps.get(1)?.as_str().trim_start_matches('/');
    let id = caps.get(2)?.as_str();

    if project.is_empty() || !id.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let iid = id.parse::<u64>().ok()?;
    Some((project.to_string(), iid))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_simple_project() {
        assert_eq!(
            parse_merge_request_url("https://gitlab.example.com/team/proj/-/merge_requests/42"),
            Some(("team/proj".to_string(), 42))
        );
    }

    #[test]
    fn keeps_nested_groups() {
        assert_eq!(
            parse_merge_request_url("https://gitlab.com/a/b/c/d/-/merge_requests/7/diffs?x=1#note_3"),
            Some(("a/b/c/d".to_string(), 7))
        );
    }

    #[test]
    fn uses_first_marker() {
        assert_eq!(
            parse_merge_request_url("https://h/x/-/merge_requests/1/-/merge_requests/2"),
            Some(("x".to_string(), 1))
        );
    }

    #[test]
    fn rejects_non_matching_inputs() {
        for input in [
            "not a url",
            "/team/proj/-/merge_requests/42",
            "https://gitlab.com/team/proj/merge_requests/42",
            "https://gitlab.com/team/proj/-/merge_requests/",
            "https://gitlab.com/team/proj/-/merge_requests/abc",
            "https://gitlab.com/team/proj/-/merge_requests/12abc",
            "https://gitlab.com/-/merge_requests/5",
            "https://gitlab.com/team/proj/-/issues/5",
            "https://gitlab.com/team/proj/-/merge_requests/99999999999999999999999",
        ] {
            assert_eq!(parse_merge_request_url(input), None, "input: {input}");
        }
    }
}
