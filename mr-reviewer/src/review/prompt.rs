//! Prompt assembly: rules, merge request metadata, raw diff, closing directive.
//!
//! Pure string building. The diff goes in verbatim, no truncation.

use crate::review::rules::RuleSet;

/// Metadata shown to the model above the diff.
#[derive(Debug, Clone, Copy)]
pub struct MrInfo<'a> {
    pub title: &'a str,
    pub iid: u64,
}

/// Builds the complete review prompt.
pub fn build_review_prompt(rules: &RuleSet, diff: &str, info: &MrInfo<'_>) -> String {
    let mut s = String::with_capacity(rules.as_str().len() + diff.len() + 512);
    s.push_str("You are a code reviewer for a GitLab merge request.\n\n");
    s.push_str(rules.as_str());
    s.push_str("\n\n## Merge Request Information\n");
    s.push_str(&format!("- Title: {}\n", info.title));
    s.push_str(&format!("- MR ID: {}\n", info.iid));
    s.push_str("\n## Code Changes (Diff)\n\n");
    s.push_str(diff);
    s.push_str("\n\n---\n\n");
    s.push_str(
        "Please review the code changes above according to the instructions provided. \
         Focus on table naming conventions and other validation rules. \
         Provide your review feedback in a clear, structured format.\n",
    );
    s
}
