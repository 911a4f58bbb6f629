//! Markdown bodies for the note posted back on the merge request.

/// Note carrying a successful review.
pub fn success_comment(model: &str, review: &str) -> String {
    format!(
        "🤖 **Automated Code Review** (via Ollama {model})\n\n\
         {review}\n\n\
         ---\n\
         *This review was generated automatically by the GitLab MR Reviewer service.*\n"
    )
}

/// Note telling the author that the review could not be produced.
pub fn warning_comment(message: &str) -> String {
    format!(
        "⚠️ **Automated Review Error**\n\n{message}\n\nPlease check the reviewer service logs."
    )
}
