//! Origin and severity filtering.
//!
//! Only threads whose first comment was posted by the automated reviewer and
//! tagged `[severity:high]` are considered by the rest of the pipeline.

use std::sync::LazyLock;

use regex::Regex;
use threadgate_core::{Severity, Thread};

static SEVERITY_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\[severity:(high|low)\]").expect("severity tag regex is valid")
});

/// Whether `body` was written by the automated reviewer.
///
/// # Examples
///
/// ```
/// use threadgate_review::filter::is_reviewer_comment;
///
/// assert!(is_reviewer_comment("<!-- bot --> fix this", "<!-- bot -->"));
/// assert!(!is_reviewer_comment("looks good to me", "<!-- bot -->"));
/// ```
pub fn is_reviewer_comment(body: &str, marker: &str) -> bool {
    body.contains(marker)
}

/// Extract the first `[severity:high|low]` tag from a comment body.
///
/// Matching ignores case for the whole tag. Tags with other values are
/// ignored.
///
/// # Examples
///
/// ```
/// use threadgate_core::Severity;
/// use threadgate_review::filter::extract_severity;
///
/// assert_eq!(extract_severity("[Severity:HIGH] null deref"), Some(Severity::High));
/// assert_eq!(extract_severity("[severity:medium] [severity:low]"), Some(Severity::Low));
/// assert_eq!(extract_severity("no tag"), None);
/// ```
pub fn extract_severity(body: &str) -> Option<Severity> {
    SEVERITY_TAG
        .captures(body)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Whether a thread was started by the reviewer with a high-severity finding.
///
/// Only the first comment is consulted; follow-ups never change scope.
pub fn is_in_scope(thread: &Thread, marker: &str) -> bool {
    let Some(first) = thread.first_comment() else {
        return false;
    };
    is_reviewer_comment(&first.body, marker) && extract_severity(&first.body) == Some(Severity::High)
}

/// Keep the threads that are in scope, preserving order.
pub fn filter_in_scope(threads: Vec<Thread>, marker: &str) -> Vec<Thread> {
    threads
        .into_iter()
        .filter(|t| is_in_scope(t, marker))
        .collect()
}
