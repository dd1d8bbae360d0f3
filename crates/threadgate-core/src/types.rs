use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single review comment attached to a position in a pull request diff.
///
/// # Examples
///
/// ```
/// use threadgate_core::Comment;
///
/// let comment = Comment {
///     id: "PRRC_1".into(),
///     body: "Consider a bounds check here".into(),
///     author: "octocat".into(),
///     created_at: "2024-05-01T12:00:00Z".parse().unwrap(),
///     path: "src/lib.rs".into(),
///     line: Some(42),
///     position: None,
///     outdated: true,
///     url: "https://github.com/o/r/pull/1#discussion_r1".into(),
/// };
/// assert!(comment.position.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    /// Node identifier, unique within the pull request.
    pub id: String,
    /// Markdown body.
    pub body: String,
    /// Login of the author.
    pub author: String,
    /// When the comment was posted.
    pub created_at: DateTime<Utc>,
    /// File the comment is anchored to.
    pub path: String,
    /// Line in the current version of the file, if it still maps.
    pub line: Option<u32>,
    /// Diff position; `None` once the underlying hunk is gone.
    pub position: Option<u32>,
    /// Whether the code at this position has changed since the comment.
    pub outdated: bool,
    /// Link to the comment on GitHub.
    pub url: String,
}

/// A review conversation: an ordered list of comments plus its resolution
/// and staleness flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Thread {
    /// Node identifier of the thread.
    pub id: String,
    /// Whether a participant marked the thread resolved.
    pub is_resolved: bool,
    /// Whether the code the thread points at has changed.
    pub is_outdated: bool,
    /// Login of whoever resolved the thread.
    pub resolved_by: Option<String>,
    /// Comments in posting order. The first one started the thread.
    pub comments: Vec<Comment>,
}

impl Thread {
    /// The comment that started the thread.
    pub fn first_comment(&self) -> Option<&Comment> {
        self.comments.first()
    }
}

/// Severity declared by the automated reviewer via a `[severity:…]` tag.
///
/// # Examples
///
/// ```
/// use threadgate_core::Severity;
///
/// let s: Severity = "HIGH".parse().unwrap();
/// assert_eq!(s, Severity::High);
/// assert!("medium".parse::<Severity>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Must be addressed before merging.
    High,
    /// Informational.
    Low,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::High => write!(f, "high"),
            Severity::Low => write!(f, "low"),
        }
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "high" => Ok(Severity::High),
            "low" => Ok(Severity::Low),
            other => Err(format!("unknown severity: {other}")),
        }
    }
}

/// One of the four (resolved × outdated) partitions of in-scope threads.
///
/// # Examples
///
/// ```
/// use threadgate_core::Bucket;
///
/// let bucket = Bucket::from_flags(true, false);
/// assert_eq!(bucket, Bucket::ResolvedAndNotOutdated);
/// assert_eq!(bucket.to_string(), "resolvedAndNotOutdated");
/// assert!(bucket.is_blocking());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Bucket {
    /// Code changed and the thread was resolved. Settled.
    ResolvedAndOutdated,
    /// Resolved while the flagged code is untouched.
    ResolvedAndNotOutdated,
    /// Code changed but nobody resolved the thread.
    UnresolvedAndOutdated,
    /// Neither resolved nor changed. Outstanding.
    UnresolvedAndNotOutdated,
}

impl Bucket {
    /// All buckets, in reporting order.
    pub const ALL: [Bucket; 4] = [
        Bucket::ResolvedAndOutdated,
        Bucket::ResolvedAndNotOutdated,
        Bucket::UnresolvedAndOutdated,
        Bucket::UnresolvedAndNotOutdated,
    ];

    /// Bucket for a thread with the given flags.
    pub fn from_flags(is_resolved: bool, is_outdated: bool) -> Self {
        match (is_resolved, is_outdated) {
            (true, true) => Bucket::ResolvedAndOutdated,
            (true, false) => Bucket::ResolvedAndNotOutdated,
            (false, true) => Bucket::UnresolvedAndOutdated,
            (false, false) => Bucket::UnresolvedAndNotOutdated,
        }
    }

    /// Stable camelCase name.
    pub fn as_str(self) -> &'static str {
        match self {
            Bucket::ResolvedAndOutdated => "resolvedAndOutdated",
            Bucket::ResolvedAndNotOutdated => "resolvedAndNotOutdated",
            Bucket::UnresolvedAndOutdated => "unresolvedAndOutdated",
            Bucket::UnresolvedAndNotOutdated => "unresolvedAndNotOutdated",
        }
    }

    /// Whether threads in this bucket block the pull request.
    ///
    /// Only buckets whose code is unchanged block. Outdated threads are left
    /// for the reviewer's next pass over the new code.
    pub fn is_blocking(self) -> bool {
        matches!(
            self,
            Bucket::ResolvedAndNotOutdated | Bucket::UnresolvedAndNotOutdated
        )
    }

    pub fn is_resolved(self) -> bool {
        matches!(
            self,
            Bucket::ResolvedAndOutdated | Bucket::ResolvedAndNotOutdated
        )
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output format for CLI reports.
///
/// Implements [`FromStr`] so it can be used directly with `clap` argument parsing.
///
/// # Examples
///
/// ```
/// use threadgate_core::OutputFormat;
///
/// let fmt: OutputFormat = "json".parse().unwrap();
/// assert_eq!(fmt, OutputFormat::Json);
///
/// let fmt: OutputFormat = "md".parse().unwrap();
/// assert_eq!(fmt, OutputFormat::Markdown);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable status lines.
    #[default]
    Text,
    /// Machine-readable JSON with camelCase keys.
    Json,
    /// Markdown, e.g. for a job summary.
    Markdown,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Markdown => write!(f, "markdown"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            other => Err(format!("unknown output format: {other}")),
        }
    }
}
