//! Which pull request to analyze.
//!
//! Either given explicitly as `owner/repo#123`, or taken from the GitHub
//! Actions environment of a `pull_request` workflow run.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;
use threadgate_core::ThreadgateError;

/// A pull request in a repository.
///
/// # Examples
///
/// ```
/// use threadgate_review::context::PullRequestRef;
///
/// let pr: PullRequestRef = "rust-lang/rust#12345".parse().unwrap();
/// assert_eq!(pr.owner, "rust-lang");
/// assert_eq!(pr.repo, "rust");
/// assert_eq!(pr.number, 12345);
/// assert_eq!(pr.to_string(), "rust-lang/rust#12345");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestRef {
    pub owner: String,
    pub repo: String,
    pub number: u64,
}

impl fmt::Display for PullRequestRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}#{}", self.owner, self.repo, self.number)
    }
}

impl FromStr for PullRequestRef {
    type Err = ThreadgateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_pr_reference(s)
    }
}

/// Parse a PR reference string (`owner/repo#number`) into its components.
///
/// # Errors
///
/// Returns [`ThreadgateError::Config`] if the format is invalid.
pub fn parse_pr_reference(pr_ref: &str) -> Result<PullRequestRef, ThreadgateError> {
    let invalid = || {
        ThreadgateError::Config(format!(
            "invalid PR reference '{pr_ref}', expected owner/repo#number"
        ))
    };
    let (owner_repo, number_str) = pr_ref.split_once('#').ok_or_else(invalid)?;
    let (owner, repo) = split_repository(owner_repo).ok_or_else(invalid)?;
    let number: u64 = number_str
        .parse()
        .map_err(|_| ThreadgateError::Config(format!("invalid PR number: {number_str}")))?;
    Ok(PullRequestRef {
        owner: owner.to_string(),
        repo: repo.to_string(),
        number,
    })
}

fn split_repository(repository: &str) -> Option<(&str, &str)> {
    let (owner, repo) = repository.split_once('/')?;
    if owner.is_empty() || repo.is_empty() || repo.contains('/') {
        return None;
    }
    Some((owner, repo))
}

#[derive(Debug, Deserialize)]
struct EventPayload {
    pull_request: Option<PullRequestPayload>,
}

#[derive(Debug, Deserialize)]
struct PullRequestPayload {
    number: u64,
}

impl PullRequestRef {
    /// Resolve the pull request from `GITHUB_REPOSITORY` and the event payload
    /// at `GITHUB_EVENT_PATH`.
    ///
    /// Returns `Ok(None)` when not running for a pull request.
    ///
    /// # Errors
    ///
    /// Returns [`ThreadgateError::Io`] if the event payload cannot be read,
    /// or [`ThreadgateError::Config`] if it or `GITHUB_REPOSITORY` is invalid.
    pub fn from_actions_env() -> Result<Option<Self>, ThreadgateError> {
        let (Ok(repository), Ok(event_path)) = (
            std::env::var("GITHUB_REPOSITORY"),
            std::env::var("GITHUB_EVENT_PATH"),
        ) else {
            tracing::debug!("GITHUB_REPOSITORY or GITHUB_EVENT_PATH not set");
            return Ok(None);
        };
        Self::from_event_file(&repository, Path::new(&event_path))
    }

    /// Like [`from_event`](Self::from_event), reading the payload from `path`.
    ///
    /// # Errors
    ///
    /// See [`from_actions_env`](Self::from_actions_env).
    pub fn from_event_file(repository: &str, path: &Path) -> Result<Option<Self>, ThreadgateError> {
        let payload = std::fs::read_to_string(path)?;
        Self::from_event(repository, &payload)
    }

    /// Build a reference from an `owner/repo` string and a webhook event payload.
    ///
    /// # Errors
    ///
    /// Returns [`ThreadgateError::Config`] if `repository` is not `owner/repo`
    /// or the payload is not valid JSON.
    ///
    /// # Examples
    ///
    /// ```
    /// use threadgate_review::context::PullRequestRef;
    ///
    /// let pr = PullRequestRef::from_event("o/r", r#"{"pull_request":{"number":7}}"#).unwrap();
    /// assert_eq!(pr.unwrap().number, 7);
    ///
    /// let push = PullRequestRef::from_event("o/r", r#"{"ref":"refs/heads/main"}"#).unwrap();
    /// assert!(push.is_none());
    /// ```
    pub fn from_event(repository: &str, payload: &str) -> Result<Option<Self>, ThreadgateError> {
        let event: EventPayload = serde_json::from_str(payload)
            .map_err(|e| ThreadgateError::Config(format!("invalid event payload: {e}")))?;
        let Some(pull_request) = event.pull_request else {
            return Ok(None);
        };
        let (owner, repo) = split_repository(repository).ok_or_else(|| {
            ThreadgateError::Config(format!(
                "invalid GITHUB_REPOSITORY '{repository}', expected owner/repo"
            ))
        })?;
        Ok(Some(Self {
            owner: owner.to_string(),
            repo: repo.to_string(),
            number: pull_request.number,
        }))
    }
}
