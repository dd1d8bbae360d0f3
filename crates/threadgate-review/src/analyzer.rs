//! End-to-end analysis: fetch once, classify, decide.

use std::future::Future;

use threadgate_core::{Bucket, Thread, ThreadgateError};

use crate::decision::should_block;
use crate::partition::{classify, Classification};

/// Something that can produce every review thread of a pull request.
///
/// Implemented by [`GitHubClient`](crate::github::GitHubClient); tests use an
/// in-memory list.
pub trait ThreadSource {
    fn fetch_threads(
        &self,
        owner: &str,
        repo: &str,
        pr_number: u64,
    ) -> impl Future<Output = Result<Vec<Thread>, ThreadgateError>> + Send;
}

/// Outcome of analyzing one pull request.
#[derive(Debug, Clone)]
pub struct Analysis {
    /// In-scope threads by bucket.
    pub classification: Classification,
    /// Number of threads fetched before filtering.
    pub total_threads: usize,
    /// Whether the pull request should be blocked.
    pub should_block: bool,
}

/// Runs the filter, partition and decision steps over a [`ThreadSource`].
pub struct Analyzer<S> {
    source: S,
    marker: String,
}

impl<S: ThreadSource> Analyzer<S> {
    /// Create an analyzer recognizing reviewer comments by `marker`.
    pub fn new(source: S, marker: impl Into<String>) -> Self {
        Self {
            source,
            marker: marker.into(),
        }
    }

    /// Fetch the pull request's threads and report whether it should be blocked.
    ///
    /// # Errors
    ///
    /// Propagates any error from the thread source unchanged.
    pub async fn analyze(
        &self,
        owner: &str,
        repo: &str,
        pr_number: u64,
    ) -> Result<bool, ThreadgateError> {
        Ok(self.analyze_detailed(owner, repo, pr_number).await?.should_block)
    }

    /// Like [`analyze`](Self::analyze), but keep the classified buckets.
    ///
    /// # Errors
    ///
    /// Propagates any error from the thread source unchanged.
    pub async fn analyze_detailed(
        &self,
        owner: &str,
        repo: &str,
        pr_number: u64,
    ) -> Result<Analysis, ThreadgateError> {
        let threads = self.source.fetch_threads(owner, repo, pr_number).await?;
        let total_threads = threads.len();

        let classification = classify(threads, &self.marker);
        let should_block = should_block(&classification);
        let count = |bucket| classification.threads(bucket).len();

        tracing::info!(
            total = total_threads,
            in_scope = classification.len(),
            resolved_and_outdated = count(Bucket::ResolvedAndOutdated),
            resolved_and_not_outdated = count(Bucket::ResolvedAndNotOutdated),
            unresolved_and_outdated = count(Bucket::UnresolvedAndOutdated),
            unresolved_and_not_outdated = count(Bucket::UnresolvedAndNotOutdated),
            should_block,
            "classified review threads for {owner}/{repo}#{pr_number}"
        );

        Ok(Analysis {
            classification,
            total_threads,
            should_block,
        })
    }
}
