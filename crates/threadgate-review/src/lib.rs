//! Review-thread triage for pull requests.
//!
//! Provides the pipeline: origin and severity filtering, partitioning into
//! (resolved × outdated) buckets, the block decision, the GitHub fetcher,
//! pull request context resolution, and report rendering.

pub mod analyzer;
pub mod context;
pub mod decision;
pub mod filter;
pub mod github;
pub mod partition;
pub mod report;
