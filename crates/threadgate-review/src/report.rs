//! Human- and machine-readable reports of an [`Analysis`].

use std::fmt::Write as _;

use serde::Serialize;
use threadgate_core::{Bucket, OutputFormat, Thread};

use crate::analyzer::Analysis;
use crate::decision::blocking_threads;

/// Failure message shown when the pull request is blocked.
pub const BLOCK_MESSAGE: &str = "High severity comments aren't resolved";

/// Serializable summary of one analysis run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub pull_request: String,
    pub should_block: bool,
    pub total_threads: usize,
    pub in_scope_threads: usize,
    pub counts: BucketCounts,
    /// Threads that caused the block, in bucket order.
    pub findings: Vec<Finding>,
}

/// Number of in-scope threads per bucket.
#[derive(Debug, Clone, Copy, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketCounts {
    pub resolved_and_outdated: usize,
    pub resolved_and_not_outdated: usize,
    pub unresolved_and_outdated: usize,
    pub unresolved_and_not_outdated: usize,
}

/// A thread that blocks the pull request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Finding {
    pub bucket: Bucket,
    pub thread_id: String,
    pub url: String,
    pub path: String,
    pub line: Option<u32>,
    pub resolved_by: Option<String>,
}

impl Finding {
    fn from_thread(bucket: Bucket, thread: &Thread) -> Self {
        let first = thread.first_comment();
        Self {
            bucket,
            thread_id: thread.id.clone(),
            url: first.map(|c| c.url.clone()).unwrap_or_default(),
            path: first.map(|c| c.path.clone()).unwrap_or_default(),
            line: first.and_then(|c| c.line),
            resolved_by: thread.resolved_by.clone(),
        }
    }
}

impl Report {
    /// Summarize `analysis` for the pull request named `pull_request`.
    pub fn new(pull_request: impl Into<String>, analysis: &Analysis) -> Self {
        let classification = &analysis.classification;
        let count = |bucket| classification.threads(bucket).len();
        Self {
            pull_request: pull_request.into(),
            should_block: analysis.should_block,
            total_threads: analysis.total_threads,
            in_scope_threads: classification.len(),
            counts: BucketCounts {
                resolved_and_outdated: count(Bucket::ResolvedAndOutdated),
                resolved_and_not_outdated: count(Bucket::ResolvedAndNotOutdated),
                unresolved_and_outdated: count(Bucket::UnresolvedAndOutdated),
                unresolved_and_not_outdated: count(Bucket::UnresolvedAndNotOutdated),
            },
            findings: blocking_threads(classification)
                .map(|(bucket, thread)| Finding::from_thread(bucket, thread))
                .collect(),
        }
    }

    /// Render in the requested format. `reviewer` names the automated
    /// reviewer in text output.
    ///
    /// # Errors
    ///
    /// Returns a serialization error only for [`OutputFormat::Json`].
    pub fn render(&self, format: OutputFormat, reviewer: &str) -> Result<String, serde_json::Error> {
        match format {
            OutputFormat::Json => serde_json::to_string_pretty(self),
            OutputFormat::Markdown => Ok(self.render_markdown()),
            OutputFormat::Text => Ok(self.render_text(reviewer)),
        }
    }

    fn findings_in(&self, bucket: Bucket) -> impl Iterator<Item = &Finding> + '_ {
        self.findings.iter().filter(move |f| f.bucket == bucket)
    }

    fn render_text(&self, reviewer: &str) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "{}: {} review threads, {} high-severity threads from {reviewer}",
            self.pull_request, self.total_threads, self.in_scope_threads
        );

        for bucket in [Bucket::ResolvedAndNotOutdated, Bucket::UnresolvedAndNotOutdated] {
            let mut findings = self.findings_in(bucket).peekable();
            if findings.peek().is_none() {
                continue;
            }
            out.push_str("Please resolve these comments..\n");
            for finding in findings {
                let _ = writeln!(out, "URL: {}", finding.url);
                if bucket.is_resolved() {
                    let resolver = finding.resolved_by.as_deref().unwrap_or("unknown");
                    let _ = writeln!(out, "Conversation is marked resolved by {resolver}");
                }
            }
            let _ = writeln!(out, "Kindly follow the comments provided by {reviewer}");
        }

        if self.should_block {
            let _ = writeln!(out, "{BLOCK_MESSAGE}");
        } else {
            out.push_str("No unresolved high severity comments\n");
        }
        out
    }

    fn render_markdown(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "## Review threads for {}\n", self.pull_request);
        out.push_str("| bucket | threads |\n|---|---|\n");
        let rows = [
            (Bucket::ResolvedAndOutdated, self.counts.resolved_and_outdated),
            (Bucket::ResolvedAndNotOutdated, self.counts.resolved_and_not_outdated),
            (Bucket::UnresolvedAndOutdated, self.counts.unresolved_and_outdated),
            (Bucket::UnresolvedAndNotOutdated, self.counts.unresolved_and_not_outdated),
        ];
        for (bucket, count) in rows {
            let _ = writeln!(out, "| `{bucket}` | {count} |");
        }
        out.push('\n');

        if self.findings.is_empty() {
            out.push_str("No unresolved high severity comments.\n");
            return out;
        }

        let _ = writeln!(out, "**{BLOCK_MESSAGE}:**\n");
        for finding in &self.findings {
            let location = match finding.line {
                Some(line) => format!("{}:{line}", finding.path),
                None => finding.path.clone(),
            };
            let _ = write!(out, "- [`{location}`]({}) ({})", finding.url, finding.bucket);
            if let Some(resolver) = &finding.resolved_by {
                let _ = write!(out, ", resolved by @{resolver}");
            }
            out.push('\n');
        }
        out
    }
}
