//! Partitioning of in-scope threads into (resolved × outdated) buckets.

use std::collections::HashMap;

use serde::Serialize;
use threadgate_core::{Bucket, Thread};

use crate::filter::filter_in_scope;

/// In-scope threads split into the four disjoint buckets, plus the status
/// annotation of every comment they contain.
///
/// # Examples
///
/// ```
/// use threadgate_core::Bucket;
/// use threadgate_review::partition::partition;
///
/// let classification = partition(Vec::new());
/// assert!(classification.is_empty());
/// assert!(classification.threads(Bucket::UnresolvedAndNotOutdated).is_empty());
/// ```
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Classification {
    resolved_and_outdated: Vec<Thread>,
    resolved_and_not_outdated: Vec<Thread>,
    unresolved_and_outdated: Vec<Thread>,
    unresolved_and_not_outdated: Vec<Thread>,
    #[serde(skip)]
    statuses: HashMap<String, Bucket>,
}

impl Classification {
    /// Threads in `bucket`, in input order.
    pub fn threads(&self, bucket: Bucket) -> &[Thread] {
        match bucket {
            Bucket::ResolvedAndOutdated => &self.resolved_and_outdated,
            Bucket::ResolvedAndNotOutdated => &self.resolved_and_not_outdated,
            Bucket::UnresolvedAndOutdated => &self.unresolved_and_outdated,
            Bucket::UnresolvedAndNotOutdated => &self.unresolved_and_not_outdated,
        }
    }

    fn threads_mut(&mut self, bucket: Bucket) -> &mut Vec<Thread> {
        match bucket {
            Bucket::ResolvedAndOutdated => &mut self.resolved_and_outdated,
            Bucket::ResolvedAndNotOutdated => &mut self.resolved_and_not_outdated,
            Bucket::UnresolvedAndOutdated => &mut self.unresolved_and_outdated,
            Bucket::UnresolvedAndNotOutdated => &mut self.unresolved_and_not_outdated,
        }
    }

    /// Status assigned to a comment, or `None` if its thread was not bucketed.
    pub fn status_of(&self, comment_id: &str) -> Option<Bucket> {
        self.statuses.get(comment_id).copied()
    }

    /// Total number of bucketed threads.
    pub fn len(&self) -> usize {
        Bucket::ALL.iter().map(|b| self.threads(*b).len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every bucketed thread together with its bucket, bucket by bucket.
    pub fn iter(&self) -> impl Iterator<Item = (Bucket, &Thread)> + '_ {
        Bucket::ALL
            .into_iter()
            .flat_map(move |b| self.threads(b).iter().map(move |t| (b, t)))
    }
}

/// Place every thread into the bucket matching its flags and annotate its
/// comments with that bucket.
///
/// Every comment is annotated, including ones with an empty body.
pub fn partition(in_scope: Vec<Thread>) -> Classification {
    let mut classification = Classification::default();
    for thread in in_scope {
        let bucket = Bucket::from_flags(thread.is_resolved, thread.is_outdated);
        for comment in &thread.comments {
            classification.statuses.insert(comment.id.clone(), bucket);
        }
        classification.threads_mut(bucket).push(thread);
    }
    classification
}

/// Filter `threads` down to reviewer-started high-severity threads and
/// partition them.
pub fn classify(threads: Vec<Thread>, marker: &str) -> Classification {
    partition(filter_in_scope(threads, marker))
}
