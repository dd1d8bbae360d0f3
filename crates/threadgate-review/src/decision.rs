use threadgate_core::{Bucket, Thread};

use crate::partition::Classification;

/// Whether the pull request should be blocked.
///
/// True iff a high-severity thread is still open on unchanged code, or was
/// resolved without the code changing. Outdated threads never block.
///
/// # Examples
///
/// ```
/// use threadgate_review::{decision::should_block, partition::partition};
///
/// assert!(!should_block(&partition(Vec::new())));
/// ```
pub fn should_block(classification: &Classification) -> bool {
    !classification.threads(Bucket::ResolvedAndNotOutdated).is_empty()
        || !classification.threads(Bucket::UnresolvedAndNotOutdated).is_empty()
}

/// The threads responsible for a block, with their buckets.
pub fn blocking_threads(
    classification: &Classification,
) -> impl Iterator<Item = (Bucket, &Thread)> + '_ {
    classification.iter().filter(|(b, _)| b.is_blocking())
}
