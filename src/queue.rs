use std::cmp::Ordering;

use crate::models::{ProgressMap, StudyItem};

/// Orders the whole catalog for study.
///
/// Unseen items (no progress record) come first in ascending id order, then
/// seen items by ascending `next_review_at`. Nothing is filtered out; items
/// not yet due simply sort last. Equal due times keep catalog order.
pub fn build_queue(items: &[StudyItem], progress: &ProgressMap) -> Vec<StudyItem> {
    let mut queue = items.to_vec();
    queue.sort_by(|a, b| match (progress.get(&a.id), progress.get(&b.id)) {
        (None, None) => a.id.cmp(&b.id),
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(pa), Some(pb)) => pa.next_review_at.cmp(&pb.next_review_at),
    });
    queue
}
