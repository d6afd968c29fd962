//! Leitner-style scheduling policy.
//!
//! Every function here is a pure transition from one record value to the
//! next. Persistence is the caller's concern.

use crate::models::{ItemId, ProgressRecord, ReviewEntry, Score};

pub const MINUTE_MS: i64 = 60 * 1000;
pub const DAY_MS: i64 = 24 * 60 * MINUTE_MS;

pub const MAX_BOX: u8 = 6;

const RETRY_INTERVAL_MS: i64 = 10 * MINUTE_MS;
const SKIP_INTERVAL_MS: i64 = 20 * MINUTE_MS;

/// Box and interval that follow from rating an item currently in `box_level`.
///
/// | score | new box            | interval               |
/// |-------|--------------------|------------------------|
/// | Poor  | 1                  | 10 minutes             |
/// | Ok    | unchanged          | 1 day                  |
/// | Good  | `min(box + 1, 6)`  | `2^(new box - 1)` days |
pub fn interval_for(box_level: u8, score: Score) -> (u8, i64) {
    match score {
        Score::Poor => (1, RETRY_INTERVAL_MS),
        Score::Ok => (box_level, DAY_MS),
        Score::Good => {
            let new_box = box_level.saturating_add(1).min(MAX_BOX);
            let days = 1i64 << (new_box - 1);
            (new_box, days * DAY_MS)
        }
    }
}

/// Existing record for `item_id`, or a fresh box-0 record with no history.
pub fn get_or_default(record: Option<&ProgressRecord>, item_id: ItemId) -> ProgressRecord {
    match record {
        Some(r) => r.clone(),
        None => {
            log::debug!("Creating progress record for item {}", item_id);
            ProgressRecord::new(item_id)
        }
    }
}

/// Applies a rating made at `now`.
pub fn record_review(
    record: Option<&ProgressRecord>,
    item_id: ItemId,
    score: Score,
    now: i64,
) -> ProgressRecord {
    let mut updated = get_or_default(record, item_id);
    let (new_box, interval_ms) = interval_for(updated.box_level, score);

    updated.box_level = new_box;
    updated.history.push(ReviewEntry { at: now, score });
    updated.last_reviewed_at = now;
    updated.next_review_at = now + interval_ms;
    updated
}

/// Re-rates the most recent review as if `new_score` had been given at the
/// same moment. Returns the record unchanged when it has no history.
///
/// The box before the last rating is reconstructed from the last score. A
/// previous Poor rating reset the box to 1 and the earlier box is gone, so 1
/// is taken as the starting point in that case.
pub fn revise_last_review(record: &ProgressRecord, new_score: Score) -> ProgressRecord {
    let Some(old_score) = record.last_score() else {
        log::debug!(
            "Item {} has no rating to revise; leaving it unchanged",
            record.item_id
        );
        return record.clone();
    };

    let prev_box = match old_score {
        Score::Good => record.box_level.saturating_sub(1),
        Score::Ok | Score::Poor => record.box_level,
    };
    let (new_box, interval_ms) = interval_for(prev_box, new_score);

    let mut updated = record.clone();
    if let Some(last) = updated.history.last_mut() {
        last.score = new_score;
    }
    updated.box_level = new_box;
    updated.next_review_at = updated.last_reviewed_at + interval_ms;
    updated
}

/// Postpones an item by 20 minutes from `now` without touching its box,
/// history or last review time.
pub fn defer_review(record: Option<&ProgressRecord>, item_id: ItemId, now: i64) -> ProgressRecord {
    let mut updated = get_or_default(record, item_id);
    updated.next_review_at = now + SKIP_INTERVAL_MS;
    updated
}
