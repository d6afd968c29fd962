use crate::models::{ProgressMap, Stats, StudyItem};

/// Box above which an item counts as learned.
const LEARNED_ABOVE_BOX: u8 = 2;
const STRUGGLING_BOX: u8 = 1;

pub fn compute_stats(items: &[StudyItem], progress: &ProgressMap, now: i64) -> Stats {
    let mut stats = Stats {
        total: items.len(),
        started: progress.len(),
        ..Stats::default()
    };

    for record in progress.values() {
        if record.box_level > LEARNED_ABOVE_BOX {
            stats.learned += 1;
        } else if record.box_level == STRUGGLING_BOX {
            stats.struggling += 1;
        }
        if record.is_due(now) {
            stats.due += 1;
        }
    }

    stats
}
