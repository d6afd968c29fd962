use chrono::Utc;

use crate::catalog::Catalog;
use crate::error::{Error, Result};
use crate::models::{ItemId, ProgressRecord, Score, Stats, StudyItem};
use crate::queue::build_queue;
use crate::scheduler;
use crate::stats::compute_stats;
use crate::store::{self, ProgressStore};

pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// Ties the catalog, the scheduling policy and a progress store together.
///
/// Every mutating call is one read-modify-write of the whole progress map.
pub struct Coach<S: ProgressStore> {
    catalog: Catalog,
    store: S,
}

impl<S: ProgressStore> Coach<S> {
    pub fn new(catalog: Catalog, store: S) -> Self {
        Self { catalog, store }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn ensure_known(&self, item_id: ItemId) -> Result<()> {
        match self.catalog.get(item_id) {
            Some(_) => Ok(()),
            None => Err(Error::UnknownItem(item_id)),
        }
    }

    pub fn get_smart_queue(&self) -> Vec<StudyItem> {
        build_queue(self.catalog.items(), &self.store.get())
    }

    pub fn progress_for(&self, item_id: ItemId) -> Option<ProgressRecord> {
        self.store.get().remove(&item_id)
    }

    pub fn save_progress(&mut self, item_id: ItemId, score: Score) -> Result<ProgressRecord> {
        self.save_progress_at(item_id, score, now_ms())
    }

    pub fn save_progress_at(
        &mut self,
        item_id: ItemId,
        score: Score,
        now: i64,
    ) -> Result<ProgressRecord> {
        self.ensure_known(item_id)?;

        let mut all = self.store.get();
        let updated = scheduler::record_review(all.get(&item_id), item_id, score, now);
        all.insert(item_id, updated.clone());
        self.store.set(&all)?;

        log::info!(
            "Item {} rated {} -> box {}",
            item_id,
            score.as_u8(),
            updated.box_level
        );
        Ok(updated)
    }

    /// Corrects the most recent rating of an item. Returns `None` without
    /// writing anything when the item has no rating to correct.
    pub fn update_last_rating(
        &mut self,
        item_id: ItemId,
        new_score: Score,
    ) -> Result<Option<ProgressRecord>> {
        let mut all = self.store.get();
        let Some(current) = all.get(&item_id) else {
            log::debug!("No progress for item {}; nothing to revise", item_id);
            return Ok(None);
        };
        if current.history.is_empty() {
            log::debug!("Item {} was never rated; nothing to revise", item_id);
            return Ok(None);
        }

        let revised = scheduler::revise_last_review(current, new_score);
        all.insert(item_id, revised.clone());
        self.store.set(&all)?;

        log::info!(
            "Item {} last rating revised to {} -> box {}",
            item_id,
            new_score.as_u8(),
            revised.box_level
        );
        Ok(Some(revised))
    }

    pub fn skip_question(&mut self, item_id: ItemId) -> Result<ProgressRecord> {
        self.skip_question_at(item_id, now_ms())
    }

    pub fn skip_question_at(&mut self, item_id: ItemId, now: i64) -> Result<ProgressRecord> {
        self.ensure_known(item_id)?;

        let mut all = self.store.get();
        let updated = scheduler::defer_review(all.get(&item_id), item_id, now);
        all.insert(item_id, updated.clone());
        self.store.set(&all)?;

        log::info!("Item {} skipped", item_id);
        Ok(updated)
    }

    pub fn get_stats(&self) -> Stats {
        self.get_stats_at(now_ms())
    }

    pub fn get_stats_at(&self, now: i64) -> Stats {
        compute_stats(self.catalog.items(), &self.store.get(), now)
    }

    pub fn export_data(&self) -> Result<String> {
        store::export_progress(&self.store)
    }

    pub fn import_data(&mut self, json: &str) -> Result<usize> {
        store::import_progress(&mut self.store, json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::{DAY_MS, MINUTE_MS};
    use crate::store::MemoryStore;

    const NOW: i64 = 1_700_000_000_000;

    const CATALOG: &str = r#"{ "categories": [
        { "id": "general", "title": "General", "questions": [
            { "id": 1, "question": "One?", "difficulty": "basic" },
            { "id": 2, "question": "Two?", "difficulty": "basic" },
            { "id": 3, "question": "Three?", "difficulty": "intermediate" }
        ]}
    ]}"#;

    fn setup_coach() -> Coach<MemoryStore> {
        let catalog = Catalog::from_json(CATALOG).expect("catalog should parse");
        Coach::new(catalog, MemoryStore::new())
    }

    fn queue_ids(coach: &Coach<MemoryStore>) -> Vec<ItemId> {
        coach.get_smart_queue().iter().map(|i| i.id).collect()
    }

    mod save_progress_tests {
        use super::*;

        #[test]
        fn first_good_rating() {
            let mut coach = setup_coach();
            coach.save_progress_at(1, Score::Good, NOW).unwrap();

            let r = coach.progress_for(1).unwrap();
            assert_eq!(r.box_level, 1);
            assert_eq!(r.history.len(), 1);
            assert_eq!(r.last_score(), Some(Score::Good));
            assert_eq!(r.next_review_at, r.last_reviewed_at + DAY_MS);
        }

        #[test]
        fn second_good_rating() {
            let mut coach = setup_coach();
            coach.save_progress_at(1, Score::Good, NOW).unwrap();
            coach.save_progress_at(1, Score::Good, NOW + DAY_MS).unwrap();

            let r = coach.progress_for(1).unwrap();
            assert_eq!(r.box_level, 2);
            assert_eq!(r.next_review_at - r.last_reviewed_at, 2 * DAY_MS);
        }

        #[test]
        fn unknown_item_is_rejected() {
            let mut coach = setup_coach();
            let result = coach.save_progress_at(99, Score::Good, NOW);
            assert!(matches!(result, Err(Error::UnknownItem(99))));
            assert!(coach.store().get().is_empty());
        }

        #[test]
        fn does_not_touch_other_records() {
            let mut coach = setup_coach();
            coach.save_progress_at(1, Score::Good, NOW).unwrap();
            let before = coach.progress_for(1).unwrap();

            coach.save_progress_at(2, Score::Poor, NOW + 5).unwrap();
            assert_eq!(coach.progress_for(1).unwrap(), before);
        }
    }

    mod update_last_rating_tests {
        use super::*;

        #[test]
        fn corrects_good_to_poor() {
            let mut coach = setup_coach();
            coach.save_progress_at(1, Score::Good, NOW).unwrap();
            coach.save_progress_at(1, Score::Good, NOW + DAY_MS).unwrap();

            let revised = coach.update_last_rating(1, Score::Poor).unwrap().unwrap();
            assert_eq!(revised.box_level, 1);
            assert_eq!(revised.next_review_at, revised.last_reviewed_at + 10 * MINUTE_MS);
            assert_eq!(revised.last_reviewed_at, NOW + DAY_MS);
            assert_eq!(revised.last_score(), Some(Score::Poor));
            assert_eq!(revised.history[0].score, Score::Good);

            assert_eq!(coach.progress_for(1).unwrap(), revised);
        }

        #[test]
        fn changes_only_the_last_score() {
            let mut coach = setup_coach();
            coach.save_progress_at(1, Score::Ok, NOW).unwrap();

            coach.update_last_rating(1, Score::Good).unwrap();
            let r = coach.progress_for(1).unwrap();
            assert_eq!(r.history.len(), 1);
            assert_eq!(r.history[0].score, Score::Good);
            assert_eq!(r.box_level, 1);
        }

        #[test]
        fn no_record_is_silent_no_op() {
            let mut coach = setup_coach();
            assert!(coach.update_last_rating(2, Score::Good).unwrap().is_none());
            assert!(coach.store().get().is_empty());
        }

        #[test]
        fn skipped_only_item_is_silent_no_op() {
            let mut coach = setup_coach();
            let skipped = coach.skip_question_at(2, NOW).unwrap();

            assert!(coach.update_last_rating(2, Score::Good).unwrap().is_none());
            assert_eq!(coach.progress_for(2).unwrap(), skipped);
        }

        #[test]
        fn unknown_item_is_silent_no_op() {
            let mut coach = setup_coach();
            assert!(coach.update_last_rating(42, Score::Ok).unwrap().is_none());
            assert!(coach.store().get().is_empty());
        }
    }

    mod skip_question_tests {
        use super::*;

        #[test]
        fn skip_unseen_item_creates_empty_record() {
            let mut coach = setup_coach();
            coach.skip_question_at(2, NOW).unwrap();

            let r = coach.progress_for(2).unwrap();
            assert_eq!(r.box_level, 0);
            assert!(r.history.is_empty());
            assert_eq!(r.next_review_at, NOW + 20 * MINUTE_MS);

            let stats = coach.get_stats_at(NOW);
            assert_eq!(stats.started, 1);
            assert_eq!(stats.learned, 0);
            assert_eq!(stats.struggling, 0);
        }

        #[test]
        fn skip_keeps_box_and_history() {
            let mut coach = setup_coach();
            coach.save_progress_at(1, Score::Good, NOW).unwrap();
            let rated = coach.progress_for(1).unwrap();

            coach.skip_question_at(1, NOW + 100).unwrap();
            let r = coach.progress_for(1).unwrap();
            assert_eq!(r.box_level, rated.box_level);
            assert_eq!(r.history, rated.history);
            assert_eq!(r.last_reviewed_at, rated.last_reviewed_at);
            assert_eq!(r.next_review_at, NOW + 100 + 20 * MINUTE_MS);
        }
    }

    mod queue_tests {
        use super::*;

        #[test]
        fn fresh_catalog_in_id_order() {
            let coach = setup_coach();
            assert_eq!(queue_ids(&coach), vec![1, 2, 3]);
        }

        #[test]
        fn unseen_before_seen_then_most_overdue() {
            let mut coach = setup_coach();
            coach.save_progress_at(2, Score::Good, NOW).unwrap();
            coach.save_progress_at(3, Score::Poor, NOW).unwrap();

            assert_eq!(queue_ids(&coach), vec![1, 3, 2]);
        }
    }

    mod stats_tests {
        use super::*;

        #[test]
        fn learned_then_struggling_after_correction() {
            let mut coach = setup_coach();
            for day in 0..3 {
                coach.save_progress_at(1, Score::Good, NOW + day * DAY_MS).unwrap();
            }
            assert_eq!(coach.progress_for(1).unwrap().box_level, 3);

            let stats = coach.get_stats_at(NOW);
            assert_eq!(stats.learned, 1);
            assert_eq!(stats.struggling, 0);

            coach.update_last_rating(1, Score::Poor).unwrap();
            let stats = coach.get_stats_at(NOW);
            assert_eq!(stats.learned, 0);
            assert_eq!(stats.struggling, 1);
            assert_eq!(stats.total, 3);
            assert_eq!(stats.started, 1);
        }
    }

    mod export_import_tests {
        use super::*;

        #[test]
        fn round_trip_between_coaches() {
            let mut source = setup_coach();
            source.save_progress_at(1, Score::Good, NOW).unwrap();
            source.skip_question_at(3, NOW).unwrap();
            let json = source.export_data().unwrap();

            let mut target = setup_coach();
            assert_eq!(target.import_data(&json).unwrap(), 2);
            assert_eq!(target.store().get(), source.store().get());
        }

        #[test]
        fn failed_import_keeps_progress() {
            let mut coach = setup_coach();
            coach.save_progress_at(1, Score::Good, NOW).unwrap();
            let before = coach.store().get();

            assert!(coach.import_data("{}").is_err());
            assert_eq!(coach.store().get(), before);
        }
    }
}
