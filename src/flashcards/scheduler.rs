//! Review scheduling over the persisted card-state map
//!
//! The scheduler loads the whole card-id → state map once, keeps it in
//! memory for the session, and writes the map back after every mutation.
//! A failed write is logged and swallowed: the in-memory state stays
//! authoritative until the session ends, it just will not survive a
//! reload.

use chrono::{Local, NaiveDate};
use serde_json::Value;

use super::algorithm::{apply_answer, is_due_on, queue_key};
use super::models::{normalize_review_map, CardReviewState, ReviewMap, MAX_BOX};
use crate::storage::{Result, StorageBackend};

/// Storage key for the card review map.
pub const REVIEW_STATE_KEY: &str = "flashcard_progress";

pub struct ReviewScheduler<B: StorageBackend> {
    backend: B,
    states: ReviewMap,
}

impl<B: StorageBackend> ReviewScheduler<B> {
    /// Load the persisted review map. Missing or malformed data degrades
    /// to an empty map, never an error.
    pub fn load(backend: B) -> Self {
        Self::load_on(backend, Local::now().date_naive())
    }

    pub fn load_on(backend: B, today: NaiveDate) -> Self {
        let states = match backend.read(REVIEW_STATE_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<Value>(&raw) {
                Ok(value) => normalize_review_map(&value, today),
                Err(e) => {
                    log::warn!("Discarding corrupt review state: {}", e);
                    ReviewMap::new()
                }
            },
            Ok(None) => ReviewMap::new(),
            Err(e) => {
                log::warn!("Failed to read review state: {}", e);
                ReviewMap::new()
            }
        };

        Self { backend, states }
    }

    /// Get the review state for a card, creating the box-1 default on
    /// first access.
    pub fn get_state(&mut self, card_id: &str) -> CardReviewState {
        self.get_state_on(card_id, Local::now().date_naive())
    }

    pub fn get_state_on(&mut self, card_id: &str, today: NaiveDate) -> CardReviewState {
        if let Some(state) = self.states.get(card_id) {
            return state.clone();
        }

        let state = CardReviewState::new(today);
        self.states.insert(card_id.to_string(), state.clone());
        self.persist();
        state
    }

    /// True when the card's next review date has arrived or passed.
    pub fn is_due(&mut self, card_id: &str) -> bool {
        self.is_due_on(card_id, Local::now().date_naive())
    }

    pub fn is_due_on(&mut self, card_id: &str, today: NaiveDate) -> bool {
        let state = self.get_state_on(card_id, today);
        is_due_on(&state, today)
    }

    /// Order a card set for studying: due cards first, then weakest box,
    /// then soonest review date. Stable for equal keys.
    pub fn sort(&mut self, card_ids: &[String]) -> Vec<String> {
        self.sort_on(card_ids, Local::now().date_naive())
    }

    pub fn sort_on(&mut self, card_ids: &[String], today: NaiveDate) -> Vec<String> {
        let mut created = false;
        for id in card_ids {
            if !self.states.contains_key(id) {
                self.states.insert(id.clone(), CardReviewState::new(today));
                created = true;
            }
        }
        if created {
            self.persist();
        }

        let mut ordered = card_ids.to_vec();
        ordered.sort_by_key(|id| queue_key(&self.states[id.as_str()], today));
        ordered
    }

    /// Record a study outcome for a card and persist the updated map.
    /// Returns the card's new state.
    pub fn record_answer(&mut self, card_id: &str, knows_it: bool) -> CardReviewState {
        self.record_answer_on(card_id, knows_it, Local::now().date_naive())
    }

    pub fn record_answer_on(
        &mut self,
        card_id: &str,
        knows_it: bool,
        today: NaiveDate,
    ) -> CardReviewState {
        let current = self.get_state_on(card_id, today);
        let next = apply_answer(&current, knows_it, today);
        self.states.insert(card_id.to_string(), next.clone());
        self.persist();
        next
    }

    /// Number of cards that have reached the top box.
    pub fn mastered_count(&self) -> usize {
        self.states
            .values()
            .filter(|s| s.box_level == MAX_BOX)
            .count()
    }

    /// Number of due cards within a card set.
    pub fn due_count(&mut self, card_ids: &[String]) -> usize {
        self.due_count_on(card_ids, Local::now().date_naive())
    }

    pub fn due_count_on(&mut self, card_ids: &[String], today: NaiveDate) -> usize {
        card_ids
            .iter()
            .filter(|id| self.is_due_on(id.as_str(), today))
            .count()
    }

    /// Drop all review state and the persisted blob.
    pub fn reset_all(&mut self) {
        self.states.clear();
        if let Err(e) = self.backend.remove(REVIEW_STATE_KEY) {
            log::warn!("Failed to clear review state: {}", e);
        }
    }

    fn persist(&mut self) {
        if let Err(e) = self.try_persist() {
            log::warn!("Failed to persist review state: {}", e);
        }
    }

    fn try_persist(&mut self) -> Result<()> {
        let json = serde_json::to_string(&self.states)?;
        self.backend.write(REVIEW_STATE_KEY, &json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{FileBackend, MemoryBackend, StorageError};
    use tempfile::TempDir;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
    }

    fn ids(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    struct FailingBackend;

    impl StorageBackend for FailingBackend {
        fn read(&self, _key: &str) -> Result<Option<String>> {
            Ok(None)
        }

        fn write(&mut self, _key: &str, _value: &str) -> Result<()> {
            Err(StorageError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "quota exceeded",
            )))
        }

        fn remove(&mut self, _key: &str) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_first_access_creates_box_one_due_today() {
        let mut scheduler = ReviewScheduler::load_on(MemoryBackend::new(), day(1));

        let state = scheduler.get_state_on("c1", day(1));
        assert_eq!(state, CardReviewState::new(day(1)));
        assert!(scheduler.is_due_on("c1", day(1)));
    }

    #[test]
    fn test_get_state_is_idempotent_after_creation() {
        let mut scheduler = ReviewScheduler::load_on(MemoryBackend::new(), day(1));

        scheduler.record_answer_on("c1", true, day(1));
        let a = scheduler.get_state_on("c1", day(5));
        let b = scheduler.get_state_on("c1", day(9));
        assert_eq!(a, b);
    }

    #[test]
    fn test_repeated_correct_answers_cap_at_box_five() {
        let mut scheduler = ReviewScheduler::load_on(MemoryBackend::new(), day(1));

        let mut state = CardReviewState::new(day(1));
        for _ in 0..10 {
            state = scheduler.record_answer_on("c1", true, day(1));
        }

        assert_eq!(state.box_level, 5);
    }

    #[test]
    fn test_miss_resets_to_box_one_and_today() {
        let mut scheduler = ReviewScheduler::load_on(MemoryBackend::new(), day(1));

        scheduler.record_answer_on("c1", true, day(1));
        scheduler.record_answer_on("c1", true, day(3));
        let state = scheduler.record_answer_on("c1", false, day(7));

        assert_eq!(state.box_level, 1);
        assert_eq!(state.next_review, day(7));
        assert!(scheduler.is_due_on("c1", day(7)));
    }

    #[test]
    fn test_sort_puts_due_before_upcoming_weakest_first() {
        let mut scheduler = ReviewScheduler::load_on(MemoryBackend::new(), day(1));

        // a: box 2, due today; b: box 1, due today;
        // c: box 3, due tomorrow; d: box 1, due in three days
        scheduler.record_answer_on("a", true, day(8)); // box 2, due day 10
        scheduler.record_answer_on("b", false, day(10)); // box 1, due day 10
        scheduler.record_answer_on("c", true, day(9)); // box 2...
        scheduler.record_answer_on("c", true, day(9)); // box 3, due day 13
        scheduler.get_state_on("d", day(13)); // box 1, due day 13

        let ordered = scheduler.sort_on(&ids(&["a", "b", "c", "d"]), day(10));
        assert_eq!(ordered, ids(&["b", "a", "d", "c"]));
    }

    #[test]
    fn test_sort_is_stable_for_identical_state() {
        let mut scheduler = ReviewScheduler::load_on(MemoryBackend::new(), day(1));

        // All unseen: every card gets box 1 / due today, so input order holds.
        let ordered = scheduler.sort_on(&ids(&["z", "m", "a"]), day(1));
        assert_eq!(ordered, ids(&["z", "m", "a"]));
    }

    #[test]
    fn test_due_and_mastered_counts() {
        let mut scheduler = ReviewScheduler::load_on(MemoryBackend::new(), day(1));

        for _ in 0..4 {
            scheduler.record_answer_on("strong", true, day(1));
        }
        scheduler.get_state_on("fresh", day(1));

        assert_eq!(scheduler.mastered_count(), 1);
        assert_eq!(scheduler.due_count_on(&ids(&["strong", "fresh"]), day(1)), 1);
        assert_eq!(
            scheduler.due_count_on(&ids(&["strong", "fresh"]), day(15)),
            2
        );
    }

    #[test]
    fn test_state_survives_reload() {
        let temp_dir = TempDir::new().unwrap();

        {
            let backend = FileBackend::new(temp_dir.path().to_path_buf()).unwrap();
            let mut scheduler = ReviewScheduler::load_on(backend, day(1));
            scheduler.record_answer_on("c1", true, day(1));
        }

        let backend = FileBackend::new(temp_dir.path().to_path_buf()).unwrap();
        let mut scheduler = ReviewScheduler::load_on(backend, day(2));
        let state = scheduler.get_state_on("c1", day(2));
        assert_eq!(state.box_level, 2);
        assert_eq!(state.next_review, day(3));
    }

    #[test]
    fn test_corrupt_blob_degrades_to_empty_map() {
        let mut backend = MemoryBackend::new();
        backend.write(REVIEW_STATE_KEY, "{not json").unwrap();

        let mut scheduler = ReviewScheduler::load_on(backend, day(1));
        let state = scheduler.get_state_on("c1", day(1));
        assert_eq!(state, CardReviewState::new(day(1)));
    }

    #[test]
    fn test_write_failure_keeps_in_memory_state_correct() {
        let mut scheduler = ReviewScheduler::load_on(FailingBackend, day(1));

        scheduler.record_answer_on("c1", true, day(1));
        let state = scheduler.record_answer_on("c1", true, day(3));

        assert_eq!(state.box_level, 3);
        assert_eq!(state.next_review, day(7));
    }

    #[test]
    fn test_reset_all_clears_state_and_blob() {
        let mut backend = MemoryBackend::new();
        backend.write(REVIEW_STATE_KEY, "{}").unwrap();

        let mut scheduler = ReviewScheduler::load_on(backend, day(1));
        scheduler.record_answer_on("c1", true, day(1));
        scheduler.reset_all();

        assert_eq!(scheduler.mastered_count(), 0);
        let state = scheduler.get_state_on("c1", day(5));
        assert_eq!(state, CardReviewState::new(day(5)));
    }
}
