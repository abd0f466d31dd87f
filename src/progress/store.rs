//! Persisted progress aggregation
//!
//! The store owns one JSON document: per-exam progress plus the global
//! streak tracker. It is loaded once, mutated in memory, and written
//! back after every operation. Write failures are logged and swallowed;
//! a malformed stored document is normalized to defaults on load. Only
//! import validation is surfaced to the caller, and only as a boolean.

use chrono::{DateTime, Local, NaiveDate, Utc};
use serde_json::Value;

use super::models::{normalize_progress, ExamProgress, ProgressData, QuizScore, StreakTracker};
use super::streak::current_streak;
use crate::storage::{Result, StorageBackend};

/// Storage key for the progress document.
pub const PROGRESS_KEY: &str = "study_progress";

pub struct ProgressStore<B: StorageBackend> {
    backend: B,
    data: ProgressData,
}

impl<B: StorageBackend> ProgressStore<B> {
    /// Load the persisted progress document. Missing or malformed data
    /// degrades to an empty store, never an error.
    pub fn load(backend: B) -> Self {
        let data = match backend.read(PROGRESS_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<Value>(&raw) {
                Ok(value) => normalize_progress(&value),
                Err(e) => {
                    log::warn!("Discarding corrupt progress data: {}", e);
                    ProgressData::default()
                }
            },
            Ok(None) => ProgressData::default(),
            Err(e) => {
                log::warn!("Failed to read progress data: {}", e);
                ProgressData::default()
            }
        };

        Self { backend, data }
    }

    /// Add or remove a topic from an exam's studied set.
    pub fn mark_topic_studied(&mut self, exam_id: &str, topic_id: &str, studied: bool) {
        self.mark_topic_studied_at(exam_id, topic_id, studied, Utc::now(), local_today())
    }

    pub fn mark_topic_studied_at(
        &mut self,
        exam_id: &str,
        topic_id: &str,
        studied: bool,
        now: DateTime<Utc>,
        today: NaiveDate,
    ) {
        let exam = self.data.exams.entry(exam_id.to_string()).or_default();
        if studied {
            if !exam.topics_studied.iter().any(|t| t == topic_id) {
                exam.topics_studied.push(topic_id.to_string());
            }
        } else {
            exam.topics_studied.retain(|t| t != topic_id);
        }
        exam.last_activity = Some(now);

        self.note_activity(today);
        self.persist();
    }

    /// Add or remove a chapter from an exam's completed set.
    pub fn mark_chapter_complete(&mut self, exam_id: &str, chapter_id: &str, complete: bool) {
        self.mark_chapter_complete_at(exam_id, chapter_id, complete, Utc::now(), local_today())
    }

    pub fn mark_chapter_complete_at(
        &mut self,
        exam_id: &str,
        chapter_id: &str,
        complete: bool,
        now: DateTime<Utc>,
        today: NaiveDate,
    ) {
        let exam = self.data.exams.entry(exam_id.to_string()).or_default();
        if complete {
            if !exam.chapters_completed.iter().any(|c| c == chapter_id) {
                exam.chapters_completed.push(chapter_id.to_string());
            }
        } else {
            exam.chapters_completed.retain(|c| c != chapter_id);
        }
        exam.last_activity = Some(now);

        self.note_activity(today);
        self.persist();
    }

    /// Append a quiz result to an exam's history.
    pub fn save_quiz_score(&mut self, exam_id: &str, score: u32, total: u32, passed: bool) {
        self.save_quiz_score_at(exam_id, score, total, passed, Utc::now(), local_today())
    }

    pub fn save_quiz_score_at(
        &mut self,
        exam_id: &str,
        score: u32,
        total: u32,
        passed: bool,
        now: DateTime<Utc>,
        today: NaiveDate,
    ) {
        let exam = self.data.exams.entry(exam_id.to_string()).or_default();
        exam.quiz_scores.push(QuizScore {
            date: now,
            score,
            total,
            passed,
        });
        exam.last_activity = Some(now);

        self.note_activity(today);
        self.persist();
    }

    /// Mirror the scheduler's mastered-card count into an exam. Counts as
    /// activity only when the number actually changed.
    pub fn set_flashcards_mastered(&mut self, exam_id: &str, count: u32) {
        self.set_flashcards_mastered_at(exam_id, count, Utc::now(), local_today())
    }

    pub fn set_flashcards_mastered_at(
        &mut self,
        exam_id: &str,
        count: u32,
        now: DateTime<Utc>,
        today: NaiveDate,
    ) {
        let exam = self.data.exams.entry(exam_id.to_string()).or_default();
        if exam.flashcards_mastered == count {
            return;
        }
        exam.flashcards_mastered = count;
        exam.last_activity = Some(now);

        self.note_activity(today);
        self.persist();
    }

    /// Record a study action for today and recompute the streak.
    pub fn record_activity(&mut self) {
        self.record_activity_on(local_today())
    }

    pub fn record_activity_on(&mut self, today: NaiveDate) {
        self.note_activity(today);
        self.persist();
    }

    /// Progress for an exam, or a zero-value default when never touched.
    /// Reads do not create state.
    pub fn get_exam_progress(&self, exam_id: &str) -> ExamProgress {
        self.data.exams.get(exam_id).cloned().unwrap_or_default()
    }

    /// Current streak state for the dashboard.
    pub fn streak(&self) -> StreakTracker {
        self.data.streaks.clone()
    }

    /// Serialize the whole store as a JSON snapshot.
    pub fn export_all(&self) -> String {
        serde_json::to_string_pretty(&self.data).unwrap_or_else(|e| {
            log::warn!("Failed to serialize progress snapshot: {}", e);
            "{}".to_string()
        })
    }

    /// Merge a JSON snapshot into the store. Returns false without
    /// touching any state when the payload is not valid JSON or not a
    /// top-level object.
    pub fn import_all(&mut self, snapshot: &str) -> bool {
        match serde_json::from_str::<Value>(snapshot) {
            Ok(value) => self.import_value(&value),
            Err(e) => {
                log::warn!("Rejected progress import: {}", e);
                false
            }
        }
    }

    /// Merge an already-parsed snapshot into the store.
    pub fn import_value(&mut self, value: &Value) -> bool {
        self.import_value_on(value, local_today())
    }

    pub fn import_value_on(&mut self, value: &Value, today: NaiveDate) -> bool {
        if !value.is_object() {
            return false;
        }

        let incoming = normalize_progress(value);
        merge_into(&mut self.data, incoming);

        // `current` is derived, never taken from the snapshot
        let streaks = &mut self.data.streaks;
        streaks.current = current_streak(&streaks.dates, today);
        streaks.longest = streaks.longest.max(streaks.current);

        self.persist();
        true
    }

    /// Clear all progress and the persisted document.
    pub fn reset_all(&mut self) {
        self.data = ProgressData::default();
        if let Err(e) = self.backend.remove(PROGRESS_KEY) {
            log::warn!("Failed to clear stored progress: {}", e);
        }
    }

    fn note_activity(&mut self, today: NaiveDate) {
        let streaks = &mut self.data.streaks;
        streaks.dates.insert(today);
        streaks.current = current_streak(&streaks.dates, today);
        streaks.longest = streaks.longest.max(streaks.current);
    }

    fn persist(&mut self) {
        if let Err(e) = self.try_persist() {
            log::warn!("Failed to persist progress data: {}", e);
        }
    }

    fn try_persist(&mut self) -> Result<()> {
        let json = serde_json::to_string(&self.data)?;
        self.backend.write(PROGRESS_KEY, &json)
    }
}

fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

/// Non-destructive union merge: sets union, quiz history deduped by
/// timestamp, counters by max, timestamps by later-of. Streak dates
/// union across the whole store.
fn merge_into(existing: &mut ProgressData, incoming: ProgressData) {
    for (exam_id, imported) in incoming.exams {
        let exam = existing.exams.entry(exam_id).or_default();

        for topic in imported.topics_studied {
            if !exam.topics_studied.contains(&topic) {
                exam.topics_studied.push(topic);
            }
        }
        for chapter in imported.chapters_completed {
            if !exam.chapters_completed.contains(&chapter) {
                exam.chapters_completed.push(chapter);
            }
        }
        for score in imported.quiz_scores {
            if !exam.quiz_scores.iter().any(|s| s.date == score.date) {
                exam.quiz_scores.push(score);
            }
        }
        exam.flashcards_mastered = exam.flashcards_mastered.max(imported.flashcards_mastered);
        exam.last_activity = match (exam.last_activity, imported.last_activity) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (a, b) => a.or(b),
        };
    }

    existing.streaks.dates.extend(incoming.streaks.dates);
    existing.streaks.longest = existing.streaks.longest.max(incoming.streaks.longest);
}
