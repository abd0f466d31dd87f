//! Data models for exam progress tracking

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One recorded quiz attempt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizScore {
    /// When the quiz was taken; also the dedupe key on import
    pub date: DateTime<Utc>,
    pub score: u32,
    pub total: u32,
    pub passed: bool,
}

/// Study progress for a single exam
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamProgress {
    /// Topic ids marked studied, unique, insertion order kept
    #[serde(default)]
    pub topics_studied: Vec<String>,
    /// Chapter ids marked complete, unique
    #[serde(default)]
    pub chapters_completed: Vec<String>,
    /// Append-only quiz history
    #[serde(default)]
    pub quiz_scores: Vec<QuizScore>,
    /// Cards in the top Leitner box, mirrored from the scheduler
    #[serde(default)]
    pub flashcards_mastered: u32,
    /// Most recent mutation to this exam
    #[serde(default)]
    pub last_activity: Option<DateTime<Utc>>,
}

/// Global study-streak state
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreakTracker {
    /// Calendar dates with at least one tracked study action
    #[serde(default)]
    pub dates: BTreeSet<NaiveDate>,
    /// Consecutive-day streak ending today or yesterday
    #[serde(default)]
    pub current: u32,
    /// Maximum `current` ever observed
    #[serde(default)]
    pub longest: u32,
}

/// The whole persisted progress document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressData {
    #[serde(default)]
    pub exams: BTreeMap<String, ExamProgress>,
    #[serde(default)]
    pub streaks: StreakTracker,
}

/// Default quiz passing threshold, in whole percent.
pub const DEFAULT_PASS_THRESHOLD: u32 = 70;

/// Whole-percent pass rule: `round(score / total * 100) >= threshold`.
pub fn is_passing(score: u32, total: u32, threshold: u32) -> bool {
    if total == 0 {
        return false;
    }
    let percent = (score as f64 / total as f64 * 100.0).round() as u32;
    percent >= threshold
}

/// Rebuild a typed progress document from an untrusted JSON value.
///
/// Applied once after deserialization, on load and on import: missing or
/// wrong-typed fields become empty/zero defaults, list fields are
/// deduplicated, and `longest` is lifted to at least `current`.
pub fn normalize_progress(value: &Value) -> ProgressData {
    let mut data = ProgressData::default();

    if let Some(exams) = value.get("exams").and_then(Value::as_object) {
        for (exam_id, raw) in exams {
            data.exams.insert(exam_id.clone(), normalize_exam(raw));
        }
    }
    if let Some(raw) = value.get("streaks") {
        data.streaks = normalize_streaks(raw);
    }

    data
}

fn normalize_exam(value: &Value) -> ExamProgress {
    ExamProgress {
        topics_studied: id_list(value.get("topicsStudied")),
        chapters_completed: id_list(value.get("chaptersCompleted")),
        quiz_scores: score_list(value.get("quizScores")),
        flashcards_mastered: value
            .get("flashcardsMastered")
            .and_then(Value::as_u64)
            .unwrap_or(0) as u32,
        last_activity: value
            .get("lastActivity")
            .and_then(Value::as_str)
            .and_then(|s| s.parse().ok()),
    }
}

fn normalize_streaks(value: &Value) -> StreakTracker {
    let dates: BTreeSet<NaiveDate> = value
        .get("dates")
        .and_then(Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .filter_map(Value::as_str)
                .filter_map(|s| s.parse().ok())
                .collect()
        })
        .unwrap_or_default();

    let current = value.get("current").and_then(Value::as_u64).unwrap_or(0) as u32;
    let longest = value.get("longest").and_then(Value::as_u64).unwrap_or(0) as u32;

    StreakTracker {
        dates,
        current,
        longest: longest.max(current),
    }
}

/// Unique string ids, preserving first-seen order.
fn id_list(value: Option<&Value>) -> Vec<String> {
    let mut ids = Vec::new();
    if let Some(entries) = value.and_then(Value::as_array) {
        for id in entries.iter().filter_map(Value::as_str) {
            if !ids.iter().any(|existing| existing == id) {
                ids.push(id.to_string());
            }
        }
    }
    ids
}

/// Quiz records with a parseable shape; malformed entries are dropped.
fn score_list(value: Option<&Value>) -> Vec<QuizScore> {
    value
        .and_then(Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .filter_map(|e| serde_json::from_value(e.clone()).ok())
                .collect()
        })
        .unwrap_or_default()
}
