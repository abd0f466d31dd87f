//! Read-only content documents
//!
//! Card decks and exam catalogs are authored externally and shipped as
//! static JSON. The core only needs ids and counts from them, to turn an
//! exam's progress into dashboard totals and percentages.

use serde::{Deserialize, Serialize};

use crate::progress::ExamProgress;

/// One flashcard from a deck document. Decks author the prompt side as
/// either `question` or `term` and the answer side as either `answer`
/// or `definition`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeckCard {
    pub id: String,
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(alias = "term")]
    pub question: String,
    #[serde(alias = "definition")]
    pub answer: String,
}

/// A card deck for one exam
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeckDocument {
    #[serde(default)]
    pub cards: Vec<DeckCard>,
}

impl DeckDocument {
    pub fn from_json(raw: &str) -> serde_json::Result<Self> {
        serde_json::from_str(raw)
    }
}

/// One topic in an exam's outline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogTopic {
    pub id: String,
    pub name: String,
    /// Weight of the topic in the exam, in percent
    #[serde(default)]
    pub weight: f32,
    /// Chapter ids under this topic
    #[serde(default)]
    pub chapters: Vec<String>,
}

/// The outline document for one exam
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExamCatalog {
    #[serde(default)]
    pub topics: Vec<CatalogTopic>,
}

impl ExamCatalog {
    pub fn from_json(raw: &str) -> serde_json::Result<Self> {
        serde_json::from_str(raw)
    }

    pub fn chapter_count(&self) -> usize {
        self.topics.iter().map(|t| t.chapters.len()).sum()
    }
}

/// Dashboard totals for one exam, computed from its progress plus the
/// read-only content documents
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamSummary {
    pub topics_studied: usize,
    pub topics_total: usize,
    pub topic_percent: u8,
    pub chapters_completed: usize,
    pub chapters_total: usize,
    pub chapter_percent: u8,
    pub cards_total: usize,
    pub flashcards_mastered: u32,
    pub mastery_percent: u8,
    pub best_quiz_percent: Option<u8>,
    pub latest_quiz_percent: Option<u8>,
}

pub fn exam_summary(
    progress: &ExamProgress,
    catalog: &ExamCatalog,
    deck: &DeckDocument,
) -> ExamSummary {
    let topics_total = catalog.topics.len();
    let chapters_total = catalog.chapter_count();
    let cards_total = deck.cards.len();

    let quiz_percents: Vec<u8> = progress
        .quiz_scores
        .iter()
        .map(|s| percent(s.score as usize, s.total as usize))
        .collect();

    ExamSummary {
        topics_studied: progress.topics_studied.len(),
        topics_total,
        topic_percent: percent(progress.topics_studied.len(), topics_total),
        chapters_completed: progress.chapters_completed.len(),
        chapters_total,
        chapter_percent: percent(progress.chapters_completed.len(), chapters_total),
        cards_total,
        flashcards_mastered: progress.flashcards_mastered,
        mastery_percent: percent(progress.flashcards_mastered as usize, cards_total),
        best_quiz_percent: quiz_percents.iter().max().copied(),
        latest_quiz_percent: quiz_percents.last().copied(),
    }
}

/// Whole-number percentage, rounded; 0 when the total is 0.
fn percent(done: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    (done as f64 * 100.0 / total as f64).round() as u8
}
