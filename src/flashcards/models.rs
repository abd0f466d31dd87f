//! Data models for flashcard review state

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Weakest Leitner box
pub const MIN_BOX: u8 = 1;
/// Strongest Leitner box
pub const MAX_BOX: u8 = 5;

/// Review state for a single card
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardReviewState {
    /// Leitner box 1-5 (1 = weakest)
    #[serde(rename = "box")]
    pub box_level: u8,
    /// Date the card next comes due
    pub next_review: NaiveDate,
}

impl CardReviewState {
    /// Default state for a card seen for the first time: box 1, due today.
    pub fn new(today: NaiveDate) -> Self {
        Self {
            box_level: MIN_BOX,
            next_review: today,
        }
    }
}

/// Persisted card-id → review-state map. A BTreeMap keeps the serialized
/// document in a stable key order.
pub type ReviewMap = BTreeMap<String, CardReviewState>;

/// Rebuild a typed review map from an untrusted JSON document.
///
/// Applied once after deserialization: a non-object document yields an
/// empty map, and entries with missing or wrong-typed fields fall back
/// to box 1 / due today instead of failing the load.
pub fn normalize_review_map(value: &Value, today: NaiveDate) -> ReviewMap {
    let mut map = ReviewMap::new();
    if let Some(entries) = value.as_object() {
        for (card_id, raw) in entries {
            let box_level = raw
                .get("box")
                .and_then(Value::as_u64)
                .map(|b| (b as u8).clamp(MIN_BOX, MAX_BOX))
                .unwrap_or(MIN_BOX);
            let next_review = raw
                .get("nextReview")
                .and_then(Value::as_str)
                .and_then(|s| s.parse::<NaiveDate>().ok())
                .unwrap_or(today);
            map.insert(
                card_id.clone(),
                CardReviewState {
                    box_level,
                    next_review,
                },
            );
        }
    }
    map
}
