//! Leitner scheduling algorithm
//!
//! Cards move through five boxes. A correct answer promotes a card one
//! box (capped at box 5); a miss sends it back to box 1, immediately
//! due. Each box has a fixed review interval, so stronger cards come
//! around less often.

use chrono::{Duration, NaiveDate};

use super::models::{CardReviewState, MAX_BOX, MIN_BOX};

/// Days until the next review, indexed by box. Box 1 reviews same-day,
/// box 5 waits two weeks.
const BOX_INTERVALS: [i64; MAX_BOX as usize] = [0, 2, 4, 7, 14];

/// Days to wait after a card lands in `box_level`.
pub fn interval_days(box_level: u8) -> i64 {
    BOX_INTERVALS[box_level.clamp(MIN_BOX, MAX_BOX) as usize - 1]
}

/// Apply a study outcome to a card state.
///
/// "Knows it" promotes the card one box and schedules the next review
/// by the new box's interval. "Still learning" resets the card to box 1,
/// due today.
pub fn apply_answer(state: &CardReviewState, knows_it: bool, today: NaiveDate) -> CardReviewState {
    if knows_it {
        let box_level = (state.box_level + 1).min(MAX_BOX);
        CardReviewState {
            box_level,
            next_review: today + Duration::days(interval_days(box_level)),
        }
    } else {
        CardReviewState {
            box_level: MIN_BOX,
            next_review: today,
        }
    }
}

/// True when the card's scheduled review date has arrived or passed.
pub fn is_due_on(state: &CardReviewState, today: NaiveDate) -> bool {
    state.next_review <= today
}

/// Composite ordering key for the study queue: due cards before not-yet-due,
/// then ascending box (weakest first), then ascending review date.
pub fn queue_key(state: &CardReviewState, today: NaiveDate) -> (bool, u8, NaiveDate) {
    (!is_due_on(state, today), state.box_level, state.next_review)
}

/// Box-to-star display rating. The box level doubles as the 1-5 mastery
/// rating shown next to a card.
pub fn box_to_stars(box_level: u8) -> u8 {
    box_level
}
