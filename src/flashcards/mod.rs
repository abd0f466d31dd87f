//! Flashcard spaced repetition
//!
//! This module provides:
//! - Leitner box scheduling (five boxes, fixed review intervals)
//! - Study-queue ordering (due cards first, weakest box first)
//! - Persisted per-card review state

pub mod algorithm;
pub mod models;
pub mod scheduler;

pub use models::*;
pub use scheduler::ReviewScheduler;
