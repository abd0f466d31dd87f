//! Exam progress and study-streak tracking
//!
//! This module provides:
//! - Per-exam study state (topics, chapters, quiz scores, mastery)
//! - A global streak tracker over calendar study dates
//! - Export/import with non-destructive union merge

pub mod models;
pub mod store;
pub mod streak;

pub use models::*;
pub use store::ProgressStore;
