//! Exam preparation study core
//!
//! Client-side study engine: a Leitner spaced-repetition scheduler for
//! flashcards and a progress store tracking per-exam study state plus a
//! global study streak. Persistence is a pluggable key/value backend
//! holding one JSON document per store; malformed or missing data
//! degrades to defaults, and failed writes are swallowed so a session
//! keeps working in memory.

pub mod content;
pub mod flashcards;
pub mod progress;
pub mod storage;

pub use flashcards::{CardReviewState, ReviewScheduler};
pub use progress::{ExamProgress, ProgressStore, QuizScore, StreakTracker};
pub use storage::{FileBackend, MemoryBackend, StorageBackend, StorageError};
