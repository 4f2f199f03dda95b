//! Diary domain model.
//!
//! # Responsibility
//! - Define the canonical per-day record and its validated value types.
//!
//! # Invariants
//! - Every entry is identified by its calendar date.
//! - Ratings and durations are validated at construction, never clamped.

pub mod entry;
