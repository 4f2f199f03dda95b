//! In-memory entry storage.
//!
//! # Responsibility
//! - Hold every loaded entry in one flat date-keyed map.
//! - Offer restartable chronological scans for statistics and search.
//!
//! # Invariants
//! - At most one entry per date.
//! - Iteration order is date order, independent of insertion order.

pub mod entry_store;
