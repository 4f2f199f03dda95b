//! Yearly statistics over diary entries.
//!
//! # Responsibility
//! - Aggregate happiness by month and weekday.
//! - Rank the people mentioned during a year.

pub mod aggregate;
