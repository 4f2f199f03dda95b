//! Entry search entry points.
//!
//! # Responsibility
//! - Expose keyword, partial-date and person queries over entry scans.
//! - Keep matching rules inside core so every shell searches the same way.

pub mod scan;
