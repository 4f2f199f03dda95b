//! Linear scans over entry sequences.
//!
//! # Responsibility
//! - Filter entries by summary keyword, date text or mentioned person.
//!
//! # Invariants
//! - Results keep the order of the input sequence.
//! - Entries without a summary are skipped by keyword search, never an error.
//! - Blank queries match nothing.

use crate::calendar::format_date;
use crate::model::entry::Entry;

/// Entries whose summary contains `term`, ignoring case.
///
/// `term` is matched as given, surrounding spaces included. A term made only
/// of whitespace matches nothing.
pub fn search_keyword<'a, I>(term: &str, entries: I) -> impl Iterator<Item = &'a Entry>
where
    I: IntoIterator<Item = &'a Entry>,
{
    let blank = term.trim().is_empty();
    let needle = term.to_lowercase();
    entries.into_iter().filter(move |entry| {
        !blank
            && entry
                .summary
                .as_deref()
                .is_some_and(|summary| summary.to_lowercase().contains(&needle))
    })
}

/// Entries whose `YYYY-MM-DD` date text contains `partial`.
///
/// `"2021"` matches a whole year, `"2021-02"` a month, `"-14"` every 14th.
pub fn search_date<'a, I>(partial: &str, entries: I) -> impl Iterator<Item = &'a Entry>
where
    I: IntoIterator<Item = &'a Entry>,
{
    let blank = partial.trim().is_empty();
    let needle = partial.to_string();
    entries
        .into_iter()
        .filter(move |entry| !blank && format_date(entry.date()).contains(&needle))
}

/// Entries that mention `name`, compared case-insensitively.
pub fn search_person<'a, I>(name: &str, entries: I) -> impl Iterator<Item = &'a Entry>
where
    I: IntoIterator<Item = &'a Entry>,
{
    let needle = name.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase();
    entries.into_iter().filter(move |entry| {
        !needle.is_empty()
            && entry
                .people
                .iter()
                .any(|person| person.to_lowercase() == needle)
    })
}
