//! Date-keyed entry store.
//!
//! # Responsibility
//! - Enforce the one-entry-per-date rule on insert.
//! - Provide lookup, latest-entry and per-year scans.
//! - Apply in-place edits that preserve entry identity.
//!
//! # Invariants
//! - `insert` is the only way an entry is added.
//! - Mutation closures never receive the entry date.

use crate::calendar::format_date;
use crate::model::entry::Entry;
use chrono::{Datelike, NaiveDate};
use log::debug;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StoreResult<T> = Result<T, StoreError>;

/// Store-level precondition failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// An entry for this date already exists.
    DuplicateDate(NaiveDate),
    /// No entry exists for this date.
    NotFound(NaiveDate),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateDate(date) => {
                write!(f, "an entry for {} already exists", format_date(*date))
            }
            Self::NotFound(date) => write!(f, "no entry for {}", format_date(*date)),
        }
    }
}

impl Error for StoreError {}

/// All entries of one diary, keyed by date.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryStore {
    entries: BTreeMap<NaiveDate, Entry>,
}

impl EntryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store from loaded entries, rejecting duplicate dates.
    pub fn from_entries(entries: impl IntoIterator<Item = Entry>) -> StoreResult<Self> {
        let mut store = Self::new();
        for entry in entries {
            store.insert(entry)?;
        }
        Ok(store)
    }

    /// Adds `entry`; an existing entry for the same date is never overwritten.
    pub fn insert(&mut self, entry: Entry) -> StoreResult<()> {
        let date = entry.date();
        if self.entries.contains_key(&date) {
            return Err(StoreError::DuplicateDate(date));
        }
        self.entries.insert(date, entry);
        debug!(
            "event=entry_insert module=store status=ok date={}",
            format_date(date)
        );
        Ok(())
    }

    pub fn get(&self, date: NaiveDate) -> Option<&Entry> {
        self.entries.get(&date)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.entries.contains_key(&date)
    }

    /// Entry with the latest date, or `None` for an empty store.
    pub fn most_recent(&self) -> Option<&Entry> {
        self.entries.values().next_back()
    }

    /// Entries dated within `year`, oldest first.
    ///
    /// Each call returns a fresh iterator over the current contents.
    pub fn entries_for_year(&self, year: i32) -> impl Iterator<Item = &Entry> + '_ {
        let range = NaiveDate::from_ymd_opt(year, 1, 1)
            .zip(NaiveDate::from_ymd_opt(year, 12, 31))
            .map(|(first, last)| self.entries.range(first..=last));
        range.into_iter().flatten().map(|(_, entry)| entry)
    }

    /// Every entry, oldest first.
    pub fn all(&self) -> impl Iterator<Item = &Entry> + '_ {
        self.entries.values()
    }

    /// Distinct years that have at least one entry, ascending.
    pub fn years(&self) -> Vec<i32> {
        let mut years = self
            .entries
            .keys()
            .map(|date| date.year())
            .collect::<Vec<_>>();
        years.dedup();
        years
    }

    /// Edits the summary of the entry at `date` in place.
    pub fn mutate_summary<F>(&mut self, date: NaiveDate, edit: F) -> StoreResult<()>
    where
        F: FnOnce(&mut Option<String>),
    {
        let entry = self
            .entries
            .get_mut(&date)
            .ok_or(StoreError::NotFound(date))?;
        edit(&mut entry.summary);
        Ok(())
    }

    /// Edits the people list of the entry at `date` in place.
    pub fn mutate_people<F>(&mut self, date: NaiveDate, edit: F) -> StoreResult<()>
    where
        F: FnOnce(&mut Vec<String>),
    {
        let entry = self
            .entries
            .get_mut(&date)
            .ok_or(StoreError::NotFound(date))?;
        edit(&mut entry.people);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
