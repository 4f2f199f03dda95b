//! Journal session service.
//!
//! # Responsibility
//! - Load the entry store once and keep it consistent with its backend.
//! - Drive catch-up: missing days oldest first, then today.
//! - Apply summary/person edits and expose statistics and search.
//!
//! # Invariants
//! - Each recorded day is persisted before it becomes visible in memory, so
//!   a stopped or failed catch-up keeps every earlier day.
//! - Edits are rewritten as a batch; on failure the in-memory store is
//!   restored to its pre-edit state.
//! - Summaries and names never reach the log; only dates and counts do.

use crate::calendar::{format_date, weekday_of, Clock};
use crate::model::entry::{canonical_person_name, Entry, EntryDraft};
use crate::persist::{EntryBackend, PersistError};
use crate::reconcile::{reconcile, InvalidRangeError};
use crate::search::scan::{search_date, search_keyword, search_person};
use crate::service::collaborators::{EntryPrompter, PromptError};
use crate::stats::aggregate::{aggregate_year, YearStats};
use crate::store::entry_store::{EntryStore, StoreError};
use chrono::NaiveDate;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type JournalResult<T> = Result<T, JournalError>;

/// Errors surfaced by journal use-cases.
#[derive(Debug)]
pub enum JournalError {
    Store(StoreError),
    InvalidRange(InvalidRangeError),
    Persist(PersistError),
    Prompt(PromptError),
}

impl Display for JournalError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Store(err) => write!(f, "{err}"),
            Self::InvalidRange(err) => write!(f, "{err}"),
            Self::Persist(err) => write!(f, "{err}"),
            Self::Prompt(err) => write!(f, "{err}"),
        }
    }
}

impl Error for JournalError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            Self::InvalidRange(err) => Some(err),
            Self::Persist(err) => Some(err),
            Self::Prompt(err) => Some(err),
        }
    }
}

impl From<StoreError> for JournalError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<InvalidRangeError> for JournalError {
    fn from(value: InvalidRangeError) -> Self {
        Self::InvalidRange(value)
    }
}

impl From<PersistError> for JournalError {
    fn from(value: PersistError) -> Self {
        Self::Persist(value)
    }
}

impl From<PromptError> for JournalError {
    fn from(value: PromptError) -> Self {
        Self::Prompt(value)
    }
}

/// Outcome of one update run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateReport {
    /// Days recorded during this run, oldest first.
    pub recorded: Vec<NaiveDate>,
    /// Days still unrecorded because the operator stopped.
    pub remaining: Vec<NaiveDate>,
}

impl UpdateReport {
    pub fn is_complete(&self) -> bool {
        self.remaining.is_empty()
    }
}

/// One diary session over a persistence backend.
pub struct JournalService<B: EntryBackend> {
    store: EntryStore,
    backend: B,
}

impl<B: EntryBackend> JournalService<B> {
    /// Loads every saved entry from `backend`.
    ///
    /// Fails when the backend holds two records for one date.
    pub fn open(mut backend: B) -> JournalResult<Self> {
        let store = EntryStore::from_entries(backend.load_all()?)?;
        info!(
            "event=journal_open module=service status=ok entries={}",
            store.len()
        );
        Ok(Self { store, backend })
    }

    pub fn store(&self) -> &EntryStore {
        &self.store
    }

    /// Days that still need an entry, oldest first, ending with `today`.
    ///
    /// An empty diary only needs today. Fails when the latest entry is dated
    /// after `today`.
    pub fn pending_dates(&self, today: NaiveDate) -> JournalResult<Vec<NaiveDate>> {
        let Some(latest) = self.store.most_recent() else {
            return Ok(vec![today]);
        };

        let mut pending = reconcile(latest.date(), today)?;
        if !self.store.contains(today) {
            pending.push(today);
        }
        Ok(pending)
    }

    /// Records `draft` as the entry for `date` and persists it.
    pub fn record(&mut self, date: NaiveDate, draft: EntryDraft) -> JournalResult<&Entry> {
        if self.store.contains(date) {
            return Err(StoreError::DuplicateDate(date).into());
        }

        let entry = Entry::from_draft(date, draft);
        self.backend.append_one(&entry)?;
        self.store.insert(entry)?;
        self.store
            .get(date)
            .ok_or(JournalError::Store(StoreError::NotFound(date)))
    }

    /// Catches up on missing days and records today.
    ///
    /// Days are offered to `prompter` oldest first. When it returns `None`
    /// the run stops; days already recorded stay recorded.
    pub fn update(
        &mut self,
        clock: &dyn Clock,
        prompter: &mut dyn EntryPrompter,
    ) -> JournalResult<UpdateReport> {
        let today = clock.today();
        let pending = match self.pending_dates(today) {
            Ok(pending) => pending,
            Err(err) => {
                warn!(
                    "event=catch_up module=service status=error today={} error={}",
                    format_date(today),
                    err
                );
                return Err(err);
            }
        };
        info!(
            "event=catch_up module=service status=start today={} pending={}",
            format_date(today),
            pending.len()
        );

        let mut report = UpdateReport::default();
        let mut queue = pending.into_iter();
        while let Some(date) = queue.next() {
            match prompter.compose(date, weekday_of(date))? {
                Some(draft) => {
                    self.record(date, draft)?;
                    report.recorded.push(date);
                }
                None => {
                    report.remaining.push(date);
                    report.remaining.extend(queue.by_ref());
                }
            }
        }

        info!(
            "event=catch_up module=service status=ok recorded={} remaining={}",
            report.recorded.len(),
            report.remaining.len()
        );
        Ok(report)
    }

    /// Replaces every occurrence of `find` in the summary of `date`.
    ///
    /// Returns the number of replacements. Nothing is rewritten when there
    /// are none. A summary left blank by the edit becomes absent.
    pub fn edit_summary(
        &mut self,
        date: NaiveDate,
        find: &str,
        replace: &str,
    ) -> JournalResult<usize> {
        let count = self
            .store
            .get(date)
            .ok_or(StoreError::NotFound(date))?
            .summary
            .as_deref()
            .filter(|_| !find.is_empty())
            .map_or(0, |summary| summary.matches(find).count());
        if count == 0 {
            return Ok(0);
        }

        self.edit_and_rewrite(|store| {
            store.mutate_summary(date, |summary| {
                *summary = summary
                    .take()
                    .map(|text| text.replace(find, replace))
                    .filter(|text| !text.trim().is_empty());
            })
        })?;
        info!(
            "event=summary_edit module=service status=ok date={} replacements={count}",
            format_date(date)
        );
        Ok(count)
    }

    /// Renames a person, on one date or across the whole diary.
    ///
    /// Names are compared after display-casing. Returns the number of
    /// entries changed.
    pub fn rename_person(
        &mut self,
        date: Option<NaiveDate>,
        old_name: &str,
        new_name: &str,
    ) -> JournalResult<usize> {
        let (Some(old_name), Some(new_name)) =
            (canonical_person_name(old_name), canonical_person_name(new_name))
        else {
            return Ok(0);
        };

        let targets = match date {
            Some(date) => {
                let entry = self.store.get(date).ok_or(StoreError::NotFound(date))?;
                vec![entry]
            }
            None => self.store.all().collect(),
        };
        let dates = targets
            .into_iter()
            .filter(|entry| mentions(entry, &old_name))
            .map(Entry::date)
            .collect::<Vec<_>>();
        if dates.is_empty() {
            return Ok(0);
        }

        self.edit_and_rewrite(|store| {
            for &date in &dates {
                store.mutate_people(date, |people| {
                    for person in people.iter_mut() {
                        if canonical_person_name(person).as_deref() == Some(old_name.as_str()) {
                            *person = new_name.clone();
                        }
                    }
                })?;
            }
            Ok(())
        })?;
        info!(
            "event=person_rename module=service status=ok entries={}",
            dates.len()
        );
        Ok(dates.len())
    }

    /// Ranked statistics for `year`.
    pub fn year_stats(&self, year: i32) -> YearStats {
        aggregate_year(year, self.store.entries_for_year(year))
    }

    pub fn search_keyword<'s>(&'s self, term: &str) -> impl Iterator<Item = &'s Entry> + 's {
        search_keyword(term, self.store.all())
    }

    pub fn search_date<'s>(&'s self, partial: &str) -> impl Iterator<Item = &'s Entry> + 's {
        search_date(partial, self.store.all())
    }

    pub fn search_person<'s>(&'s self, name: &str) -> impl Iterator<Item = &'s Entry> + 's {
        search_person(name, self.store.all())
    }

    fn edit_and_rewrite<F>(&mut self, edit: F) -> JournalResult<()>
    where
        F: FnOnce(&mut EntryStore) -> Result<(), StoreError>,
    {
        let snapshot = self.store.clone();
        let result = edit(&mut self.store)
            .map_err(JournalError::from)
            .and_then(|()| {
                self.backend
                    .rewrite_all(&mut self.store.all())
                    .map_err(JournalError::from)
            });

        if result.is_err() {
            self.store = snapshot;
        }
        result
    }
}

fn mentions(entry: &Entry, canonical: &str) -> bool {
    entry
        .people
        .iter()
        .any(|person| canonical_person_name(person).as_deref() == Some(canonical))
}
