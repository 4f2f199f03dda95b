//! Core domain logic for the diary.
//! This crate is the single source of truth for entry invariants.

pub mod calendar;
pub mod db;
pub mod logging;
pub mod model;
pub mod persist;
pub mod reconcile;
pub mod search;
pub mod service;
pub mod stats;
pub mod store;

pub use calendar::{
    days_between, format_date, month_of, parse_date, parse_iso_date, predecessor, successor,
    weekday_of, Clock, FixedClock, MalformedDateError, SystemClock, ISO_DATE_FORMAT, MONTHS,
    WEEKDAYS,
};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::entry::{
    canonical_person_name, AttachmentDuration, Entry, EntryDraft, EntryValidationError, Happiness,
};
pub use persist::{
    CsvFileBackend, EntryBackend, PersistError, PersistResult, SqliteBackend, PEOPLE_SEPARATOR,
    RECORD_FIELDS, RECORD_FIELDS_HEADER,
};
pub use reconcile::{reconcile, InvalidRangeError};
pub use search::scan::{search_date, search_keyword, search_person};
pub use service::collaborators::{
    AttachmentReader, EntryPrompter, LiteralDurationReader, PromptError, ScriptedPrompter,
};
pub use service::journal_service::{JournalError, JournalResult, JournalService, UpdateReport};
pub use stats::aggregate::{
    aggregate_year, HappinessStat, MeanHappiness, PersonMentions, YearStats,
};
pub use store::entry_store::{EntryStore, StoreError, StoreResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
