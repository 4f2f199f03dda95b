//! Persistence collaborators for the entry store.
//!
//! # Responsibility
//! - Define the load-all / append-one / rewrite-all contract the journal
//!   session persists through.
//! - Provide a delimited text file backend and a SQLite backend.
//!
//! # Invariants
//! - `load_all` returns entries exactly as saved; derived columns (year,
//!   month, weekday) that disagree with the date are reported, not repaired.
//! - A failed `rewrite_all` leaves the previous persisted state loadable.

use crate::calendar::MalformedDateError;
use crate::db::DbError;
use crate::model::entry::{Entry, EntryValidationError};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub mod csv_file;
mod record;
pub mod sqlite;

pub use csv_file::CsvFileBackend;
pub use record::{PEOPLE_SEPARATOR, RECORD_FIELDS, RECORD_FIELDS_HEADER};
pub use sqlite::SqliteBackend;

pub type PersistResult<T> = Result<T, PersistError>;

/// Errors raised while loading or saving entries.
#[derive(Debug)]
pub enum PersistError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Db(DbError),
    /// Stored date text is not ISO `YYYY-MM-DD`.
    MalformedDate {
        location: String,
        source: MalformedDateError,
    },
    /// Stored rating or duration fails validation.
    InvalidField {
        location: String,
        source: EntryValidationError,
    },
    /// Stored record is structurally broken or internally inconsistent.
    CorruptRecord { location: String, message: String },
    /// A person name cannot be written without breaking the record format.
    UnencodablePerson(String),
}

impl Display for PersistError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "i/o error on `{}`: {source}", path.display()),
            Self::Db(err) => write!(f, "{err}"),
            Self::MalformedDate { location, source } => write!(f, "{location}: {source}"),
            Self::InvalidField { location, source } => write!(f, "{location}: {source}"),
            Self::CorruptRecord { location, message } => {
                write!(f, "corrupt entry record at {location}: {message}")
            }
            Self::UnencodablePerson(name) => write!(
                f,
                "person name `{name}` contains the reserved separator `{PEOPLE_SEPARATOR}`"
            ),
        }
    }
}

impl Error for PersistError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Db(err) => Some(err),
            Self::MalformedDate { source, .. } => Some(source),
            Self::InvalidField { source, .. } => Some(source),
            Self::CorruptRecord { .. } | Self::UnencodablePerson(_) => None,
        }
    }
}

impl From<DbError> for PersistError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for PersistError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Storage contract consumed by the journal session.
pub trait EntryBackend {
    /// Reads every saved entry, oldest first.
    fn load_all(&mut self) -> PersistResult<Vec<Entry>>;
    /// Persists one newly recorded entry.
    fn append_one(&mut self, entry: &Entry) -> PersistResult<()>;
    /// Replaces all saved entries with `entries`.
    fn rewrite_all(&mut self, entries: &mut dyn Iterator<Item = &Entry>) -> PersistResult<()>;
}

impl<B: EntryBackend + ?Sized> EntryBackend for Box<B> {
    fn load_all(&mut self) -> PersistResult<Vec<Entry>> {
        (**self).load_all()
    }

    fn append_one(&mut self, entry: &Entry) -> PersistResult<()> {
        (**self).append_one(entry)
    }

    fn rewrite_all(&mut self, entries: &mut dyn Iterator<Item = &Entry>) -> PersistResult<()> {
        (**self).rewrite_all(entries)
    }
}
