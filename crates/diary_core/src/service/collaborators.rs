//! Outer-shell collaborator contracts.
//!
//! The journal session asks these traits for everything that needs a human
//! or the file system outside the entry store.

use crate::model::entry::{AttachmentDuration, EntryDraft};
use chrono::NaiveDate;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Failure while collecting entry content from the operator.
#[derive(Debug)]
pub enum PromptError {
    Io(std::io::Error),
    /// The operator's answer could not be used.
    Invalid(String),
}

impl Display for PromptError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "prompt i/o failed: {err}"),
            Self::Invalid(message) => write!(f, "invalid answer: {message}"),
        }
    }
}

impl Error for PromptError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Invalid(_) => None,
        }
    }
}

impl From<std::io::Error> for PromptError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

/// Supplies entry content for one date.
pub trait EntryPrompter {
    /// Returns the content for `date`, or `None` when the operator stops.
    fn compose(&mut self, date: NaiveDate, weekday: &str)
        -> Result<Option<EntryDraft>, PromptError>;
}

/// Resolves an attachment reference to the length of the recording.
pub trait AttachmentReader {
    /// `None` means no attachment is linked.
    fn read_duration(&self, reference: &str) -> Option<AttachmentDuration>;
}

/// Reader that takes the reference itself as `H:MM:SS` text.
#[derive(Debug, Clone, Copy, Default)]
pub struct LiteralDurationReader;

impl AttachmentReader for LiteralDurationReader {
    fn read_duration(&self, reference: &str) -> Option<AttachmentDuration> {
        AttachmentDuration::parse(reference).ok()
    }
}

/// Replays prepared drafts in order, then stops. Used by tests and imports.
#[derive(Debug, Clone, Default)]
pub struct ScriptedPrompter {
    drafts: std::collections::VecDeque<EntryDraft>,
    asked: Vec<NaiveDate>,
}

impl ScriptedPrompter {
    pub fn new(drafts: impl IntoIterator<Item = EntryDraft>) -> Self {
        Self {
            drafts: drafts.into_iter().collect(),
            asked: Vec::new(),
        }
    }

    /// Dates the session asked about, in order.
    pub fn asked(&self) -> &[NaiveDate] {
        &self.asked
    }
}

impl EntryPrompter for ScriptedPrompter {
    fn compose(
        &mut self,
        date: NaiveDate,
        _weekday: &str,
    ) -> Result<Option<EntryDraft>, PromptError> {
        self.asked.push(date);
        Ok(self.drafts.pop_front())
    }
}
