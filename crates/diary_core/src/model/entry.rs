//! Entry domain model.
//!
//! # Responsibility
//! - Define the per-day diary record and its validated field types.
//! - Canonicalize person names to display case.
//!
//! # Invariants
//! - `date` is fixed at construction; no API mutates it.
//! - `weekday` is always derived from `date`, never stored.
//! - `Happiness` only holds values from {1.0, 1.5, ..., 5.0}.
//! - `AttachmentDuration` minutes and seconds are below 60.

use crate::calendar::{month_of, weekday_of};
use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

static DURATION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,4}):([0-5]\d):([0-5]\d)$").expect("valid duration regex"));
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

/// Validation failures for entry field values.
#[derive(Debug, Clone, PartialEq)]
pub enum EntryValidationError {
    /// Rating is not one of the half-step values between 1.0 and 5.0.
    RatingOutOfRange(f64),
    /// Duration text is not `H:MM:SS`.
    MalformedDuration(String),
}

impl Display for EntryValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RatingOutOfRange(value) => write!(
                f,
                "happiness rating {value} is outside {{1.0, 1.5, ..., 5.0}}"
            ),
            Self::MalformedDuration(text) => {
                write!(f, "malformed attachment duration `{text}` (expected H:MM:SS)")
            }
        }
    }
}

impl Error for EntryValidationError {}

/// Discrete mood rating in half steps from 1.0 to 5.0.
///
/// Stored as a count of half points so equality and hashing are exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Happiness(u8);

impl Happiness {
    pub const MIN: Happiness = Happiness(2);
    pub const MAX: Happiness = Happiness(10);

    /// Validates a numeric rating.
    pub fn new(value: f64) -> Result<Self, EntryValidationError> {
        let doubled = value * 2.0;
        if doubled.fract() != 0.0 || !(2.0..=10.0).contains(&doubled) {
            return Err(EntryValidationError::RatingOutOfRange(value));
        }
        Ok(Self(doubled as u8))
    }

    /// Parses decimal text such as `3.5`.
    pub fn parse(text: &str) -> Result<Self, EntryValidationError> {
        let value = text
            .trim()
            .parse::<f64>()
            .map_err(|_| EntryValidationError::RatingOutOfRange(f64::NAN))?;
        Self::new(value)
    }

    /// Every allowed rating, lowest first.
    pub fn all() -> impl Iterator<Item = Happiness> {
        (Self::MIN.0..=Self::MAX.0).map(Happiness)
    }

    pub fn value(self) -> f64 {
        f64::from(self.0) / 2.0
    }
}

impl TryFrom<f64> for Happiness {
    type Error = EntryValidationError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Happiness> for f64 {
    fn from(value: Happiness) -> Self {
        value.value()
    }
}

impl Display for Happiness {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.1}", self.value())
    }
}

/// Length of a linked recording.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AttachmentDuration {
    total_seconds: u32,
}

impl AttachmentDuration {
    pub fn from_seconds(total_seconds: u32) -> Self {
        Self { total_seconds }
    }

    /// Parses `H:MM:SS` text (hours may have up to four digits).
    pub fn parse(text: &str) -> Result<Self, EntryValidationError> {
        let trimmed = text.trim();
        let malformed = || EntryValidationError::MalformedDuration(text.to_string());
        let captures = DURATION_RE.captures(trimmed).ok_or_else(malformed)?;

        let mut parts = [0_u32; 3];
        for (slot, index) in parts.iter_mut().zip(1..=3) {
            *slot = captures[index].parse().map_err(|_| malformed())?;
        }
        let [hours, minutes, seconds] = parts;

        Ok(Self::from_seconds(hours * 3600 + minutes * 60 + seconds))
    }

    pub fn total_seconds(self) -> u32 {
        self.total_seconds
    }

    pub fn hours(self) -> u32 {
        self.total_seconds / 3600
    }

    pub fn minutes(self) -> u32 {
        self.total_seconds % 3600 / 60
    }

    pub fn seconds(self) -> u32 {
        self.total_seconds % 60
    }
}

impl Display for AttachmentDuration {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{:02}:{:02}",
            self.hours(),
            self.minutes(),
            self.seconds()
        )
    }
}

impl TryFrom<String> for AttachmentDuration {
    type Error = EntryValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<AttachmentDuration> for String {
    fn from(value: AttachmentDuration) -> Self {
        value.to_string()
    }
}

/// Canonical diary record for one calendar date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    date: NaiveDate,
    /// Free-text description of the day.
    pub summary: Option<String>,
    /// Mood rating for the day.
    pub happiness: Option<Happiness>,
    /// Length of a recording linked to the day.
    pub attachment: Option<AttachmentDuration>,
    /// People mentioned, in the order given, display-cased.
    pub people: Vec<String>,
}

impl Entry {
    /// Creates an entry with no content for `date`.
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            summary: None,
            happiness: None,
            attachment: None,
            people: Vec::new(),
        }
    }

    /// Builds an entry for `date` from collaborator-supplied content.
    pub fn from_draft(date: NaiveDate, draft: EntryDraft) -> Self {
        let draft = draft.normalized();
        Self {
            date,
            summary: draft.summary,
            happiness: draft.happiness,
            attachment: draft.attachment,
            people: draft.people,
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn year(&self) -> i32 {
        self.date.year()
    }

    pub fn weekday(&self) -> &'static str {
        weekday_of(self.date)
    }

    pub fn month(&self) -> &'static str {
        month_of(self.date)
    }
}

/// Entry content for one date, as supplied by the prompting collaborator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryDraft {
    pub summary: Option<String>,
    pub happiness: Option<Happiness>,
    pub attachment: Option<AttachmentDuration>,
    pub people: Vec<String>,
}

impl EntryDraft {
    /// Drops blank summaries and names and display-cases the rest.
    pub fn normalized(self) -> Self {
        Self {
            summary: self.summary.filter(|text| !text.trim().is_empty()),
            happiness: self.happiness,
            attachment: self.attachment,
            people: self
                .people
                .iter()
                .filter_map(|name| canonical_person_name(name))
                .collect(),
        }
    }
}

/// Title-cases a person name and collapses inner whitespace.
///
/// Returns `None` for blank input.
pub fn canonical_person_name(raw: &str) -> Option<String> {
    let collapsed = WHITESPACE_RE.replace_all(raw.trim(), " ");
    if collapsed.is_empty() {
        return None;
    }

    let words = collapsed
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>();

    Some(words.join(" "))
}

#[cfg(test)]
mod tests {
    use super::{canonical_person_name, AttachmentDuration, EntryValidationError, Happiness};

    #[test]
    fn happiness_accepts_only_half_steps() {
        assert_eq!(Happiness::new(3.5).unwrap().value(), 3.5);
        assert_eq!(Happiness::all().count(), 9);
        for bad in [0.5, 5.5, 3.2, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                Happiness::new(bad),
                Err(EntryValidationError::RatingOutOfRange(_))
            ));
        }
    }

    #[test]
    fn duration_parses_and_formats() {
        let duration = AttachmentDuration::parse("1:02:03").unwrap();
        assert_eq!(duration.total_seconds(), 3723);
        assert_eq!(duration.to_string(), "1:02:03");
        assert_eq!(AttachmentDuration::parse("00:45:00").unwrap().to_string(), "0:45:00");
        assert!(AttachmentDuration::parse("1:60:00").is_err());
        assert!(AttachmentDuration::parse("ten minutes").is_err());
    }

    #[test]
    fn person_names_are_title_cased() {
        assert_eq!(canonical_person_name("john   DOE").as_deref(), Some("John Doe"));
        assert_eq!(canonical_person_name("  "), None);
    }
}
