//! Field-level encoding shared by the persistence backends.

use super::{PersistError, PersistResult};
use crate::calendar::{month_of, parse_iso_date, weekday_of};
use crate::model::entry::{AttachmentDuration, Happiness};
use chrono::{Datelike, NaiveDate};

/// Persisted field order, one record per date.
pub const RECORD_FIELDS: [&str; 8] = [
    "date",
    "year",
    "month",
    "weekday",
    "summary",
    "happiness",
    "attachment_duration",
    "people",
];

/// Header row written at the top of delimited files.
pub const RECORD_FIELDS_HEADER: &str =
    "date,year,month,weekday,summary,happiness,attachment_duration,people\n";

/// Joins the people of one entry inside a single field.
pub const PEOPLE_SEPARATOR: char = ';';

pub(crate) fn join_people(people: &[String]) -> PersistResult<String> {
    if let Some(name) = people.iter().find(|name| name.contains(PEOPLE_SEPARATOR)) {
        return Err(PersistError::UnencodablePerson(name.clone()));
    }
    Ok(people.join(&PEOPLE_SEPARATOR.to_string()))
}

pub(crate) fn split_people(text: &str) -> Vec<String> {
    text.split(PEOPLE_SEPARATOR)
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

pub(crate) fn parse_stored_date(text: &str, location: &str) -> PersistResult<NaiveDate> {
    parse_iso_date(text).map_err(|source| PersistError::MalformedDate {
        location: location.to_string(),
        source,
    })
}

/// Rejects records whose redundant columns disagree with their date.
pub(crate) fn check_derived(
    date: NaiveDate,
    year: i64,
    month: &str,
    weekday: &str,
    location: &str,
) -> PersistResult<()> {
    let mismatch = |column: &str, stored: String, expected: String| PersistError::CorruptRecord {
        location: location.to_string(),
        message: format!("{column} `{stored}` does not match date (expected `{expected}`)"),
    };

    if year != i64::from(date.year()) {
        return Err(mismatch("year", year.to_string(), date.year().to_string()));
    }
    if month != month_of(date) {
        return Err(mismatch("month", month.to_string(), month_of(date).to_string()));
    }
    if weekday != weekday_of(date) {
        return Err(mismatch(
            "weekday",
            weekday.to_string(),
            weekday_of(date).to_string(),
        ));
    }
    Ok(())
}

pub(crate) fn happiness_from_value(
    value: Option<f64>,
    location: &str,
) -> PersistResult<Option<Happiness>> {
    value
        .map(Happiness::new)
        .transpose()
        .map_err(|source| PersistError::InvalidField {
            location: location.to_string(),
            source,
        })
}

pub(crate) fn happiness_from_text(text: &str, location: &str) -> PersistResult<Option<Happiness>> {
    if text.trim().is_empty() {
        return Ok(None);
    }
    Happiness::parse(text)
        .map(Some)
        .map_err(|source| PersistError::InvalidField {
            location: location.to_string(),
            source,
        })
}

pub(crate) fn attachment_from_text(
    text: &str,
    location: &str,
) -> PersistResult<Option<AttachmentDuration>> {
    if text.trim().is_empty() {
        return Ok(None);
    }
    AttachmentDuration::parse(text)
        .map(Some)
        .map_err(|source| PersistError::InvalidField {
            location: location.to_string(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::{check_derived, join_people, split_people, RECORD_FIELDS, RECORD_FIELDS_HEADER};
    use crate::persist::PersistError;
    use chrono::NaiveDate;

    #[test]
    fn header_lists_every_field_in_order() {
        assert_eq!(RECORD_FIELDS_HEADER.trim_end(), RECORD_FIELDS.join(","));
    }

    #[test]
    fn people_round_trip_through_separator() {
        let people = vec!["John Doe".to_string(), "Ann".to_string()];
        let joined = join_people(&people).unwrap();
        assert_eq!(joined, "John Doe;Ann");
        assert_eq!(split_people(&joined), people);
        assert!(split_people("").is_empty());
    }

    #[test]
    fn separator_inside_name_is_rejected() {
        let err = join_people(&["A;B".to_string()]).unwrap_err();
        assert!(matches!(err, PersistError::UnencodablePerson(name) if name == "A;B"));
    }

    #[test]
    fn derived_columns_must_match_date() {
        let date = NaiveDate::from_ymd_opt(2021, 2, 1).unwrap();
        check_derived(date, 2021, "February", "Monday", "line 2").unwrap();
        let err = check_derived(date, 2021, "February", "Sunday", "line 2").unwrap_err();
        assert!(err.to_string().contains("weekday"));
    }
}
