//! Comma-delimited text file backend.
//!
//! # Responsibility
//! - Persist one record per date in a UTF-8 file with a header row.
//! - Append single records and rewrite the whole file, both atomically.
//!
//! # Invariants
//! - Fields containing `,`, `"` or line breaks are quoted; quotes are doubled.
//! - Appends and rewrites go to a temporary sibling file that is renamed over
//!   the target, so readers see either the old or the new file, never a
//!   partial one.
//! - Every record, including the last, ends with `\n`. A final record
//!   without one is reported as corrupt rather than loaded.

use super::record::{
    attachment_from_text, check_derived, happiness_from_text, join_people, parse_stored_date,
    split_people, RECORD_FIELDS, RECORD_FIELDS_HEADER,
};
use super::{EntryBackend, PersistError, PersistResult};
use crate::calendar::format_date;
use crate::model::entry::Entry;
use log::{debug, info};
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use tempfile::NamedTempFile;

const FIELD_DELIMITER: char = ',';
const QUOTE: char = '"';
const TRUNCATED_RECORD: &str = "record has no line ending; the file may be truncated";

/// Entry backend stored as a delimited text file.
#[derive(Debug, Clone)]
pub struct CsvFileBackend {
    path: PathBuf,
}

impl CsvFileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn io_error(&self, source: std::io::Error) -> PersistError {
        PersistError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn has_content(&self) -> PersistResult<bool> {
        match fs::metadata(&self.path) {
            Ok(meta) => Ok(meta.len() > 0),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(self.io_error(err)),
        }
    }

    fn replace_contents(&self, contents: &str) -> PersistResult<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir).map_err(|err| self.io_error(err))?;

        let mut staged = NamedTempFile::new_in(&dir).map_err(|err| self.io_error(err))?;
        staged
            .write_all(contents.as_bytes())
            .and_then(|()| staged.as_file().sync_all())
            .map_err(|err| self.io_error(err))?;
        staged
            .persist(&self.path)
            .map_err(|err| self.io_error(err.error))?;
        Ok(())
    }
}

impl EntryBackend for CsvFileBackend {
    fn load_all(&mut self) -> PersistResult<Vec<Entry>> {
        if !self.has_content()? {
            info!("event=entries_load module=persist backend=csv status=ok count=0 reason=empty");
            return Ok(Vec::new());
        }

        let text = fs::read_to_string(&self.path).map_err(|err| self.io_error(err))?;
        let mut records = parse_records(&text)?.into_iter();

        let Some((_, header)) = records.next() else {
            return Ok(Vec::new());
        };
        if header != RECORD_FIELDS {
            return Err(PersistError::CorruptRecord {
                location: "line 1".to_string(),
                message: format!("unexpected header `{}`", header.join(",")),
            });
        }

        let entries = records
            .map(|(line, fields)| decode_record(line, &fields))
            .collect::<PersistResult<Vec<_>>>()?;

        info!(
            "event=entries_load module=persist backend=csv status=ok count={}",
            entries.len()
        );
        Ok(entries)
    }

    fn append_one(&mut self, entry: &Entry) -> PersistResult<()> {
        let record = encode_record(entry)?;

        let mut contents = if self.has_content()? {
            fs::read_to_string(&self.path).map_err(|err| self.io_error(err))?
        } else {
            encode_header()
        };
        if !contents.ends_with('\n') {
            return Err(PersistError::CorruptRecord {
                location: format!("line {}", contents.lines().count()),
                message: TRUNCATED_RECORD.to_string(),
            });
        }
        contents.push_str(&record);
        self.replace_contents(&contents)?;

        debug!(
            "event=entry_append module=persist backend=csv status=ok date={}",
            format_date(entry.date())
        );
        Ok(())
    }

    fn rewrite_all(&mut self, entries: &mut dyn Iterator<Item = &Entry>) -> PersistResult<()> {
        // Encode everything before touching the file so a bad record aborts
        // the rewrite with the old file still in place.
        let mut contents = encode_header();
        let mut count = 0_usize;
        for entry in entries {
            contents.push_str(&encode_record(entry)?);
            count += 1;
        }

        self.replace_contents(&contents)?;
        info!("event=entries_rewrite module=persist backend=csv status=ok count={count}");
        Ok(())
    }
}

fn encode_header() -> String {
    RECORD_FIELDS_HEADER.to_string()
}

fn encode_record(entry: &Entry) -> PersistResult<String> {
    let fields = [
        format_date(entry.date()),
        entry.year().to_string(),
        entry.month().to_string(),
        entry.weekday().to_string(),
        entry.summary.clone().unwrap_or_default(),
        entry.happiness.map(|h| h.to_string()).unwrap_or_default(),
        entry.attachment.map(|d| d.to_string()).unwrap_or_default(),
        join_people(&entry.people)?,
    ];

    let mut line = fields
        .iter()
        .map(|field| quote_field(field))
        .collect::<Vec<_>>()
        .join(&FIELD_DELIMITER.to_string());
    line.push('\n');
    Ok(line)
}

fn decode_record(line: usize, fields: &[String]) -> PersistResult<Entry> {
    let location = format!("line {line}");
    let [date, year, month, weekday, summary, happiness, attachment, people] = fields else {
        return Err(PersistError::CorruptRecord {
            location,
            message: format!(
                "expected {} fields, found {}",
                RECORD_FIELDS.len(),
                fields.len()
            ),
        });
    };

    let date = parse_stored_date(date, &location)?;
    let year = year
        .trim()
        .parse::<i64>()
        .map_err(|_| PersistError::CorruptRecord {
            location: location.clone(),
            message: format!("year `{year}` is not a number"),
        })?;
    check_derived(date, year, month, weekday, &location)?;

    let mut entry = Entry::new(date);
    entry.summary = Some(summary.clone()).filter(|text| !text.is_empty());
    entry.happiness = happiness_from_text(happiness, &location)?;
    entry.attachment = attachment_from_text(attachment, &location)?;
    entry.people = split_people(people);
    Ok(entry)
}

fn quote_field(field: &str) -> String {
    if !field.contains([FIELD_DELIMITER, QUOTE, '\n', '\r']) {
        return field.to_string();
    }
    let escaped = field.replace(QUOTE, "\"\"");
    format!("{QUOTE}{escaped}{QUOTE}")
}

/// Splits delimited text into records, tracking the line each record starts on.
///
/// Quoted fields may span lines. A trailing newline does not produce an empty
/// record; blank lines between records are skipped. Text that stops inside a
/// record is an error.
fn parse_records(text: &str) -> PersistResult<Vec<(usize, Vec<String>)>> {
    let mut records = Vec::new();
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut line = 1_usize;
    let mut record_line = 1_usize;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        if in_quotes {
            match ch {
                QUOTE if chars.peek() == Some(&QUOTE) => {
                    chars.next();
                    field.push(QUOTE);
                }
                QUOTE => in_quotes = false,
                '\n' => {
                    line += 1;
                    field.push(ch);
                }
                _ => field.push(ch),
            }
            continue;
        }

        match ch {
            QUOTE if field.is_empty() => in_quotes = true,
            FIELD_DELIMITER => fields.push(std::mem::take(&mut field)),
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' => {
                if !fields.is_empty() || !field.is_empty() {
                    fields.push(std::mem::take(&mut field));
                    records.push((record_line, std::mem::take(&mut fields)));
                }
                line += 1;
                record_line = line;
            }
            _ => field.push(ch),
        }
    }

    if in_quotes {
        return Err(PersistError::CorruptRecord {
            location: format!("line {record_line}"),
            message: format!("unterminated quoted field; {TRUNCATED_RECORD}"),
        });
    }
    if !fields.is_empty() || !field.is_empty() {
        return Err(PersistError::CorruptRecord {
            location: format!("line {record_line}"),
            message: TRUNCATED_RECORD.to_string(),
        });
    }

    Ok(records)
}
