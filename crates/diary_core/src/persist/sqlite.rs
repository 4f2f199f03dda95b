//! SQLite entry backend.
//!
//! # Responsibility
//! - Persist entries in the `entries` table created by migrations.
//!
//! # Invariants
//! - `date` is the primary key, so a second row for one date is rejected by
//!   the database as well as by the store.
//! - `rewrite_all` replaces the table contents in one transaction.
//! - Read paths reject invalid persisted state instead of masking it.

use super::record::{
    check_derived, happiness_from_value, join_people, parse_stored_date, split_people,
};
use super::{EntryBackend, PersistError, PersistResult};
use crate::calendar::format_date;
use crate::db::{open_db, open_db_in_memory};
use crate::model::entry::{AttachmentDuration, Entry};
use log::{debug, info};
use rusqlite::{params, Connection, Row};
use std::path::Path;

const ENTRY_SELECT_SQL: &str = "SELECT
    date,
    year,
    month,
    weekday,
    summary,
    happiness,
    attachment_seconds,
    people
FROM entries
ORDER BY date ASC";

const ENTRY_INSERT_SQL: &str = "INSERT INTO entries (
    date,
    year,
    month,
    weekday,
    summary,
    happiness,
    attachment_seconds,
    people
) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);";

/// Entry backend stored in a migrated SQLite database.
pub struct SqliteBackend {
    conn: Connection,
}

impl SqliteBackend {
    /// Opens the database file at `path`, applying pending migrations.
    pub fn open(path: impl AsRef<Path>) -> PersistResult<Self> {
        Ok(Self {
            conn: open_db(path)?,
        })
    }

    pub fn open_in_memory() -> PersistResult<Self> {
        Ok(Self {
            conn: open_db_in_memory()?,
        })
    }
}

impl EntryBackend for SqliteBackend {
    fn load_all(&mut self) -> PersistResult<Vec<Entry>> {
        let mut stmt = self.conn.prepare(ENTRY_SELECT_SQL)?;
        let mut rows = stmt.query([])?;
        let mut entries = Vec::new();

        while let Some(row) = rows.next()? {
            entries.push(parse_entry_row(row)?);
        }

        info!(
            "event=entries_load module=persist backend=sqlite status=ok count={}",
            entries.len()
        );
        Ok(entries)
    }

    fn append_one(&mut self, entry: &Entry) -> PersistResult<()> {
        insert_entry(&self.conn, entry)?;
        debug!(
            "event=entry_append module=persist backend=sqlite status=ok date={}",
            format_date(entry.date())
        );
        Ok(())
    }

    fn rewrite_all(&mut self, entries: &mut dyn Iterator<Item = &Entry>) -> PersistResult<()> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM entries;", [])?;
        let mut count = 0_usize;
        for entry in entries {
            insert_entry(&tx, entry)?;
            count += 1;
        }
        tx.commit()?;

        info!("event=entries_rewrite module=persist backend=sqlite status=ok count={count}");
        Ok(())
    }
}

fn insert_entry(conn: &Connection, entry: &Entry) -> PersistResult<()> {
    conn.execute(
        ENTRY_INSERT_SQL,
        params![
            format_date(entry.date()),
            entry.year(),
            entry.month(),
            entry.weekday(),
            entry.summary.as_deref().filter(|text| !text.is_empty()),
            entry.happiness.map(|rating| rating.value()),
            entry.attachment.map(|duration| duration.total_seconds()),
            join_people(&entry.people)?,
        ],
    )?;
    Ok(())
}

fn parse_entry_row(row: &Row<'_>) -> PersistResult<Entry> {
    let date_text: String = row.get("date")?;
    let location = format!("entries row `{date_text}`");
    let date = parse_stored_date(&date_text, &location)?;

    let year: i64 = row.get("year")?;
    let month: String = row.get("month")?;
    let weekday: String = row.get("weekday")?;
    check_derived(date, year, &month, &weekday, &location)?;

    let attachment = match row.get::<_, Option<i64>>("attachment_seconds")? {
        Some(seconds) => Some(
            u32::try_from(seconds)
                .map(AttachmentDuration::from_seconds)
                .map_err(|_| PersistError::CorruptRecord {
                    location: location.clone(),
                    message: format!("invalid attachment_seconds `{seconds}`"),
                })?,
        ),
        None => None,
    };

    let mut entry = Entry::new(date);
    entry.summary = row
        .get::<_, Option<String>>("summary")?
        .filter(|text| !text.is_empty());
    entry.happiness = happiness_from_value(row.get("happiness")?, &location)?;
    entry.attachment = attachment;
    entry.people = split_people(&row.get::<_, String>("people")?);
    Ok(entry)
}
