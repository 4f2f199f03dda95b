//! Ordered schema scripts for the diary database.
//!
//! The schema version lives in `PRAGMA user_version`; scripts run in
//! version order inside a single transaction.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::{Connection, Transaction};

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "entries",
    sql: include_str!("0001_entries.sql"),
}];

/// Highest schema version this build can create.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |migration| migration.version)
}

/// Schema version stored in the database file.
pub fn schema_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?)
}

/// Brings `conn` up to [`latest_version`]. Returns how many scripts ran.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<usize> {
    let found = schema_version(conn)?;
    let supported = latest_version();
    if found > supported {
        return Err(DbError::SchemaTooNew { found, supported });
    }

    let pending = MIGRATIONS
        .iter()
        .filter(|migration| migration.version > found)
        .collect::<Vec<_>>();
    if pending.is_empty() {
        return Ok(0);
    }

    let tx = conn.transaction()?;
    for migration in &pending {
        run_one(&tx, migration)?;
    }
    tx.commit()?;

    info!(
        "event=db_migrate module=db status=ok from={found} to={supported} applied={}",
        pending.len()
    );
    Ok(pending.len())
}

fn run_one(tx: &Transaction<'_>, migration: &Migration) -> DbResult<()> {
    let script = format!(
        "{}\nPRAGMA user_version = {};",
        migration.sql, migration.version
    );
    tx.execute_batch(&script).map_err(|source| DbError::Migration {
        version: migration.version,
        name: migration.name,
        source,
    })
}
