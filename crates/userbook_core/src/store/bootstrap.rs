//! Opens the SQLite file that holds the record collection.
//!
//! The `records` table is created on first open and stamped with
//! `PRAGMA user_version = 1`. Files stamped with a newer version are refused
//! rather than read with a schema this binary does not know.

use crate::store::record_store::{StoreError, StoreResult};
use log::{error, info};
use rusqlite::Connection;
use std::path::Path;
use std::time::{Duration, Instant};

/// `user_version` written by this binary.
pub const SCHEMA_VERSION: u32 = 1;

const RECORDS_SCHEMA_SQL: &str = include_str!("records_v1.sql");
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Opens (or creates) a record database file.
pub fn open_db(path: impl AsRef<Path>) -> StoreResult<Connection> {
    let path = path.as_ref();
    open_with("file", || Connection::open(path))
}

/// Opens a throwaway in-memory record database.
pub fn open_db_in_memory() -> StoreResult<Connection> {
    open_with("memory", Connection::open_in_memory)
}

fn open_with(
    mode: &'static str,
    connect: impl FnOnce() -> rusqlite::Result<Connection>,
) -> StoreResult<Connection> {
    let started_at = Instant::now();
    let result = connect().map_err(StoreError::from).and_then(|conn| {
        conn.busy_timeout(BUSY_TIMEOUT)?;
        let created = ensure_records_schema(&conn)?;
        Ok((conn, created))
    });

    match result {
        Ok((conn, created)) => {
            info!(
                "event=store_open module=store status=ok mode={mode} schema_created={created} duration_ms={}",
                started_at.elapsed().as_millis()
            );
            Ok(conn)
        }
        Err(err) => {
            error!(
                "event=store_open module=store status=error mode={mode} duration_ms={} error={}",
                started_at.elapsed().as_millis(),
                err
            );
            Err(err)
        }
    }
}

/// Creates the `records` table on a fresh file. Returns whether it did.
fn ensure_records_schema(conn: &Connection) -> StoreResult<bool> {
    let found: u32 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;
    match found {
        0 => {
            let tx = conn.unchecked_transaction()?;
            tx.execute_batch(RECORDS_SCHEMA_SQL)?;
            tx.pragma_update(None, "user_version", SCHEMA_VERSION)?;
            tx.commit()?;
            Ok(true)
        }
        SCHEMA_VERSION => Ok(false),
        found => Err(StoreError::UnsupportedSchema {
            found,
            supported: SCHEMA_VERSION,
        }),
    }
}
