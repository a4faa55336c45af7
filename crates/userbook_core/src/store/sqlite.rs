//! SQLite-backed record collection.
//!
//! # Invariants
//! - List order is `created_at ASC, id ASC`.
//! - `NULL` text columns are read back as empty strings.
//! - Read paths reject rows whose id is not a valid non-nil UUID.

use crate::model::record::{NewRecord, Record, RecordId, RecordPatch};
use crate::store::record_store::{RecordStore, StoreError, StoreResult};
use log::{error, info};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use std::time::Instant;
use uuid::Uuid;

const RECORD_SELECT_SQL: &str = "SELECT id, name, email, phone, created_at FROM records";

/// Record store over the `records` table of one connection.
pub struct SqliteRecordStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteRecordStore<'conn> {
    /// Wraps a connection returned by `open_db`/`open_db_in_memory`.
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Loads one record by id. Returns `None` when absent.
    pub fn get(&self, id: RecordId) -> StoreResult<Option<Record>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{RECORD_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_record_row(row)?)),
            None => Ok(None),
        }
    }
}

impl RecordStore for SqliteRecordStore<'_> {
    fn list(&self) -> StoreResult<Vec<Record>> {
        let started_at = Instant::now();
        let result = self.list_inner();

        match &result {
            Ok(records) => info!(
                "event=record_list module=store status=ok count={} duration_ms={}",
                records.len(),
                started_at.elapsed().as_millis()
            ),
            Err(err) => log_failure("record_list", None, started_at, err),
        }
        result
    }

    fn create(&self, new: &NewRecord) -> StoreResult<Record> {
        let started_at = Instant::now();
        let record = Record::from_new(Uuid::new_v4(), new);
        let result = self
            .conn
            .execute(
                "INSERT INTO records (id, name, email, phone, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5);",
                params![
                    record.id.to_string(),
                    record.name.as_str(),
                    record.email.as_str(),
                    record.phone.as_str(),
                    record.created_at,
                ],
            )
            .map(|_| record)
            .map_err(StoreError::from);

        match &result {
            Ok(record) => info!(
                "event=record_create module=store status=ok id={} duration_ms={}",
                record.id,
                started_at.elapsed().as_millis()
            ),
            Err(err) => log_failure("record_create", None, started_at, err),
        }
        result
    }

    fn update(&self, id: RecordId, patch: &RecordPatch) -> StoreResult<()> {
        let started_at = Instant::now();
        let result = self.update_inner(id, patch);
        match &result {
            Ok(()) => info!(
                "event=record_update module=store status=ok id={id} duration_ms={}",
                started_at.elapsed().as_millis()
            ),
            Err(err) => log_failure("record_update", Some(id), started_at, err),
        }
        result
    }

    fn delete(&self, id: RecordId) -> StoreResult<()> {
        let started_at = Instant::now();
        let result = self
            .conn
            .execute("DELETE FROM records WHERE id = ?1;", [id.to_string()])
            .map_err(StoreError::from)
            .and_then(|changed| {
                if changed == 0 {
                    Err(StoreError::NotFound(id))
                } else {
                    Ok(())
                }
            });

        match &result {
            Ok(()) => info!(
                "event=record_delete module=store status=ok id={id} duration_ms={}",
                started_at.elapsed().as_millis()
            ),
            Err(err) => log_failure("record_delete", Some(id), started_at, err),
        }
        result
    }
}

impl SqliteRecordStore<'_> {
    fn list_inner(&self) -> StoreResult<Vec<Record>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{RECORD_SELECT_SQL} ORDER BY created_at ASC, id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            records.push(parse_record_row(row)?);
        }
        Ok(records)
    }

    fn update_inner(&self, id: RecordId, patch: &RecordPatch) -> StoreResult<()> {
        if patch.is_empty() {
            // Nothing to write, but the target must still exist.
            return match self.get(id)? {
                Some(_) => Ok(()),
                None => Err(StoreError::NotFound(id)),
            };
        }

        let mut assignments = Vec::new();
        let mut bind_values: Vec<Value> = Vec::new();
        for (column, value) in [
            ("name", &patch.name),
            ("email", &patch.email),
            ("phone", &patch.phone),
        ] {
            if let Some(value) = value {
                assignments.push(format!("{column} = ?"));
                bind_values.push(Value::Text(value.clone()));
            }
        }

        let sql = format!("UPDATE records SET {} WHERE id = ?;", assignments.join(", "));
        bind_values.push(Value::Text(id.to_string()));
        let changed = self.conn.execute(&sql, params_from_iter(bind_values))?;
        if changed == 0 {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }
}

fn parse_record_row(row: &Row<'_>) -> StoreResult<Record> {
    let id_text: String = row.get("id")?;
    let id = Uuid::parse_str(&id_text)
        .ok()
        .filter(|id| !id.is_nil())
        .ok_or_else(|| {
            StoreError::InvalidData(format!("invalid id `{id_text}` in records.id"))
        })?;

    Ok(Record {
        id,
        name: row.get::<_, Option<String>>("name")?.unwrap_or_default(),
        email: row.get::<_, Option<String>>("email")?.unwrap_or_default(),
        phone: row.get::<_, Option<String>>("phone")?.unwrap_or_default(),
        created_at: row.get("created_at")?,
    })
}

fn log_failure(event: &str, id: Option<RecordId>, started_at: Instant, err: &StoreError) {
    let id = id.map(|id| id.to_string()).unwrap_or_else(|| "-".to_string());
    error!(
        "event={event} module=store status=error id={id} duration_ms={} error={}",
        started_at.elapsed().as_millis(),
        err
    );
}
