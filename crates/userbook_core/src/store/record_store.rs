//! `RecordStore` contract and its error type.

use crate::model::record::{NewRecord, Record, RecordId, RecordPatch};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StoreResult<T> = Result<T, StoreError>;

/// Failure reported by a record store.
#[derive(Debug)]
pub enum StoreError {
    Sqlite(rusqlite::Error),
    /// The database file was written by a newer schema.
    UnsupportedSchema { found: u32, supported: u32 },
    NotFound(RecordId),
    InvalidData(String),
    /// Transport-level failure (network, permission) from a remote store.
    Unavailable(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::UnsupportedSchema { found, supported } => write!(
                f,
                "record database schema version {found} is newer than supported {supported}"
            ),
            Self::NotFound(id) => write!(f, "record not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid stored record data: {message}"),
            Self::Unavailable(message) => write!(f, "record store unavailable: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            _ => None,
        }
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

/// CRUD capability over one record collection.
pub trait RecordStore {
    /// Returns every record in the collection.
    fn list(&self) -> StoreResult<Vec<Record>>;
    /// Persists a new record and returns it with its assigned id.
    fn create(&self, new: &NewRecord) -> StoreResult<Record>;
    /// Applies a partial update to one record.
    fn update(&self, id: RecordId, patch: &RecordPatch) -> StoreResult<()>;
    /// Removes one record permanently.
    fn delete(&self, id: RecordId) -> StoreResult<()>;
}

impl<S: RecordStore + ?Sized> RecordStore for &S {
    fn list(&self) -> StoreResult<Vec<Record>> {
        (**self).list()
    }

    fn create(&self, new: &NewRecord) -> StoreResult<Record> {
        (**self).create(new)
    }

    fn update(&self, id: RecordId, patch: &RecordPatch) -> StoreResult<()> {
        (**self).update(id, patch)
    }

    fn delete(&self, id: RecordId) -> StoreResult<()> {
        (**self).delete(id)
    }
}

impl<S: RecordStore + ?Sized> RecordStore for Box<S> {
    fn list(&self) -> StoreResult<Vec<Record>> {
        (**self).list()
    }

    fn create(&self, new: &NewRecord) -> StoreResult<Record> {
        (**self).create(new)
    }

    fn update(&self, id: RecordId, patch: &RecordPatch) -> StoreResult<()> {
        (**self).update(id, patch)
    }

    fn delete(&self, id: RecordId) -> StoreResult<()> {
        (**self).delete(id)
    }
}
