//! Record store capability and persistence implementations.
//!
//! # Responsibility
//! - Define the minimal CRUD contract controllers depend on.
//! - Keep SQL details, including schema bootstrap, behind the store boundary.
//!
//! # Invariants
//! - `create` assigns the record id; callers never choose it.
//! - `update`/`delete` on an unknown id return `StoreError::NotFound`.
//! - A failed call leaves the collection unchanged.

pub mod bootstrap;
pub mod record_store;
pub mod sqlite;
