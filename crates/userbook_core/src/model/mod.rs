//! Domain model for registered user records.
//!
//! # Responsibility
//! - Define the canonical record shape shared by store and controllers.
//! - Own the field validation policies used before any store call.
//!
//! # Invariants
//! - Every persisted record is identified by a store-assigned `RecordId`.
//! - Only `name`, `email` and `phone` are mutable after creation.

pub mod record;
