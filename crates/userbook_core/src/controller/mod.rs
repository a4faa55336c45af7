//! Headless UI controllers.
//!
//! # Responsibility
//! - Own transient view state for the listing and registration views.
//! - Mediate every user action against a `RecordStore`.
//!
//! # Invariants
//! - All mutation goes through `&mut self`; there is no shared state.
//! - A failed store call never mutates in-memory records.
//! - Controllers stay usable after any error.

pub mod notice;
pub mod record_list;
pub mod registration;
