//! Core domain logic for Userbook.
//! This crate owns the record model, the record store contract and the
//! headless controllers behind the registration and user-list views.

pub mod clock;
pub mod config;
pub mod controller;
pub mod logging;
pub mod model;
pub mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{load_config, ConfigError, CoreConfig};
pub use controller::notice::{Notice, NoticeKind};
pub use controller::record_list::{
    filter_by_name, project, sort_records, DeleteState, EditState, EditView, ListError,
    ListResult, RecordListController, RecordListView, RecordRow, SortOrder, SortState,
};
pub use controller::registration::{
    BannerExpiry, RegistrationError, RegistrationForm, SubmitTicket, DEFAULT_SUCCESS_BANNER_MS,
};
pub use logging::{default_log_level, init_logging, init_logging_from_config, logging_status};
pub use model::record::{
    Field, NewRecord, Record, RecordFields, RecordId, RecordPatch, ValidationError,
};
pub use store::bootstrap::{open_db, open_db_in_memory, SCHEMA_VERSION};
pub use store::record_store::{RecordStore, StoreError, StoreResult};
pub use store::sqlite::SqliteRecordStore;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
