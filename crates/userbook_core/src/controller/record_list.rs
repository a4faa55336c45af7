//! Record listing controller: search, sort, inline edit and delete.
//!
//! # Responsibility
//! - Hold the loaded record set and the listing view state.
//! - Run the edit (`Idle`/`Editing`) and delete (`Idle`/`ConfirmPending`)
//!   state machines against a `RecordStore`.
//! - Project the current state into a `RecordListView` on demand.
//!
//! # Invariants
//! - Sorting reorders the canonical record set, not only the view.
//! - Search matches `name` only, case-insensitively.
//! - At most one record is being edited and at most one awaits delete
//!   confirmation.
//! - Store failures leave records and state machine positions unchanged.

use crate::controller::notice::Notice;
use crate::model::record::{Field, Record, RecordFields, RecordId, ValidationError};
use crate::store::record_store::{RecordStore, StoreError};
use log::{debug, info, warn};
use serde::Serialize;
use std::cmp::Ordering;
use std::error::Error;
use std::fmt::{Display, Formatter};

const MSG_LOAD_FAILED: &str = "Error fetching users";
const MSG_UPDATED: &str = "User updated successfully!";
const MSG_UPDATE_FAILED: &str = "Error updating user";
const MSG_DELETED: &str = "User deleted successfully!";
const MSG_DELETE_FAILED: &str = "Error deleting user";

/// Error returned by listing actions.
#[derive(Debug)]
pub enum ListError {
    Validation(ValidationError),
    Store(StoreError),
    /// The id is not part of the loaded record set.
    UnknownRecord(RecordId),
    /// `submit_edit` called while no edit is active.
    NoActiveEdit,
    /// `confirm_delete` called while no delete awaits confirmation.
    NoPendingDelete,
}

impl Display for ListError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "{err}"),
            Self::UnknownRecord(id) => write!(f, "record is not loaded: {id}"),
            Self::NoActiveEdit => write!(f, "no record is being edited"),
            Self::NoPendingDelete => write!(f, "no record awaits delete confirmation"),
        }
    }
}

impl Error for ListError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for ListError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<StoreError> for ListError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

pub type ListResult<T> = Result<T, ListError>;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn toggled(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }

    /// Column header arrow for the active sort key.
    pub fn arrow(self) -> &'static str {
        match self {
            Self::Asc => "▲",
            Self::Desc => "▼",
        }
    }
}

/// Active sort column and direction. Absent when the list is unsorted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SortState {
    pub key: Field,
    pub order: SortOrder,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum EditState {
    #[default]
    Idle,
    Editing { id: RecordId, draft: RecordFields },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeleteState {
    #[default]
    Idle,
    ConfirmPending { id: RecordId },
}

/// One visible row of the listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordRow {
    pub record: Record,
    pub editing: bool,
    pub pending_delete: bool,
}

/// Draft shown by the inline edit form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EditView {
    pub id: RecordId,
    pub draft: RecordFields,
}

/// Snapshot a host UI renders from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordListView {
    pub rows: Vec<RecordRow>,
    pub total: usize,
    pub search_term: String,
    pub sort: Option<SortState>,
    pub editing: Option<EditView>,
    pub pending_delete: Option<RecordId>,
    pub notice: Option<Notice>,
}

/// Returns records whose name contains `term`, ignoring case.
///
/// An empty term keeps every record. Input order is preserved.
pub fn filter_by_name<'a>(records: &'a [Record], term: &str) -> Vec<&'a Record> {
    let needle = term.to_lowercase();
    records
        .iter()
        .filter(|record| record.name.to_lowercase().contains(&needle))
        .collect()
}

/// Sorts records in place by the lowercase value of `key`.
pub fn sort_records(records: &mut [Record], key: Field, order: SortOrder) {
    records.sort_by(|a, b| {
        let ordering = compare_field(a, b, key);
        match order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    });
}

fn compare_field(a: &Record, b: &Record, key: Field) -> Ordering {
    a.get(key).to_lowercase().cmp(&b.get(key).to_lowercase())
}

/// Projects controller state into a renderable view.
pub fn project(
    records: &[Record],
    search_term: &str,
    sort: Option<SortState>,
    edit: &EditState,
    delete: DeleteState,
    notice: Option<&Notice>,
) -> RecordListView {
    let editing_id = match edit {
        EditState::Editing { id, .. } => Some(*id),
        EditState::Idle => None,
    };
    let pending_delete = match delete {
        DeleteState::ConfirmPending { id } => Some(id),
        DeleteState::Idle => None,
    };

    let rows = filter_by_name(records, search_term)
        .into_iter()
        .map(|record| RecordRow {
            record: record.clone(),
            editing: editing_id == Some(record.id),
            pending_delete: pending_delete == Some(record.id),
        })
        .collect();

    RecordListView {
        rows,
        total: records.len(),
        search_term: search_term.to_string(),
        sort,
        editing: match edit {
            EditState::Editing { id, draft } => Some(EditView {
                id: *id,
                draft: draft.clone(),
            }),
            EditState::Idle => None,
        },
        pending_delete,
        notice: notice.cloned(),
    }
}

/// Controller behind the user-list view.
pub struct RecordListController<S: RecordStore> {
    store: S,
    records: Vec<Record>,
    search_term: String,
    sort: Option<SortState>,
    edit: EditState,
    delete: DeleteState,
    notice: Option<Notice>,
}

impl<S: RecordStore> RecordListController<S> {
    /// Creates an empty controller. Call [`Self::load`] when the view mounts.
    pub fn new(store: S) -> Self {
        Self {
            store,
            records: Vec::new(),
            search_term: String::new(),
            sort: None,
            edit: EditState::Idle,
            delete: DeleteState::Idle,
            notice: None,
        }
    }

    /// Replaces the record set with the store's current contents.
    ///
    /// On failure the set is left empty and an error notice is recorded.
    /// No retry is attempted.
    pub fn load(&mut self) -> ListResult<usize> {
        match self.store.list() {
            Ok(records) => {
                self.records = records;
                self.drop_missing_targets();
                info!(
                    "event=list_load module=controller status=ok count={}",
                    self.records.len()
                );
                Ok(self.records.len())
            }
            Err(err) => {
                self.records.clear();
                self.drop_missing_targets();
                warn!("event=list_load module=controller status=error error={err}");
                self.notice = Some(Notice::error(MSG_LOAD_FAILED));
                Err(err.into())
            }
        }
    }

    /// Loaded records in canonical (possibly sorted) order.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.search_term = term.into();
    }

    /// Records matching the current search term.
    pub fn visible(&self) -> Vec<&Record> {
        filter_by_name(&self.records, &self.search_term)
    }

    pub fn sort(&self) -> Option<SortState> {
        self.sort
    }

    /// Sorts by `key`, toggling direction when `key` is already active.
    ///
    /// A new key always starts ascending.
    pub fn sort_by(&mut self, key: Field) -> SortState {
        let order = match self.sort {
            Some(active) if active.key == key => active.order.toggled(),
            _ => SortOrder::Asc,
        };
        let state = SortState { key, order };
        sort_records(&mut self.records, key, order);
        self.sort = Some(state);
        debug!("event=list_sort module=controller key={key} order={order:?}");
        state
    }

    /// Header arrow for `key`, or `None` when `key` is not the active sort.
    pub fn sort_indicator(&self, key: Field) -> Option<&'static str> {
        self.sort
            .filter(|active| active.key == key)
            .map(|active| active.order.arrow())
    }

    pub fn edit_state(&self) -> &EditState {
        &self.edit
    }

    /// Starts editing `id` and returns the snapshot the draft starts from.
    ///
    /// An edit already in progress is replaced without a dirty check.
    pub fn begin_edit(&mut self, id: RecordId) -> ListResult<RecordFields> {
        let draft = self.find(id).ok_or(ListError::UnknownRecord(id))?.fields();
        debug!("event=edit_begin module=controller id={id}");
        self.edit = EditState::Editing {
            id,
            draft: draft.clone(),
        };
        Ok(draft)
    }

    /// Mutable access to the active draft for field binding.
    pub fn edit_draft_mut(&mut self) -> Option<&mut RecordFields> {
        match &mut self.edit {
            EditState::Editing { draft, .. } => Some(draft),
            EditState::Idle => None,
        }
    }

    /// Validates the draft and writes it to the store.
    ///
    /// # Errors
    /// - `NoActiveEdit` when idle.
    /// - `Validation` when any field is blank; the store is not called.
    /// - `Store` when the update fails; the edit stays active and records are
    ///   unchanged.
    pub fn submit_edit(&mut self) -> ListResult<Record> {
        let (id, draft) = match &self.edit {
            EditState::Editing { id, draft } => (*id, draft.clone()),
            EditState::Idle => return Err(ListError::NoActiveEdit),
        };

        if let Err(err) = draft.validate_for_edit() {
            debug!("event=edit_submit module=controller status=invalid id={id}");
            self.notice = Some(Notice::error(err.to_string()));
            return Err(err.into());
        }

        let patch = draft.to_patch();
        if let Err(err) = self.store.update(id, &patch) {
            warn!("event=edit_submit module=controller status=error id={id} error={err}");
            self.notice = Some(Notice::error(MSG_UPDATE_FAILED));
            return Err(err.into());
        }

        self.edit = EditState::Idle;
        let record = self
            .records
            .iter_mut()
            .find(|record| record.id == id)
            .ok_or(ListError::UnknownRecord(id))?;
        record.apply_patch(&patch);
        info!("event=edit_submit module=controller status=ok id={id}");
        self.notice = Some(Notice::success(MSG_UPDATED));
        Ok(record.clone())
    }

    /// Discards the draft. No-op when idle.
    pub fn cancel_edit(&mut self) {
        if let EditState::Editing { id, .. } = &self.edit {
            debug!("event=edit_cancel module=controller id={id}");
        }
        self.edit = EditState::Idle;
    }

    pub fn delete_state(&self) -> DeleteState {
        self.delete
    }

    /// Marks `id` as awaiting delete confirmation.
    pub fn request_delete(&mut self, id: RecordId) -> ListResult<()> {
        if self.find(id).is_none() {
            return Err(ListError::UnknownRecord(id));
        }
        debug!("event=delete_request module=controller id={id}");
        self.delete = DeleteState::ConfirmPending { id };
        Ok(())
    }

    /// Deletes the pending record from the store and the loaded set.
    ///
    /// # Errors
    /// - `NoPendingDelete` when nothing awaits confirmation; the store is not
    ///   called.
    /// - `Store` when the delete fails; confirmation stays pending.
    pub fn confirm_delete(&mut self) -> ListResult<Record> {
        let DeleteState::ConfirmPending { id } = self.delete else {
            return Err(ListError::NoPendingDelete);
        };

        if let Err(err) = self.store.delete(id) {
            warn!("event=delete_confirm module=controller status=error id={id} error={err}");
            self.notice = Some(Notice::error(MSG_DELETE_FAILED));
            return Err(err.into());
        }

        self.delete = DeleteState::Idle;
        let index = self
            .records
            .iter()
            .position(|record| record.id == id)
            .ok_or(ListError::UnknownRecord(id))?;
        let removed = self.records.remove(index);
        if matches!(&self.edit, EditState::Editing { id: editing, .. } if *editing == id) {
            self.edit = EditState::Idle;
        }
        info!("event=delete_confirm module=controller status=ok id={id}");
        self.notice = Some(Notice::success(MSG_DELETED));
        Ok(removed)
    }

    /// Leaves delete confirmation without calling the store. No-op when idle.
    pub fn cancel_delete(&mut self) {
        self.delete = DeleteState::Idle;
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    /// Returns and clears the last notice.
    pub fn take_notice(&mut self) -> Option<Notice> {
        self.notice.take()
    }

    /// Restores default view state after navigating away. Records are kept.
    pub fn reset_view(&mut self) {
        self.search_term.clear();
        self.sort = None;
        self.edit = EditState::Idle;
        self.delete = DeleteState::Idle;
        self.notice = None;
    }

    /// Current renderable snapshot.
    pub fn view(&self) -> RecordListView {
        project(
            &self.records,
            &self.search_term,
            self.sort,
            &self.edit,
            self.delete,
            self.notice.as_ref(),
        )
    }

    fn find(&self, id: RecordId) -> Option<&Record> {
        self.records.iter().find(|record| record.id == id)
    }

    fn drop_missing_targets(&mut self) {
        if let EditState::Editing { id, .. } = &self.edit {
            if self.find(*id).is_none() {
                self.edit = EditState::Idle;
            }
        }
        if let DeleteState::ConfirmPending { id } = self.delete {
            if self.find(id).is_none() {
                self.delete = DeleteState::Idle;
            }
        }
    }
}
