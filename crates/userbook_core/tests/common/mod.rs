//! Shared in-memory store double for controller tests.
#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use userbook_core::{
    NewRecord, Record, RecordId, RecordPatch, RecordStore, StoreError, StoreResult,
};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    List,
    Create,
    Update,
    Delete,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    List,
    Create(NewRecord),
    Update(RecordId, RecordPatch),
    Delete(RecordId),
}

/// Vec-backed store that logs every call and can fail one operation.
#[derive(Default)]
pub struct FakeStore {
    records: RefCell<Vec<Record>>,
    calls: RefCell<Vec<Call>>,
    failing: Cell<Option<Op>>,
}

impl FakeStore {
    pub fn with_records(records: Vec<Record>) -> Self {
        Self {
            records: RefCell::new(records),
            ..Self::default()
        }
    }

    pub fn fail_on(&self, op: Option<Op>) {
        self.failing.set(op);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn stored(&self) -> Vec<Record> {
        self.records.borrow().clone()
    }

    /// Removes a record behind the controller's back, as another client would.
    pub fn remove(&self, id: RecordId) {
        self.records.borrow_mut().retain(|record| record.id != id);
    }

    fn check(&self, op: Op) -> StoreResult<()> {
        if self.failing.get() == Some(op) {
            return Err(StoreError::Unavailable(format!("injected {op:?} failure")));
        }
        Ok(())
    }
}

impl RecordStore for FakeStore {
    fn list(&self) -> StoreResult<Vec<Record>> {
        self.calls.borrow_mut().push(Call::List);
        self.check(Op::List)?;
        Ok(self.stored())
    }

    fn create(&self, new: &NewRecord) -> StoreResult<Record> {
        self.calls.borrow_mut().push(Call::Create(new.clone()));
        self.check(Op::Create)?;
        let record = Record::from_new(Uuid::new_v4(), new);
        self.records.borrow_mut().push(record.clone());
        Ok(record)
    }

    fn update(&self, id: RecordId, patch: &RecordPatch) -> StoreResult<()> {
        self.calls.borrow_mut().push(Call::Update(id, patch.clone()));
        self.check(Op::Update)?;
        let mut records = self.records.borrow_mut();
        let record = records
            .iter_mut()
            .find(|record| record.id == id)
            .ok_or(StoreError::NotFound(id))?;
        record.apply_patch(patch);
        Ok(())
    }

    fn delete(&self, id: RecordId) -> StoreResult<()> {
        self.calls.borrow_mut().push(Call::Delete(id));
        self.check(Op::Delete)?;
        let mut records = self.records.borrow_mut();
        let before = records.len();
        records.retain(|record| record.id != id);
        if records.len() == before {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }
}

pub fn record(name: &str, email: &str, phone: &str) -> Record {
    Record {
        id: Uuid::new_v4(),
        name: name.to_string(),
        email: email.to_string(),
        phone: phone.to_string(),
        created_at: 0,
    }
}

pub fn names(records: &[Record]) -> Vec<String> {
    records.iter().map(|record| record.name.clone()).collect()
}

impl FakeStore {
    /// Runs `create` for a ticket the way a host worker would.
    pub fn create_for(&self, ticket: &userbook_core::SubmitTicket) -> StoreResult<Record> {
        self.create(ticket.new_record())
    }
}
