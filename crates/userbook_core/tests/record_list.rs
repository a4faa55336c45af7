mod common;

use common::{names, record, Call, FakeStore, Op};
use userbook_core::{
    DeleteState, EditState, Field, ListError, NoticeKind, RecordListController, SortOrder,
    SortState,
};

fn loaded(store: &FakeStore) -> RecordListController<&FakeStore> {
    let mut controller = RecordListController::new(store);
    controller.load().unwrap();
    controller
}

#[test]
fn load_replaces_records_with_store_contents() {
    let store = FakeStore::with_records(vec![
        record("Ann", "a@b.com", "1234567890"),
        record("Bob", "b@b.com", "1234567891"),
    ]);
    let mut controller = RecordListController::new(&store);
    assert_eq!(controller.load().unwrap(), 2);
    assert_eq!(names(controller.records()), vec!["Ann", "Bob"]);
    assert_eq!(store.calls(), vec![Call::List]);
}

#[test]
fn load_failure_leaves_set_empty_and_surfaces_error() {
    let store = FakeStore::with_records(vec![record("Ann", "a@b.com", "1234567890")]);
    store.fail_on(Some(Op::List));
    let mut controller = RecordListController::new(&store);

    let err = controller.load().unwrap_err();
    assert!(matches!(err, ListError::Store(_)));
    assert!(controller.records().is_empty());
    assert_eq!(controller.notice().unwrap().kind, NoticeKind::Error);
    assert_eq!(store.calls(), vec![Call::List]);
}

#[test]
fn visible_is_subset_matching_name_case_insensitively() {
    let store = FakeStore::with_records(vec![
        record("Annabel", "x@y", "1"),
        record("bob", "ann@y", "2"),
        record("JOANNA", "z@y", "3"),
    ]);
    let mut controller = loaded(&store);

    for term in ["", "ann", "ANN", "b", "zzz", "a"] {
        controller.set_search_term(term);
        let visible = controller.visible();
        for hit in &visible {
            assert!(controller.records().iter().any(|r| r.id == hit.id));
            assert!(hit.name.to_lowercase().contains(&term.to_lowercase()));
        }
    }

    controller.set_search_term("ANN");
    let visible: Vec<&str> = controller.visible().iter().map(|r| r.name.as_str()).collect();
    assert_eq!(visible, vec!["Annabel", "JOANNA"]);

    controller.set_search_term("");
    assert_eq!(controller.visible().len(), 3);
}

#[test]
fn sort_by_name_is_case_insensitive_ascending() {
    let store = FakeStore::with_records(vec![
        record("Bob", "b@x", "1"),
        record("alice", "a@x", "2"),
    ]);
    let mut controller = loaded(&store);

    let state = controller.sort_by(Field::Name);
    assert_eq!(
        state,
        SortState {
            key: Field::Name,
            order: SortOrder::Asc
        }
    );
    assert_eq!(names(controller.records()), vec!["alice", "Bob"]);
    assert_eq!(controller.sort_indicator(Field::Name), Some("▲"));
    assert_eq!(controller.sort_indicator(Field::Email), None);
}

#[test]
fn sorting_same_key_twice_reverses_order() {
    let store = FakeStore::with_records(vec![
        record("Carl", "c@x", "3"),
        record("amy", "a@x", "1"),
        record("Bea", "b@x", "2"),
    ]);
    let mut controller = loaded(&store);

    controller.sort_by(Field::Email);
    let first = names(controller.records());
    controller.sort_by(Field::Email);
    let mut second = names(controller.records());
    second.reverse();
    assert_eq!(first, second);
    assert_eq!(controller.sort().unwrap().order, SortOrder::Desc);
    assert_eq!(controller.sort_indicator(Field::Email), Some("▼"));

    controller.sort_by(Field::Email);
    assert_eq!(controller.sort().unwrap().order, SortOrder::Asc);
}

#[test]
fn switching_key_resets_to_ascending() {
    let store = FakeStore::with_records(vec![
        record("b", "a@x", "2"),
        record("a", "b@x", "1"),
    ]);
    let mut controller = loaded(&store);

    controller.sort_by(Field::Name);
    controller.sort_by(Field::Name);
    let state = controller.sort_by(Field::Phone);
    assert_eq!(state.order, SortOrder::Asc);
    assert_eq!(names(controller.records()), vec!["a", "b"]);
}

#[test]
fn search_runs_over_sorted_canonical_order() {
    let store = FakeStore::with_records(vec![
        record("Zoe Ann", "z@x", "1"),
        record("Ann", "a@x", "2"),
        record("Bob", "b@x", "3"),
    ]);
    let mut controller = loaded(&store);

    controller.sort_by(Field::Name);
    controller.set_search_term("ann");
    let visible: Vec<&str> = controller.visible().iter().map(|r| r.name.as_str()).collect();
    assert_eq!(visible, vec!["Ann", "Zoe Ann"]);
}

#[test]
fn submit_edit_updates_store_and_memory() {
    let ann = record("Ann", "a@b.com", "1234567890");
    let store = FakeStore::with_records(vec![ann.clone()]);
    let mut controller = loaded(&store);

    let draft = controller.begin_edit(ann.id).unwrap();
    assert_eq!(draft.name, "Ann");
    controller.edit_draft_mut().unwrap().email = "ann@new.com".to_string();

    let updated = controller.submit_edit().unwrap();
    assert_eq!(updated.email, "ann@new.com");
    assert_eq!(updated.created_at, ann.created_at);
    assert_eq!(controller.edit_state(), &EditState::Idle);
    assert_eq!(controller.records()[0].email, "ann@new.com");
    assert_eq!(store.stored()[0].email, "ann@new.com");
    assert_eq!(controller.take_notice().unwrap().kind, NoticeKind::Success);
}

#[test]
fn submit_edit_with_empty_email_is_rejected_without_store_call() {
    let ann = record("Ann", "a@b.com", "1234567890");
    let store = FakeStore::with_records(vec![ann.clone()]);
    let mut controller = loaded(&store);
    let before = controller.records().to_vec();

    controller.begin_edit(ann.id).unwrap();
    controller.edit_draft_mut().unwrap().email = String::new();

    let err = controller.submit_edit().unwrap_err();
    assert!(matches!(err, ListError::Validation(_)));
    assert_eq!(controller.records(), before.as_slice());
    assert!(matches!(controller.edit_state(), EditState::Editing { .. }));
    assert_eq!(store.calls(), vec![Call::List]);
    assert_eq!(
        controller.notice().unwrap().message,
        "All fields are required!"
    );
}

#[test]
fn submit_edit_store_failure_stays_editing_and_keeps_records() {
    let ann = record("Ann", "a@b.com", "1234567890");
    let store = FakeStore::with_records(vec![ann.clone()]);
    let mut controller = loaded(&store);
    store.fail_on(Some(Op::Update));

    controller.begin_edit(ann.id).unwrap();
    controller.edit_draft_mut().unwrap().name = "Annie".to_string();
    let err = controller.submit_edit().unwrap_err();

    assert!(matches!(err, ListError::Store(_)));
    assert_eq!(controller.records()[0].name, "Ann");
    match controller.edit_state() {
        EditState::Editing { id, draft } => {
            assert_eq!(*id, ann.id);
            assert_eq!(draft.name, "Annie");
        }
        EditState::Idle => panic!("edit should still be active"),
    }

    store.fail_on(None);
    assert_eq!(controller.submit_edit().unwrap().name, "Annie");
}

#[test]
fn begin_edit_replaces_previous_draft() {
    let ann = record("Ann", "a@b.com", "1234567890");
    let bob = record("Bob", "b@b.com", "1234567891");
    let store = FakeStore::with_records(vec![ann.clone(), bob.clone()]);
    let mut controller = loaded(&store);

    controller.begin_edit(ann.id).unwrap();
    controller.edit_draft_mut().unwrap().name = "dirty".to_string();
    controller.begin_edit(bob.id).unwrap();

    let view = controller.view();
    let editing = view.editing.unwrap();
    assert_eq!(editing.id, bob.id);
    assert_eq!(editing.draft.name, "Bob");
    assert_eq!(view.rows.iter().filter(|row| row.editing).count(), 1);
}

#[test]
fn cancel_edit_discards_draft_and_is_idempotent() {
    let ann = record("Ann", "a@b.com", "1234567890");
    let store = FakeStore::with_records(vec![ann.clone()]);
    let mut controller = loaded(&store);

    controller.cancel_edit();
    assert_eq!(controller.edit_state(), &EditState::Idle);

    controller.begin_edit(ann.id).unwrap();
    controller.edit_draft_mut().unwrap().name = "changed".to_string();
    controller.cancel_edit();
    controller.cancel_edit();

    assert_eq!(controller.edit_state(), &EditState::Idle);
    assert_eq!(controller.records()[0].name, "Ann");
    assert_eq!(store.calls(), vec![Call::List]);
    assert!(matches!(
        controller.submit_edit().unwrap_err(),
        ListError::NoActiveEdit
    ));
}

#[test]
fn confirm_delete_removes_exactly_the_requested_record() {
    let ann = record("Ann", "a@b.com", "1234567890");
    let bob = record("Bob", "b@b.com", "1234567891");
    let store = FakeStore::with_records(vec![ann.clone(), bob.clone()]);
    let mut controller = loaded(&store);

    controller.request_delete(ann.id).unwrap();
    assert_eq!(
        controller.delete_state(),
        DeleteState::ConfirmPending { id: ann.id }
    );
    let removed = controller.confirm_delete().unwrap();

    assert_eq!(removed.id, ann.id);
    assert_eq!(controller.records(), &[bob]);
    assert_eq!(controller.delete_state(), DeleteState::Idle);
    let deletes: Vec<Call> = store
        .calls()
        .into_iter()
        .filter(|call| matches!(call, Call::Delete(_)))
        .collect();
    assert_eq!(deletes, vec![Call::Delete(ann.id)]);
}

#[test]
fn confirm_delete_failure_stays_pending() {
    let ann = record("Ann", "a@b.com", "1234567890");
    let store = FakeStore::with_records(vec![ann.clone()]);
    let mut controller = loaded(&store);
    store.fail_on(Some(Op::Delete));

    controller.request_delete(ann.id).unwrap();
    assert!(matches!(
        controller.confirm_delete().unwrap_err(),
        ListError::Store(_)
    ));
    assert_eq!(
        controller.delete_state(),
        DeleteState::ConfirmPending { id: ann.id }
    );
    assert_eq!(controller.records().len(), 1);
    assert_eq!(controller.notice().unwrap().message, "Error deleting user");
}

#[test]
fn cancel_delete_makes_no_store_call() {
    let ann = record("Ann", "a@b.com", "1234567890");
    let store = FakeStore::with_records(vec![ann.clone()]);
    let mut controller = loaded(&store);

    controller.request_delete(ann.id).unwrap();
    controller.cancel_delete();
    assert_eq!(controller.delete_state(), DeleteState::Idle);
    assert!(matches!(
        controller.confirm_delete().unwrap_err(),
        ListError::NoPendingDelete
    ));
    assert_eq!(store.calls(), vec![Call::List]);
}

#[test]
fn deleting_the_edited_record_ends_the_edit() {
    let ann = record("Ann", "a@b.com", "1234567890");
    let store = FakeStore::with_records(vec![ann.clone()]);
    let mut controller = loaded(&store);

    controller.begin_edit(ann.id).unwrap();
    controller.request_delete(ann.id).unwrap();
    controller.confirm_delete().unwrap();
    assert_eq!(controller.edit_state(), &EditState::Idle);
}

#[test]
fn reload_drops_edit_and_delete_targets_that_vanished() {
    let ann = record("Ann", "a@b.com", "1234567890");
    let bob = record("Bob", "b@b.com", "1234567891");
    let store = FakeStore::with_records(vec![ann.clone(), bob.clone()]);
    let mut controller = loaded(&store);

    controller.begin_edit(ann.id).unwrap();
    controller.request_delete(bob.id).unwrap();
    store.remove(ann.id);
    controller.load().unwrap();

    assert_eq!(controller.edit_state(), &EditState::Idle);
    assert_eq!(
        controller.delete_state(),
        DeleteState::ConfirmPending { id: bob.id }
    );

    store.remove(bob.id);
    controller.load().unwrap();
    assert_eq!(controller.delete_state(), DeleteState::Idle);
    assert!(controller.records().is_empty());
}

#[test]
fn reload_keeps_an_edit_whose_record_still_exists() {
    let ann = record("Ann", "a@b.com", "1234567890");
    let store = FakeStore::with_records(vec![ann.clone()]);
    let mut controller = loaded(&store);

    controller.begin_edit(ann.id).unwrap();
    controller.edit_draft_mut().unwrap().name = "Annie".to_string();
    controller.load().unwrap();

    assert!(matches!(
        controller.edit_state(),
        EditState::Editing { id, draft } if *id == ann.id && draft.name == "Annie"
    ));
}

#[test]
fn unknown_ids_are_rejected() {
    let store = FakeStore::default();
    let mut controller = loaded(&store);
    let stranger = record("Nobody", "n@x", "0");

    assert!(matches!(
        controller.begin_edit(stranger.id).unwrap_err(),
        ListError::UnknownRecord(id) if id == stranger.id
    ));
    assert!(matches!(
        controller.request_delete(stranger.id).unwrap_err(),
        ListError::UnknownRecord(_)
    ));
}

#[test]
fn view_flags_rows_and_reset_restores_defaults() {
    let ann = record("Ann", "a@b.com", "1234567890");
    let bob = record("Bob", "b@b.com", "1234567891");
    let store = FakeStore::with_records(vec![ann.clone(), bob.clone()]);
    let mut controller = loaded(&store);

    controller.set_search_term("b");
    controller.sort_by(Field::Name);
    controller.request_delete(bob.id).unwrap();

    let view = controller.view();
    assert_eq!(view.total, 2);
    assert_eq!(view.rows.len(), 1);
    assert!(view.rows[0].pending_delete);
    assert_eq!(view.pending_delete, Some(bob.id));
    assert_eq!(view.search_term, "b");

    controller.reset_view();
    let view = controller.view();
    assert_eq!(view.rows.len(), 2);
    assert_eq!(view.sort, None);
    assert_eq!(view.pending_delete, None);
    assert!(view.editing.is_none());
}
