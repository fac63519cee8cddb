use avm_db::{DbError, IndexSet, Session, SessionConfig};
use avm_store::MemoryStore;
use avm_types::Name;

fn n(s: &str) -> Name {
    s.parse().expect("valid name")
}

fn code() -> Name {
    n("token")
}

fn accounts() -> Name {
    n("accounts")
}

#[test]
fn store_find_get_roundtrip() {
    let mut store = MemoryStore::new();
    let mut session = Session::new(&mut store, &SessionConfig::default());
    let mut indices = IndexSet::new();

    let mut db = indices.primary(&mut session, code());
    let it = db
        .store(n("alice"), accounts(), n("alice"), 10, b"balance=5")
        .expect("store");
    assert!(it >= 0);
    assert_eq!(db.find(code(), n("alice"), accounts(), 10).expect("find"), it);
    assert_eq!(db.get(it), b"balance=5".to_vec());
}

#[test]
fn missing_table_and_missing_row_sentinels() {
    let mut store = MemoryStore::new();
    let mut session = Session::new(&mut store, &SessionConfig::default());
    let mut indices = IndexSet::new();

    let mut db = indices.primary(&mut session, code());
    assert_eq!(db.find(code(), n("alice"), accounts(), 1).expect("find"), -1);
    assert_eq!(db.end(code(), n("alice"), accounts()).expect("end"), -1);
    assert_eq!(db.lowerbound(code(), n("alice"), accounts(), 0).expect("lb"), -1);

    db.store(n("alice"), accounts(), n("alice"), 5, b"x")
        .expect("store");
    let end = db.end(code(), n("alice"), accounts()).expect("end");
    assert!(end < -1);
    assert_eq!(db.find(code(), n("alice"), accounts(), 1).expect("find"), end);
}

#[test]
fn end_iterators_are_distinct_per_table() {
    let mut store = MemoryStore::new();
    let mut session = Session::new(&mut store, &SessionConfig::default());
    let mut indices = IndexSet::new();

    let mut db = indices.primary(&mut session, code());
    db.store(n("alice"), accounts(), code(), 1, b"a").expect("store");
    db.store(n("bob"), accounts(), code(), 1, b"b").expect("store");

    let alice_end = db.end(code(), n("alice"), accounts()).expect("end");
    let bob_end = db.end(code(), n("bob"), accounts()).expect("end");
    assert_ne!(alice_end, bob_end);
    assert_eq!(db.end(code(), n("alice"), accounts()).expect("end"), alice_end);
}

#[test]
fn bounds_and_iteration_stay_inside_one_table() {
    let mut store = MemoryStore::new();
    let mut session = Session::new(&mut store, &SessionConfig::default());
    let mut indices = IndexSet::new();

    let mut db = indices.primary(&mut session, code());
    for pk in [10, 20, 30] {
        db.store(n("alice"), accounts(), code(), pk, &pk.to_le_bytes())
            .expect("store");
    }
    // a neighbouring table whose rows sort right after alice's
    db.store(n("bob"), accounts(), code(), 5, b"bob").expect("store");

    let end = db.end(code(), n("alice"), accounts()).expect("end");
    let it = db.lowerbound(code(), n("alice"), accounts(), 15).expect("lb");
    assert_eq!(db.get(it), 20u64.to_le_bytes().to_vec());
    let it = db.upperbound(code(), n("alice"), accounts(), 20).expect("ub");
    assert_eq!(db.get(it), 30u64.to_le_bytes().to_vec());
    assert_eq!(
        db.upperbound(code(), n("alice"), accounts(), 30).expect("ub"),
        end
    );

    let (next, pk) = db.next(it).expect("next");
    assert_eq!((next, pk), (end, None));

    let (last, pk) = db.previous(end).expect("previous");
    assert_eq!(pk, Some(30));
    let (it, pk) = db.previous(last).expect("previous");
    assert_eq!(pk, Some(20));
    let (it, pk) = db.previous(it).expect("previous");
    assert_eq!(pk, Some(10));
    assert_eq!(db.previous(it).expect("previous"), (-1, None));
}

#[test]
fn previous_from_end_of_emptied_table_is_not_found() {
    let mut store = MemoryStore::new();
    let mut session = Session::new(&mut store, &SessionConfig::default());
    let mut indices = IndexSet::new();

    let mut db = indices.primary(&mut session, code());
    let it = db.store(n("alice"), accounts(), code(), 1, b"a").expect("store");
    let end = db.end(code(), n("alice"), accounts()).expect("end");
    db.remove(it).expect("remove");
    assert_eq!(db.previous(end).expect("previous"), (-1, None));
}

#[test]
fn update_keeps_payer_when_empty() {
    let mut store = MemoryStore::new();
    let mut session = Session::new(&mut store, &SessionConfig::default());
    let mut indices = IndexSet::new();

    let it = indices
        .primary(&mut session, code())
        .store(n("alice"), accounts(), n("alice"), 1, b"old")
        .expect("store");
    indices
        .primary(&mut session, code())
        .update(it, Name::EMPTY, b"new")
        .expect("update");

    let tab = session
        .find_table(code(), n("alice"), accounts())
        .expect("lookup")
        .expect("table");
    let row = session
        .find_by_index::<avm_types::KeyValueObject>(&avm_db::keys::key_value_by_scope_primary(
            tab.id, 1,
        ))
        .expect("lookup")
        .expect("row");
    assert_eq!(row.value, b"new".to_vec());
    assert_eq!(row.payer, n("alice"));
}

#[test]
fn remove_requires_owning_contract() {
    let mut store = MemoryStore::new();
    let mut session = Session::new(&mut store, &SessionConfig::default());
    let mut indices = IndexSet::new();

    let it = indices
        .primary(&mut session, code())
        .store(n("alice"), accounts(), code(), 1, b"a")
        .expect("store");
    let err = indices
        .primary(&mut session, n("thief"))
        .remove(it)
        .expect_err("remove");
    assert!(matches!(err, DbError::DbAccessViolation { .. }));
}

#[test]
#[should_panic(expected = "invariant violation")]
fn dereferencing_removed_row_panics() {
    let mut store = MemoryStore::new();
    let mut session = Session::new(&mut store, &SessionConfig::default());
    let mut indices = IndexSet::new();

    let mut db = indices.primary(&mut session, code());
    let it = db.store(n("alice"), accounts(), code(), 1, b"a").expect("store");
    db.store(n("alice"), accounts(), code(), 2, b"b").expect("store");
    db.remove(it).expect("remove");
    let _ = db.get(it);
}

#[test]
#[should_panic(expected = "invariant violation")]
fn dereferencing_end_iterator_panics() {
    let mut store = MemoryStore::new();
    let mut session = Session::new(&mut store, &SessionConfig::default());
    let mut indices = IndexSet::new();

    let mut db = indices.primary(&mut session, code());
    db.store(n("alice"), accounts(), code(), 1, b"a").expect("store");
    let end = db.end(code(), n("alice"), accounts()).expect("end");
    let _ = db.get(end);
}
