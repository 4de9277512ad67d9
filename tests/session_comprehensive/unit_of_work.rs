//! Unit-of-work semantics: staging, visibility, commit, rollback

use crate::common::{ages_of, ages_store};
use rowdex::{
    Error, Record, Relation, RelationId, Result, RowSelector, Session, SessionTable, Store, Value,
};
use std::sync::Arc;

#[test]
fn sibling_selections_see_staged_writes() {
    let table = SessionTable::open(ages_store(), "people").unwrap();
    let ages = table.select("age").unwrap();
    let first_cell = table.select(("age", 0i64)).unwrap();

    first_cell.update(90i64).unwrap();
    // Both siblings observe the staged write before commit
    assert_eq!(ages.values().unwrap()[0], Value::Int(90));
    assert_eq!(first_cell.value().unwrap(), Value::Int(90));
}

#[test]
fn store_is_untouched_until_commit() {
    let store = ages_store();
    let table = SessionTable::open(store.clone(), "people").unwrap();
    table.select("age").unwrap().update(0i64).unwrap();

    let stored = store
        .select_column(&RelationId::new("people"), "age", &RowSelector::All)
        .unwrap();
    assert_eq!(
        stored,
        vec![Value::Int(17), Value::Int(18), Value::Int(19), Value::Int(20)]
    );

    table.commit().unwrap();
    let stored = store
        .select_column(&RelationId::new("people"), "age", &RowSelector::All)
        .unwrap();
    assert!(stored.iter().all(|age| *age == Value::Int(0)));
}

#[test]
fn rollback_discards_every_staged_batch() {
    let table = SessionTable::open(ages_store(), "people").unwrap();
    table.select("age").unwrap().update(0i64).unwrap();
    table.select(0i64).unwrap().delete().unwrap();
    table
        .insert_one(Record::from_pairs([("name", "Alan")]))
        .unwrap();

    table.rollback();
    assert_eq!(table.row_count().unwrap(), 4);
    assert_eq!(ages_of(&table)[0], Value::Int(17));
    assert!(table.session().is_clean());
}

#[test]
fn scoped_helper_commits_on_success() {
    let store = ages_store();
    let deleted: usize = SessionTable::with(store.clone(), "people", |table| {
        let sub = table.select(0i64..2)?;
        let count = sub.row_keys()?.len();
        sub.delete()?;
        Ok(count)
    })
    .unwrap();
    assert_eq!(deleted, 2);
    assert_eq!(store.row_count(&RelationId::new("people")).unwrap(), 2);
}

#[test]
fn scoped_helper_rolls_back_on_error() {
    let store = ages_store();
    let result: Result<()> = SessionTable::with(store.clone(), "people", |table| {
        table.select("age")?.update(0i64)?;
        Err(Error::Storage("caller bailed".into()))
    });
    assert!(result.is_err());
    let stored = store
        .select_column(&RelationId::new("people"), "age", &RowSelector::All)
        .unwrap();
    assert_eq!(stored[0], Value::Int(17));
}

#[test]
fn independent_sessions_do_not_see_each_other() {
    let store = ages_store();
    let writer = SessionTable::open(store.clone(), "people").unwrap();
    let reader = SessionTable::open(store.clone(), "people").unwrap();

    writer.select(("age", 0i64)).unwrap().update(90i64).unwrap();
    // The staged write is private to the writer's unit of work
    assert_eq!(ages_of(&reader)[0], Value::Int(17));

    writer.commit().unwrap();
    assert_eq!(ages_of(&reader)[0], Value::Int(90));
}

#[test]
fn shared_session_spans_tables() {
    let store = ages_store();
    store
        .create_table(
            Relation::new(
                RelationId::new("audit"),
                vec!["id".into(), "note".into()],
                vec!["id".into()],
            )
            .unwrap(),
        )
        .unwrap();

    let session = Arc::new(Session::new(store.clone()));
    let people = SessionTable::open_in(session.clone(), "people").unwrap();
    let audit = SessionTable::open_in(session.clone(), "audit").unwrap();

    people.select(3i64).unwrap().delete().unwrap();
    audit
        .insert_one(Record::from_pairs([("note", "pruned one row")]))
        .unwrap();

    session.commit().unwrap();
    assert_eq!(store.row_count(&RelationId::new("people")).unwrap(), 3);
    assert_eq!(store.row_count(&RelationId::new("audit")).unwrap(), 1);
}

#[test]
fn schema_changes_happen_outside_the_session() {
    let store = ages_store();
    let id = RelationId::new("people");

    // Before any session: widen the schema
    store.add_column(&id, "email").unwrap();

    let table = SessionTable::open(store.clone(), "people").unwrap();
    assert!(table.columns().contains(&"email".to_string()));
    table
        .select(("email", 0i64))
        .unwrap()
        .update("ada@example.org")
        .unwrap();
    table.commit().unwrap();

    // After the session: rename and re-reflect
    store.rename_column(&id, "email", "contact").unwrap();
    let table = SessionTable::open(store, "people").unwrap();
    let contact = table.select(("contact", 0i64)).unwrap().value().unwrap();
    assert_eq!(contact, Value::Text("ada@example.org".into()));
}

#[test]
fn commit_failure_surfaces_the_store_error() {
    let store = ages_store();
    let table = SessionTable::open(store.clone(), "people").unwrap();
    table.select(0i64).unwrap().delete().unwrap();

    // Pull the rug out from under the staged delete
    store.delete_rows(
        &RelationId::new("people"),
        &[rowdex::RowKey::from_pairs([("id", Value::Int(1))])],
    )
    .unwrap();

    let err = table.commit().unwrap_err();
    assert!(matches!(err, Error::RowNotFound(_)));
    // The failed commit leaves the session clean; staged work is gone
    assert!(table.session().is_clean());
}
