//! Mutation propagation end to end

use crate::common::{ages_of, ages_store, ids_of, open_ages};
use rowdex::{Record, RelationId, RowSelector, SessionTable, Store, Value};

#[test]
fn filtered_decrement_then_positional_delete() {
    // Seeded ages: 17, 18, 19, 20
    let store = ages_store();
    let table = SessionTable::open(store.clone(), "people").unwrap();

    let filter = table
        .select("age")
        .unwrap()
        .greater_equal_filter(18i64)
        .unwrap();
    assert_eq!(
        filter.iter().collect::<Vec<_>>(),
        vec![false, true, true, true]
    );

    let adult_ages = table.select((filter.clone(), "age")).unwrap();
    assert_eq!(
        adult_ages.values().unwrap(),
        vec![Value::Int(18), Value::Int(19), Value::Int(20)]
    );

    adult_ages.decrement_by(1i64).unwrap();
    assert_eq!(
        ages_of(&table),
        vec![Value::Int(17), Value::Int(17), Value::Int(18), Value::Int(19)]
    );

    table.select(0i64..1).unwrap().delete().unwrap();
    assert_eq!(table.row_count().unwrap(), 3);
    assert_eq!(
        ids_of(&table),
        vec![Value::Int(2), Value::Int(3), Value::Int(4)]
    );

    // Nothing reached the store yet; commit pushes both batches
    assert_eq!(
        store
            .select_column(&RelationId::new("people"), "age", &RowSelector::All)
            .unwrap(),
        vec![Value::Int(17), Value::Int(18), Value::Int(19), Value::Int(20)]
    );
    table.commit().unwrap();
    assert_eq!(
        store
            .select_column(&RelationId::new("people"), "age", &RowSelector::All)
            .unwrap(),
        vec![Value::Int(17), Value::Int(18), Value::Int(19)]
    );
}

#[test]
fn full_record_update_is_idempotent() {
    let table = open_ages();
    let payload = vec![
        Record::from_pairs([("id", Value::from(1i64)), ("name", Value::from("Ada")), ("age", Value::from(40i64))]),
        Record::from_pairs([("id", Value::from(2i64)), ("name", Value::from("Grace")), ("age", Value::from(41i64))]),
        Record::from_pairs([("id", Value::from(3i64)), ("name", Value::from("Edsger")), ("age", Value::from(42i64))]),
        Record::from_pairs([("id", Value::from(4i64)), ("name", Value::from("Barbara")), ("age", Value::from(43i64))]),
    ];
    table.select(..).unwrap().update(payload.clone()).unwrap();
    let once = table.records().unwrap();
    table.select(..).unwrap().update(payload).unwrap();
    assert_eq!(table.records().unwrap(), once);
}

#[test]
fn deletion_reduces_count_by_distinct_keys() {
    let table = open_ages();
    // The filter resolves three rows; deleting through two overlapping
    // selections still removes three rows total
    let filter = table
        .select("age")
        .unwrap()
        .greater_equal_filter(18i64)
        .unwrap();
    let sub = table.select(filter).unwrap();
    let distinct = sub.row_keys().unwrap().len();
    sub.delete().unwrap();
    assert_eq!(table.row_count().unwrap(), 4 - distinct);
}

#[test]
fn insert_then_address_the_staged_row() {
    let table = open_ages();
    table
        .insert_one(Record::from_pairs([("name", Value::from("Alan")), ("age", Value::from(28i64))]))
        .unwrap();
    // The staged row got key 5 and sits last in the ordering
    let record = table.select(-1i64).unwrap().record().unwrap();
    assert_eq!(record.get("id"), Some(&Value::Int(5)));
    assert_eq!(record.get("name"), Some(&Value::Text("Alan".into())));

    // It is updatable and deletable before commit
    table.select(("age", -1i64)).unwrap().update(29i64).unwrap();
    assert_eq!(ages_of(&table)[4], Value::Int(29));
    table.select(-1i64).unwrap().delete().unwrap();
    assert_eq!(table.row_count().unwrap(), 4);
}

#[test]
fn increment_then_decrement_restores_state() {
    let table = open_ages();
    let before = ages_of(&table);
    table.select("age").unwrap().increment_by(7i64).unwrap();
    table.select("age").unwrap().decrement_by(7i64).unwrap();
    assert_eq!(ages_of(&table), before);
}

#[test]
fn value_selection_read_modify_write() {
    let table = open_ages();
    let cell = table.select(("age", 1i64)).unwrap();
    assert_eq!(cell.value().unwrap(), Value::Int(18));
    cell.increment_by(10i64).unwrap();
    assert_eq!(cell.value().unwrap(), Value::Int(28));
    cell.update(50i64).unwrap();
    assert_eq!(cell.value().unwrap(), Value::Int(50));
}

#[test]
fn sub_record_update_through_named_columns() {
    let table = open_ages();
    let sub_record = table.select((vec!["name", "age"], 0i64)).unwrap();
    sub_record
        .update(Record::from_pairs([("name", "Augusta")]))
        .unwrap();
    let record = table.select(0i64).unwrap().record().unwrap();
    assert_eq!(record.get("name"), Some(&Value::Text("Augusta".into())));
    assert_eq!(record.get("age"), Some(&Value::Int(17)));
}
