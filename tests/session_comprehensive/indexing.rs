//! Positional addressing: positions, ranges, chains

use crate::common::{ages_store, ids_of, open_ages};
use rowdex::{Error, MemoryStore, Relation, RelationId, SessionTable, Value};
use std::sync::Arc;

#[test]
fn position_and_full_slice_position_agree() {
    let table = open_ages();
    let everything = table.select(..).unwrap();
    for i in 0..4i64 {
        let direct = table.select(i).unwrap().row_keys().unwrap();
        let through_slice = everything.select(i).unwrap().row_keys().unwrap();
        assert_eq!(direct, through_slice, "position {i}");
    }
}

#[test]
fn negative_indexing_mirrors_positive() {
    let table = open_ages();
    let n = table.row_count().unwrap() as i64;
    for i in 1..=n {
        let from_back = table.select(-i).unwrap().row_keys().unwrap();
        let from_front = table.select(n - i).unwrap().row_keys().unwrap();
        assert_eq!(from_back, from_front);
    }
}

#[test]
fn slice_composition_is_relative() {
    let table = open_ages();
    // table[1..4][1..2] == table[2..3]
    let nested = table
        .select(1i64..4)
        .unwrap()
        .select(1i64..2)
        .unwrap()
        .row_keys()
        .unwrap();
    let flat = table.select(2i64..3).unwrap().row_keys().unwrap();
    assert_eq!(nested, flat);
}

#[test]
fn inner_slice_clamps_to_outer_extent() {
    let table = open_ages();
    // table[1..3] has two rows; an overlong inner stop clamps
    let nested = table
        .select(1i64..3)
        .unwrap()
        .select(0i64..99)
        .unwrap()
        .row_keys()
        .unwrap();
    let flat = table.select(1i64..3).unwrap().row_keys().unwrap();
    assert_eq!(nested, flat);
}

#[test]
fn chain_order_independence() {
    let table = open_ages();
    let column_first = table.select(("age", 0i64..2)).unwrap();
    let rows_first = table.select((0i64..2, "age")).unwrap();
    assert_eq!(
        column_first.row_keys().unwrap(),
        rows_first.row_keys().unwrap()
    );
    assert_eq!(column_first.values().unwrap(), rows_first.values().unwrap());
}

#[test]
fn out_of_range_position_raises() {
    let table = open_ages();
    assert!(matches!(
        table.select(5i64).unwrap_err(),
        Error::IndexOutOfRange {
            position: 5,
            row_count: 4
        }
    ));
    assert!(matches!(
        table.select(-5i64).unwrap_err(),
        Error::IndexOutOfRange { .. }
    ));
}

#[test]
fn inverted_slice_raises() {
    let table = open_ages();
    assert!(matches!(
        table.select(3i64..1).unwrap_err(),
        Error::SliceError { .. }
    ));
}

#[test]
fn empty_table_full_slice_is_empty_without_error() {
    let store = MemoryStore::new();
    store
        .create_table(
            Relation::new(RelationId::new("empty"), vec!["id".into()], vec!["id".into()])
                .unwrap(),
        )
        .unwrap();
    let table = SessionTable::open(Arc::new(store), "empty").unwrap();
    let all = table.select(..).unwrap();
    assert_eq!(all.records().unwrap(), vec![]);
    assert_eq!(all.row_count().unwrap(), 0);
}

#[test]
fn record_reads_by_stable_identity_not_position() {
    let table = open_ages();
    // Bind the last row, then delete the first; the binding still reads
    // the same row even though its position shifted
    let last = table.select(-1i64).unwrap();
    table.select(0i64..1).unwrap().delete().unwrap();
    let record = last.record().unwrap();
    assert_eq!(record.get("id"), Some(&Value::Int(4)));
}

#[test]
fn positions_resolve_against_live_row_count() {
    let store = ages_store();
    let table = SessionTable::open(store, "people").unwrap();
    table.select(0i64..2).unwrap().delete().unwrap();
    // Two rows remain visible; position 2 is now out of range
    assert!(matches!(
        table.select(2i64).unwrap_err(),
        Error::IndexOutOfRange { .. }
    ));
    assert_eq!(ids_of(&table), vec![Value::Int(3), Value::Int(4)]);
}
