//! Filter production and application

use crate::common::{ages_of, open_ages};
use rowdex::{Error, Filter, Record, Value};

#[test]
fn comparison_produces_the_documented_mask() {
    let table = open_ages();
    let filter = table
        .select("age")
        .unwrap()
        .greater_equal_filter(18i64)
        .unwrap();
    assert_eq!(filter, Filter::new(vec![false, true, true, true]));
}

#[test]
fn filter_round_trip_returns_matching_rows() {
    let table = open_ages();
    let ages = table.select("age").unwrap();
    let filter = ages.equals_filter(19i64).unwrap();
    let matched = table.select(filter).unwrap();
    let records = matched.records().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].get("name"), Some(&Value::Text("Edsger".into())));
}

#[test]
fn filtered_column_reads_the_subset() {
    let table = open_ages();
    let filter = table
        .select("age")
        .unwrap()
        .greater_equal_filter(18i64)
        .unwrap();
    let values = table
        .select((filter, "age"))
        .unwrap()
        .values()
        .unwrap();
    assert_eq!(values, vec![Value::Int(18), Value::Int(19), Value::Int(20)]);
}

#[test]
fn combinators_narrow_and_widen() {
    let table = open_ages();
    let ages = table.select("age").unwrap();
    let adults = ages.greater_equal_filter(18i64).unwrap();
    let minors = adults.not();
    assert_eq!(minors, Filter::new(vec![true, false, false, false]));

    let teens = ages.less_than_filter(20i64).unwrap();
    let adult_teens = adults.and(&teens).unwrap();
    assert_eq!(adult_teens, Filter::new(vec![false, true, true, false]));

    let either = adults.or(&minors).unwrap();
    assert_eq!(either.selected_count(), 4);
}

#[test]
fn stale_filter_raises_after_row_count_changes() {
    let table = open_ages();
    let filter = table
        .select("age")
        .unwrap()
        .greater_equal_filter(18i64)
        .unwrap();
    // A staged insert changes the visible row count
    table
        .insert_one(Record::from_pairs([("name", Value::from("Alan")), ("age", Value::from(41i64))]))
        .unwrap();
    let err = table.select(filter).unwrap_err();
    assert!(matches!(
        err,
        Error::FilterLengthMismatch {
            filter_len: 4,
            row_count: 5
        }
    ));
}

#[test]
fn rederived_filter_sees_the_new_rows() {
    let table = open_ages();
    table
        .insert_one(Record::from_pairs([("name", Value::from("Alan")), ("age", Value::from(41i64))]))
        .unwrap();
    let filter = table
        .select("age")
        .unwrap()
        .greater_equal_filter(18i64)
        .unwrap();
    let matched = table.select(filter).unwrap();
    assert_eq!(matched.row_count().unwrap(), 4);
}

#[test]
fn filter_against_updated_values_reflects_staging() {
    let table = open_ages();
    table.select(("age", 0i64)).unwrap().update(99i64).unwrap();
    let filter = table
        .select("age")
        .unwrap()
        .greater_than_filter(90i64)
        .unwrap();
    assert_eq!(filter, Filter::new(vec![true, false, false, false]));
    assert_eq!(ages_of(&table)[0], Value::Int(99));
}
