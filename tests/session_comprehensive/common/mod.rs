//! Shared fixtures

use rowdex::{MemoryStore, Record, Relation, RelationId, SessionTable, Store, Value};
use std::sync::{Arc, Once};

/// Install a log subscriber once, so RUST_LOG surfaces staged batches
fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    });
}

/// Store with a `people` table: ids 1 through 4, ages 17 through 20
pub fn ages_store() -> Arc<MemoryStore> {
    init_tracing();
    let store = MemoryStore::new();
    let id = RelationId::new("people");
    store
        .create_table(
            Relation::new(
                id.clone(),
                vec!["id".into(), "name".into(), "age".into()],
                vec!["id".into()],
            )
            .unwrap(),
        )
        .unwrap();
    store
        .insert_rows(
            &id,
            &[
                Record::from_pairs([("id", Value::from(1i64)), ("name", Value::from("Ada")), ("age", Value::from(17i64))]),
                Record::from_pairs([("id", Value::from(2i64)), ("name", Value::from("Grace")), ("age", Value::from(18i64))]),
                Record::from_pairs([("id", Value::from(3i64)), ("name", Value::from("Edsger")), ("age", Value::from(19i64))]),
                Record::from_pairs([("id", Value::from(4i64)), ("name", Value::from("Barbara")), ("age", Value::from(20i64))]),
            ],
        )
        .unwrap();
    Arc::new(store)
}

/// Open the seeded `people` table in a fresh unit of work
pub fn open_ages() -> SessionTable {
    SessionTable::open(ages_store(), "people").unwrap()
}

/// The table's visible ages, in row order
pub fn ages_of(table: &SessionTable) -> Vec<Value> {
    table.select("age").unwrap().values().unwrap()
}

/// The table's visible ids, in row order
pub fn ids_of(table: &SessionTable) -> Vec<Value> {
    table.select("id").unwrap().values().unwrap()
}
