//! rowdex - selection algebra over primary-keyed relational tables
//!
//! rowdex exposes a relational table as an addressable, sliceable,
//! filterable collection. Positions, ranges, column names, column lists,
//! and boolean filters all narrow a table the same way, and every narrowing
//! resolves to stable row identities (primary-key values) before anything
//! is read or written.
//!
//! # Quick Start
//!
//! ```
//! use rowdex::{MemoryStore, Record, Relation, RelationId, SessionTable};
//! use std::sync::Arc;
//!
//! // A store with one primary-keyed table
//! let store = Arc::new(MemoryStore::new());
//! store.create_table(Relation::new(
//!     RelationId::new("people"),
//!     vec!["id".into(), "age".into()],
//!     vec!["id".into()],
//! )?)?;
//!
//! // Open a unit of work and address the table
//! let table = SessionTable::open(store, "people")?;
//! table.insert(vec![
//!     Record::from_pairs([("age", 17i64)]),
//!     Record::from_pairs([("age", 18i64)]),
//!     Record::from_pairs([("age", 19i64)]),
//! ])?;
//!
//! // Narrow by filter and column, then mutate the subset in one batch
//! let adults = table.select("age")?.greater_equal_filter(18i64)?;
//! table.select((adults, "age"))?.decrement_by(1i64)?;
//! table.commit()?;
//! # Ok::<(), rowdex::Error>(())
//! ```
//!
//! # Architecture
//!
//! The workspace splits along the seams a store swap would cut:
//! `rowdex-core` holds the value model, the key shapes, and the `Store`
//! contract; `rowdex-storage` is the in-memory reference store plus schema
//! administration; `rowdex-engine` is the selection algebra and the unit of
//! work. This crate re-exports the public surface.

pub use rowdex_core::{
    Error, Filter, IndexExpr, RangeExpr, Record, Relation, RelationId, Result, RowKey,
    RowSelector, SlicePlan, Store, Value,
};
pub use rowdex_engine::{
    ColumnSet, Operand, RowSet, Selection, SelectionKind, Session, SessionTable, TableInfo,
    UpdateValue,
};
pub use rowdex_storage::MemoryStore;
