//! Root table handle
//!
//! `SessionTable` is how a caller enters the selection algebra: it opens a
//! unit of work over a store, reflects the relation's schema, and refuses
//! relations without a primary key before any selection can exist. Every
//! selection derived from the handle shares its session, so staged writes
//! are visible across siblings until commit or rollback.
//!
//! Insertion lives here and only here. Narrower selections update and
//! delete; only the whole table accepts new rows.

use crate::selection::Selection;
use crate::session::Session;
use rowdex_core::{Error, IndexExpr, Record, Relation, RelationId, Result, Store};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// Summary of a table's shape and content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableInfo {
    /// Relation name
    pub name: String,
    /// Namespace, when the relation has one
    pub namespace: Option<String>,
    /// Current row count
    pub row_count: usize,
    /// Ordered primary-key column names
    pub key_columns: Vec<String>,
    /// Ordered column names
    pub column_names: Vec<String>,
    /// First record under the row ordering, when any rows exist
    pub first_record: Option<Record>,
}

/// Handle over one relation inside one unit of work
pub struct SessionTable {
    session: Arc<Session>,
    relation: Relation,
}

impl std::fmt::Debug for SessionTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionTable")
            .field("relation", &self.relation)
            .finish_non_exhaustive()
    }
}

impl SessionTable {
    /// Open a relation in a fresh unit of work
    ///
    /// The schema is reflected from the store; a relation without a primary
    /// key is rejected here, before any selection can be built on it.
    ///
    /// # Errors
    ///
    /// `UnknownRelation` when the store has no such relation,
    /// `MissingPrimaryKey` when it has no primary key.
    pub fn open(store: Arc<dyn Store>, id: impl Into<RelationId>) -> Result<Self> {
        Self::open_in(Arc::new(Session::new(store)), id)
    }

    /// Open a relation inside an existing unit of work
    ///
    /// Use this to address several tables under one scope; writes staged
    /// through any of them commit and roll back together.
    pub fn open_in(session: Arc<Session>, id: impl Into<RelationId>) -> Result<Self> {
        let id = id.into();
        let columns = session.store().column_names(&id)?;
        let key_columns = session.store().primary_key_columns(&id)?;
        let relation = Relation::new(id, columns, key_columns)?;
        debug!(target: "rowdex::table", relation = %relation.id(), "open");
        Ok(Self { session, relation })
    }

    /// The shared unit of work
    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// The reflected relation schema
    pub fn relation(&self) -> &Relation {
        &self.relation
    }

    /// Ordered column names
    pub fn columns(&self) -> &[String] {
        self.relation.columns()
    }

    /// Ordered primary-key column names
    pub fn key_columns(&self) -> &[String] {
        self.relation.key_columns()
    }

    /// Current visible row count
    pub fn row_count(&self) -> Result<usize> {
        self.session.row_count(&self.relation)
    }

    /// True when no rows are visible
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.row_count()? == 0)
    }

    // ========== Selection ==========

    /// The whole-table selection
    pub fn selection(&self) -> Selection {
        Selection::table(Arc::clone(&self.session), self.relation.clone())
    }

    /// Resolve an index expression against the whole table
    ///
    /// Accepts everything [`Selection::select`] accepts: positions, ranges,
    /// column names, column lists, filters, and tuples chaining them.
    pub fn select(&self, key: impl Into<IndexExpr>) -> Result<Selection> {
        self.selection().select(key)
    }

    /// All visible records, in row order
    pub fn records(&self) -> Result<Vec<Record>> {
        self.session.records(&self.relation, None)
    }

    /// Selection of the first `size` rows
    ///
    /// # Errors
    ///
    /// `ValueShape` when `size` is negative.
    pub fn head(&self, size: i64) -> Result<Selection> {
        if size < 0 {
            return Err(Error::ValueShape("head size must be non-negative".into()));
        }
        self.select(0i64..size)
    }

    /// Selection of the last `size` rows
    ///
    /// # Errors
    ///
    /// `ValueShape` when `size` is negative.
    pub fn tail(&self, size: i64) -> Result<Selection> {
        if size < 0 {
            return Err(Error::ValueShape("tail size must be non-negative".into()));
        }
        if size == 0 {
            return self.select(0i64..0);
        }
        self.select(IndexExpr::Range(rowdex_core::RangeExpr::from_start(-size)))
    }

    /// Summarize the table's shape and first record
    pub fn info(&self) -> Result<TableInfo> {
        let first_record = self.session.records(&self.relation, None)?.into_iter().next();
        Ok(TableInfo {
            name: self.relation.id().name().to_string(),
            namespace: self.relation.id().namespace().map(str::to_string),
            row_count: self.row_count()?,
            key_columns: self.relation.key_columns().to_vec(),
            column_names: self.relation.columns().to_vec(),
            first_record,
        })
    }

    // ========== Mutation ==========

    /// Stage an insert of new records
    ///
    /// Records may omit a single integer primary-key column; the session
    /// assigns the next value so the rows are addressable before commit.
    pub fn insert(&self, records: Vec<Record>) -> Result<()> {
        self.session.stage_insert(&self.relation, records)
    }

    /// Stage an insert of one record
    pub fn insert_one(&self, record: Record) -> Result<()> {
        self.insert(vec![record])
    }

    /// Stage keyed updates; every record must carry its primary key
    pub fn update_records(&self, records: Vec<Record>) -> Result<()> {
        self.session.stage_update(&self.relation, records)
    }

    /// Stage deletion of every row whose `column` value is in `values`
    pub fn delete_records(&self, column: &str, values: &[rowdex_core::Value]) -> Result<()> {
        let matches = self.select(column)?.in_filter(values)?;
        self.select(matches)?.delete()
    }

    // ========== Unit-of-work lifecycle ==========

    /// Apply every staged batch to the store
    pub fn commit(&self) -> Result<()> {
        self.session.commit()
    }

    /// Discard every staged batch
    pub fn rollback(&self) {
        self.session.rollback()
    }

    /// Run a closure in a scoped unit of work
    ///
    /// Commits when the closure returns `Ok`, rolls back when it returns
    /// `Err`, and hands the error back either way.
    pub fn with<T>(
        store: Arc<dyn Store>,
        id: impl Into<RelationId>,
        f: impl FnOnce(&SessionTable) -> Result<T>,
    ) -> Result<T> {
        let table = SessionTable::open(store, id)?;
        match f(&table) {
            Ok(value) => {
                table.commit()?;
                Ok(value)
            }
            Err(error) => {
                table.rollback();
                Err(error)
            }
        }
    }
}
