//! Store contract
//!
//! This module defines the `Store` trait, the minimal surface the selection
//! algebra consumes from whatever executes reads and writes underneath it.
//! The algebra resolves index expressions down to row selectors and batched
//! mutations; the store runs them. Swapping the store implementation must
//! not disturb any layer above.
//!
//! Schema changes (adding, renaming, or dropping columns, re-keying a
//! table) are deliberately outside this contract. They happen before or
//! after a selection's lifetime, never through it.
//!
//! Thread safety: all methods must be safe to call concurrently from
//! multiple threads (requires Send + Sync). The algebra itself stays on one
//! logical thread and adds no locking of its own.

use crate::error::Result;
use crate::filter::Filter;
use crate::index::SlicePlan;
use crate::record::{Record, RowKey};
use crate::relation::RelationId;
use crate::value::Value;

/// The row-subset forms a store read accepts
#[derive(Debug, Clone, PartialEq)]
pub enum RowSelector {
    /// Every row, in the relation's ordering
    All,
    /// Contiguous positions under the relation's ordering
    Positions(SlicePlan),
    /// Explicit rows by primary key, in the given order
    Keys(Vec<RowKey>),
    /// Positional mask over the relation's ordering
    Mask(Filter),
}

/// Minimal read/write executor behind the selection algebra
///
/// Row ordering is the store's obligation: every read that returns multiple
/// rows must use one deterministic ordering (ascending primary key), so that
/// positions and masks resolved by the algebra line up with what the store
/// returns.
pub trait Store: Send + Sync {
    /// Current number of rows in the relation
    ///
    /// # Errors
    ///
    /// `UnknownRelation` when the relation does not exist.
    fn row_count(&self, relation: &RelationId) -> Result<usize>;

    /// Ordered primary-key column names of the relation
    ///
    /// # Errors
    ///
    /// `UnknownRelation` when the relation does not exist.
    fn primary_key_columns(&self, relation: &RelationId) -> Result<Vec<String>>;

    /// Ordered column names of the relation
    ///
    /// # Errors
    ///
    /// `UnknownRelation` when the relation does not exist.
    fn column_names(&self, relation: &RelationId) -> Result<Vec<String>>;

    /// Read records for a row subset, optionally projected to named columns
    ///
    /// Results come back in the relation's ordering for `All`, `Positions`,
    /// and `Mask` selectors, and in the order the keys were given for
    /// `Keys`.
    ///
    /// # Errors
    ///
    /// `UnknownRelation`, `UnknownColumn`, `RowNotFound` for a key selector
    /// naming an absent row, `FilterLengthMismatch` for a mask of the wrong
    /// length.
    fn select_rows(
        &self,
        relation: &RelationId,
        rows: &RowSelector,
        columns: Option<&[String]>,
    ) -> Result<Vec<Record>>;

    /// Read a single column's values for a row subset
    ///
    /// Same ordering and error contract as [`Store::select_rows`].
    fn select_column(
        &self,
        relation: &RelationId,
        column: &str,
        rows: &RowSelector,
    ) -> Result<Vec<Value>>;

    /// Apply one batch of keyed updates
    ///
    /// Every record must carry its primary-key columns; non-key fields are
    /// merged over the stored row.
    ///
    /// # Errors
    ///
    /// `RowNotFound` if any record's key is absent; the batch is applied
    /// all-or-nothing.
    fn update_rows(&self, relation: &RelationId, records: &[Record]) -> Result<()>;

    /// Apply one batch of inserts
    ///
    /// # Errors
    ///
    /// `DuplicateKey` when a record collides with an existing row,
    /// `ValueShape` when a record omits a key the store cannot assign.
    fn insert_rows(&self, relation: &RelationId, records: &[Record]) -> Result<()>;

    /// Apply one batch of keyed deletes
    ///
    /// # Errors
    ///
    /// `RowNotFound` if any key is absent; the batch is applied
    /// all-or-nothing.
    fn delete_rows(&self, relation: &RelationId, keys: &[RowKey]) -> Result<()>;
}
