//! Unit of work
//!
//! A `Session` is the scoped transactional context shared by every selection
//! derived from one root handle. Mutations are staged here as batches, in
//! order; nothing reaches the store until `commit`. Reads merge the staged
//! batches over the store's rows (read-your-writes), so a write staged
//! through one selection is immediately visible to any sibling selection
//! sharing the session.
//!
//! The session provides no snapshot isolation. Row counts and key sets are
//! recomputed against the live store on every read, so positions resolved
//! at different times may disagree if the store changes underneath.
//!
//! Commit applies the staged batches to the store in staging order. Each
//! batch is all-or-nothing at the store, but the sequence as a whole is
//! only as atomic as the store makes it; a commit that fails part-way
//! discards the remaining batches and reports the error.

use parking_lot::RwLock;
use rowdex_core::{
    Error, Record, Relation, RelationId, Result, RowKey, RowSelector, Store, Value,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

/// One staged mutation batch
#[derive(Debug, Clone)]
enum StagedBatch {
    Update {
        relation: RelationId,
        records: Vec<Record>,
    },
    Insert {
        relation: RelationId,
        records: Vec<Record>,
    },
    Delete {
        relation: RelationId,
        keys: Vec<RowKey>,
    },
}

impl StagedBatch {
    fn relation(&self) -> &RelationId {
        match self {
            StagedBatch::Update { relation, .. }
            | StagedBatch::Insert { relation, .. }
            | StagedBatch::Delete { relation, .. } => relation,
        }
    }
}

/// Scoped unit of work over one store
///
/// Selections never own the session; they hold a shared reference, and the
/// session must outlive them. Dropping an uncommitted session discards its
/// staged batches.
pub struct Session {
    store: Arc<dyn Store>,
    staged: RwLock<Vec<StagedBatch>>,
}

impl Session {
    /// Open a unit of work over a store
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            store,
            staged: RwLock::new(Vec::new()),
        }
    }

    /// The store this session stages against
    pub fn store(&self) -> &Arc<dyn Store> {
        &self.store
    }

    /// Number of staged batches awaiting commit
    pub fn staged_len(&self) -> usize {
        self.staged.read().len()
    }

    /// True when nothing is staged
    pub fn is_clean(&self) -> bool {
        self.staged.read().is_empty()
    }

    // ========== Read path (store merged with staged batches) ==========

    /// The visible rows of a relation, in ascending primary-key order
    ///
    /// Store rows with staged updates merged in, staged deletes removed,
    /// and staged inserts interleaved by key.
    fn visible_rows(&self, relation: &Relation) -> Result<BTreeMap<RowKey, Record>> {
        let base = self
            .store
            .select_rows(relation.id(), &RowSelector::All, None)?;
        let mut rows = BTreeMap::new();
        for record in base {
            rows.insert(relation.row_key_of(&record)?, record);
        }
        for batch in self.staged.read().iter() {
            if batch.relation() != relation.id() {
                continue;
            }
            match batch {
                StagedBatch::Update { records, .. } => {
                    for record in records {
                        let key = relation.row_key_of(record)?;
                        if let Some(row) = rows.get_mut(&key) {
                            row.merge(record);
                        }
                    }
                }
                StagedBatch::Insert { records, .. } => {
                    for record in records {
                        rows.insert(relation.row_key_of(record)?, record.clone());
                    }
                }
                StagedBatch::Delete { keys, .. } => {
                    for key in keys {
                        rows.remove(key);
                    }
                }
            }
        }
        Ok(rows)
    }

    /// Visible row count
    pub fn row_count(&self, relation: &Relation) -> Result<usize> {
        Ok(self.visible_rows(relation)?.len())
    }

    /// Visible row keys in row order
    pub fn row_keys(&self, relation: &Relation) -> Result<Vec<RowKey>> {
        Ok(self.visible_rows(relation)?.into_keys().collect())
    }

    /// All visible records in row order, optionally projected
    pub fn records(&self, relation: &Relation, columns: Option<&[String]>) -> Result<Vec<Record>> {
        self.check_columns(relation, columns)?;
        Ok(self
            .visible_rows(relation)?
            .into_values()
            .map(|record| project(record, columns))
            .collect())
    }

    /// Visible records for explicit keys, in the given key order
    ///
    /// # Errors
    ///
    /// `RowNotFound` for a key with no visible row.
    pub fn records_by_keys(
        &self,
        relation: &Relation,
        keys: &[RowKey],
        columns: Option<&[String]>,
    ) -> Result<Vec<Record>> {
        self.check_columns(relation, columns)?;
        let rows = self.visible_rows(relation)?;
        keys.iter()
            .map(|key| {
                rows.get(key)
                    .cloned()
                    .map(|record| project(record, columns))
                    .ok_or_else(|| Error::RowNotFound(key.clone()))
            })
            .collect()
    }

    /// One column's visible values over all rows, in row order
    pub fn column_values(&self, relation: &Relation, column: &str) -> Result<Vec<Value>> {
        relation.require_column(column)?;
        Ok(self
            .visible_rows(relation)?
            .into_values()
            .map(|record| record.get(column).cloned().unwrap_or(Value::Null))
            .collect())
    }

    /// One column's visible values for explicit keys, in key order
    pub fn column_values_by_keys(
        &self,
        relation: &Relation,
        column: &str,
        keys: &[RowKey],
    ) -> Result<Vec<Value>> {
        relation.require_column(column)?;
        let rows = self.visible_rows(relation)?;
        keys.iter()
            .map(|key| {
                rows.get(key)
                    .map(|record| record.get(column).cloned().unwrap_or(Value::Null))
                    .ok_or_else(|| Error::RowNotFound(key.clone()))
            })
            .collect()
    }

    fn check_columns(&self, relation: &Relation, columns: Option<&[String]>) -> Result<()> {
        if let Some(columns) = columns {
            for column in columns {
                relation.require_column(column)?;
            }
        }
        Ok(())
    }

    // ========== Staging ==========

    /// Stage one batch of keyed updates
    ///
    /// Every record must carry its primary-key columns and address a
    /// visible row; validation happens here, synchronously, not at commit.
    pub fn stage_update(&self, relation: &Relation, records: Vec<Record>) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }
        let rows = self.visible_rows(relation)?;
        for record in &records {
            for column in record.columns() {
                relation.require_column(column)?;
            }
            let key = relation.row_key_of(record)?;
            if !rows.contains_key(&key) {
                return Err(Error::RowNotFound(key));
            }
        }
        debug!(
            target: "rowdex::session",
            relation = %relation.id(),
            rows = records.len(),
            "stage update"
        );
        self.staged.write().push(StagedBatch::Update {
            relation: relation.id().clone(),
            records,
        });
        Ok(())
    }

    /// Stage one batch of inserts
    ///
    /// Records are normalized here (full column set, nulls filled in, a
    /// single integer key auto-assigned) so the new rows are addressable by
    /// sibling selections before commit.
    pub fn stage_insert(&self, relation: &Relation, records: Vec<Record>) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }
        let rows = self.visible_rows(relation)?;
        let mut normalized: Vec<Record> = Vec::with_capacity(records.len());
        let mut new_keys: Vec<RowKey> = Vec::with_capacity(records.len());
        for record in &records {
            let full = normalize_insert(relation, record, &rows, &new_keys)?;
            let key = relation.row_key_of(&full)?;
            if rows.contains_key(&key) || new_keys.contains(&key) {
                return Err(Error::DuplicateKey(key));
            }
            new_keys.push(key);
            normalized.push(full);
        }
        debug!(
            target: "rowdex::session",
            relation = %relation.id(),
            rows = normalized.len(),
            "stage insert"
        );
        self.staged.write().push(StagedBatch::Insert {
            relation: relation.id().clone(),
            records: normalized,
        });
        Ok(())
    }

    /// Stage one batch of keyed deletes
    ///
    /// Duplicate keys collapse; every key must address a visible row.
    pub fn stage_delete(&self, relation: &Relation, keys: Vec<RowKey>) -> Result<()> {
        if keys.is_empty() {
            return Ok(());
        }
        let rows = self.visible_rows(relation)?;
        let mut distinct: Vec<RowKey> = Vec::with_capacity(keys.len());
        for key in keys {
            if !rows.contains_key(&key) {
                return Err(Error::RowNotFound(key));
            }
            if !distinct.contains(&key) {
                distinct.push(key);
            }
        }
        debug!(
            target: "rowdex::session",
            relation = %relation.id(),
            rows = distinct.len(),
            "stage delete"
        );
        self.staged.write().push(StagedBatch::Delete {
            relation: relation.id().clone(),
            keys: distinct,
        });
        Ok(())
    }

    // ========== Lifecycle ==========

    /// Apply every staged batch to the store, in staging order
    ///
    /// On failure the remaining batches are discarded and the error is
    /// returned; batches already applied stay applied (the store owns any
    /// stronger atomicity).
    pub fn commit(&self) -> Result<()> {
        let staged: Vec<StagedBatch> = std::mem::take(&mut *self.staged.write());
        let batches = staged.len();
        for batch in staged {
            match batch {
                StagedBatch::Update { relation, records } => {
                    self.store.update_rows(&relation, &records)?
                }
                StagedBatch::Insert { relation, records } => {
                    self.store.insert_rows(&relation, &records)?
                }
                StagedBatch::Delete { relation, keys } => {
                    self.store.delete_rows(&relation, &keys)?
                }
            }
        }
        debug!(target: "rowdex::session", batches, "commit");
        Ok(())
    }

    /// Discard every staged batch
    pub fn rollback(&self) {
        let dropped = {
            let mut staged = self.staged.write();
            let dropped = staged.len();
            staged.clear();
            dropped
        };
        debug!(target: "rowdex::session", batches = dropped, "rollback");
    }
}

fn project(record: Record, columns: Option<&[String]>) -> Record {
    match columns {
        Some(columns) => record.project(columns),
        None => record,
    }
}

/// Fill an insert record out to the full column set
///
/// Mirrors what the store will do at commit, so visibility and the final
/// state agree: missing columns become null, and a single integer key
/// column is assigned one past the highest visible or already-staged value.
fn normalize_insert(
    relation: &Relation,
    record: &Record,
    visible: &BTreeMap<RowKey, Record>,
    new_keys: &[RowKey],
) -> Result<Record> {
    for column in record.columns() {
        relation.require_column(column)?;
    }
    let mut full = Record::new();
    for column in relation.columns() {
        let value = record.get(column).cloned().unwrap_or(Value::Null);
        full.set(column.clone(), value);
    }
    let keys = relation.key_columns();
    let needs_key = keys
        .iter()
        .any(|k| matches!(full.get(k), None | Some(Value::Null)));
    if needs_key {
        if keys.len() != 1 {
            return Err(Error::ValueShape(format!(
                "insert into `{}` must carry all primary-key columns {:?}",
                relation.id(),
                keys
            )));
        }
        let key_column = &keys[0];
        let mut highest = 0i64;
        for key in visible.keys().chain(new_keys.iter()) {
            match key.get(key_column) {
                Some(Value::Int(i)) => highest = highest.max(*i),
                _ => {
                    return Err(Error::ValueShape(format!(
                        "primary-key column `{key_column}` of `{}` is not integer-valued; \
                         inserts must carry it explicitly",
                        relation.id()
                    )))
                }
            }
        }
        full.set(key_column.clone(), Value::Int(highest + 1));
    }
    Ok(full)
}
