//! In-memory store
//!
//! `MemoryStore` is the reference [`Store`] implementation: a
//! `parking_lot::RwLock` around a map of tables, each table a `BTreeMap`
//! from [`RowKey`] to a full record. The BTreeMap gives the deterministic
//! row ordering the contract requires (ascending primary key) for free.
//!
//! Records are normalized on the way in: every stored row carries every
//! column of its relation, with `Value::Null` filling the gaps. Reads never
//! have to reason about partial rows.
//!
//! Write batches are validated in full before anything is applied, so a
//! failing batch leaves the table untouched.

use parking_lot::RwLock;
use rowdex_core::{Error, Record, Relation, RelationId, Result, RowKey, RowSelector, Store, Value};
use std::collections::BTreeMap;
use tracing::debug;

pub(crate) struct TableData {
    pub(crate) relation: Relation,
    pub(crate) rows: BTreeMap<RowKey, Record>,
}

impl TableData {
    fn new(relation: Relation) -> Self {
        Self {
            relation,
            rows: BTreeMap::new(),
        }
    }

    /// Records in row order, selected and optionally projected
    fn select(&self, rows: &RowSelector, columns: Option<&[String]>) -> Result<Vec<Record>> {
        if let Some(columns) = columns {
            for column in columns {
                self.relation.require_column(column)?;
            }
        }
        let picked = self.pick_rows(rows)?;
        Ok(picked
            .into_iter()
            .map(|record| match columns {
                Some(columns) => record.project(columns),
                None => record.clone(),
            })
            .collect())
    }

    fn pick_rows(&self, rows: &RowSelector) -> Result<Vec<&Record>> {
        match rows {
            RowSelector::All => Ok(self.rows.values().collect()),
            RowSelector::Positions(plan) => Ok(self
                .rows
                .values()
                .skip(plan.start())
                .take(plan.len())
                .collect()),
            RowSelector::Keys(keys) => keys
                .iter()
                .map(|key| {
                    self.rows
                        .get(key)
                        .ok_or_else(|| Error::RowNotFound(key.clone()))
                })
                .collect(),
            RowSelector::Mask(filter) => {
                filter.check_len(self.rows.len())?;
                Ok(self
                    .rows
                    .values()
                    .zip(filter.iter())
                    .filter(|(_, selected)| *selected)
                    .map(|(record, _)| record)
                    .collect())
            }
        }
    }

    /// Normalize an insert record: full column set, gaps filled with null
    ///
    /// A single integer primary-key column is auto-assigned when absent or
    /// null; any other missing key shape is refused. `staged` holds earlier
    /// records of the same batch so their assigned keys are not reused.
    fn normalize_insert(&self, record: &Record, staged: &[(RowKey, Record)]) -> Result<Record> {
        for column in record.columns() {
            self.relation.require_column(column)?;
        }
        let mut full = Record::new();
        for column in self.relation.columns() {
            let value = record.get(column).cloned().unwrap_or(Value::Null);
            full.set(column.clone(), value);
        }
        let keys = self.relation.key_columns();
        let needs_key = keys
            .iter()
            .any(|k| matches!(full.get(k), None | Some(Value::Null)));
        if needs_key {
            if keys.len() != 1 {
                return Err(Error::ValueShape(format!(
                    "insert into `{}` must carry all primary-key columns {:?}",
                    self.relation.id(),
                    keys
                )));
            }
            let key_column = &keys[0];
            let next = self.next_auto_key(key_column, staged)?;
            full.set(key_column.clone(), Value::Int(next));
        }
        Ok(full)
    }

    /// Next integer key: one past the highest stored or staged value
    fn next_auto_key(&self, key_column: &str, staged: &[(RowKey, Record)]) -> Result<i64> {
        let mut highest = 0i64;
        for key in self.rows.keys().chain(staged.iter().map(|(k, _)| k)) {
            match key.get(key_column) {
                Some(Value::Int(i)) => highest = highest.max(*i),
                _ => {
                    return Err(Error::ValueShape(format!(
                        "primary-key column `{key_column}` of `{}` is not integer-valued; \
                         inserts must carry it explicitly",
                        self.relation.id()
                    )))
                }
            }
        }
        Ok(highest + 1)
    }
}

/// Ordered, primary-keyed in-memory store
///
/// # Example
///
/// ```
/// use rowdex_core::{Record, Relation, RelationId, Store, Value};
/// use rowdex_storage::MemoryStore;
///
/// let store = MemoryStore::new();
/// let relation = Relation::new(
///     RelationId::new("people"),
///     vec!["id".into(), "name".into()],
///     vec!["id".into()],
/// )?;
/// store.create_table(relation)?;
/// store.insert_rows(
///     &RelationId::new("people"),
///     &[Record::from_pairs([("name", Value::from("Ada"))])],
/// )?;
/// assert_eq!(store.row_count(&RelationId::new("people"))?, 1);
/// # Ok::<(), rowdex_core::Error>(())
/// ```
#[derive(Default)]
pub struct MemoryStore {
    pub(crate) tables: RwLock<BTreeMap<RelationId, TableData>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new, empty table
    ///
    /// # Errors
    ///
    /// `Storage` when a table with the same identity already exists.
    pub fn create_table(&self, relation: Relation) -> Result<()> {
        let mut tables = self.tables.write();
        let id = relation.id().clone();
        if tables.contains_key(&id) {
            return Err(Error::Storage(format!("relation `{id}` already exists")));
        }
        debug!(target: "rowdex::storage", relation = %id, "create table");
        tables.insert(id, TableData::new(relation));
        Ok(())
    }

    /// Reflect a relation's schema
    ///
    /// # Errors
    ///
    /// `UnknownRelation` when it does not exist.
    pub fn relation(&self, id: &RelationId) -> Result<Relation> {
        let tables = self.tables.read();
        Ok(Self::table(&tables, id)?.relation.clone())
    }

    /// All relation identities known to the store
    pub fn relation_ids(&self) -> Vec<RelationId> {
        self.tables.read().keys().cloned().collect()
    }

    pub(crate) fn table<'a>(
        tables: &'a BTreeMap<RelationId, TableData>,
        id: &RelationId,
    ) -> Result<&'a TableData> {
        tables
            .get(id)
            .ok_or_else(|| Error::UnknownRelation(id.to_string()))
    }

    pub(crate) fn table_mut<'a>(
        tables: &'a mut BTreeMap<RelationId, TableData>,
        id: &RelationId,
    ) -> Result<&'a mut TableData> {
        tables
            .get_mut(id)
            .ok_or_else(|| Error::UnknownRelation(id.to_string()))
    }
}

impl Store for MemoryStore {
    fn row_count(&self, relation: &RelationId) -> Result<usize> {
        let tables = self.tables.read();
        Ok(Self::table(&tables, relation)?.rows.len())
    }

    fn primary_key_columns(&self, relation: &RelationId) -> Result<Vec<String>> {
        let tables = self.tables.read();
        Ok(Self::table(&tables, relation)?
            .relation
            .key_columns()
            .to_vec())
    }

    fn column_names(&self, relation: &RelationId) -> Result<Vec<String>> {
        let tables = self.tables.read();
        Ok(Self::table(&tables, relation)?.relation.columns().to_vec())
    }

    fn select_rows(
        &self,
        relation: &RelationId,
        rows: &RowSelector,
        columns: Option<&[String]>,
    ) -> Result<Vec<Record>> {
        let tables = self.tables.read();
        Self::table(&tables, relation)?.select(rows, columns)
    }

    fn select_column(
        &self,
        relation: &RelationId,
        column: &str,
        rows: &RowSelector,
    ) -> Result<Vec<Value>> {
        let tables = self.tables.read();
        let table = Self::table(&tables, relation)?;
        table.relation.require_column(column)?;
        let picked = table.pick_rows(rows)?;
        Ok(picked
            .into_iter()
            .map(|record| record.get(column).cloned().unwrap_or(Value::Null))
            .collect())
    }

    fn update_rows(&self, relation: &RelationId, records: &[Record]) -> Result<()> {
        let mut tables = self.tables.write();
        let table = Self::table_mut(&mut tables, relation)?;

        // Validate the whole batch before touching any row
        let mut keyed: Vec<(RowKey, &Record)> = Vec::with_capacity(records.len());
        for record in records {
            for column in record.columns() {
                table.relation.require_column(column)?;
            }
            let key = table.relation.row_key_of(record)?;
            if !table.rows.contains_key(&key) {
                return Err(Error::RowNotFound(key));
            }
            keyed.push((key, record));
        }

        debug!(
            target: "rowdex::storage",
            relation = %relation,
            rows = keyed.len(),
            "update batch"
        );
        for (key, record) in keyed {
            if let Some(stored) = table.rows.get_mut(&key) {
                stored.merge(record);
            }
        }
        Ok(())
    }

    fn insert_rows(&self, relation: &RelationId, records: &[Record]) -> Result<()> {
        let mut tables = self.tables.write();
        let table = Self::table_mut(&mut tables, relation)?;

        // Validate the whole batch before touching any row
        let mut staged: Vec<(RowKey, Record)> = Vec::with_capacity(records.len());
        for record in records {
            let full = table.normalize_insert(record, &staged)?;
            let key = table.relation.row_key_of(&full)?;
            if table.rows.contains_key(&key) || staged.iter().any(|(k, _)| *k == key) {
                return Err(Error::DuplicateKey(key));
            }
            staged.push((key, full));
        }
        debug!(
            target: "rowdex::storage",
            relation = %relation,
            rows = staged.len(),
            "insert batch"
        );
        for (key, full) in staged {
            table.rows.insert(key, full);
        }
        Ok(())
    }

    fn delete_rows(&self, relation: &RelationId, keys: &[RowKey]) -> Result<()> {
        let mut tables = self.tables.write();
        let table = Self::table_mut(&mut tables, relation)?;

        let mut distinct: Vec<&RowKey> = Vec::with_capacity(keys.len());
        for key in keys {
            if !table.rows.contains_key(key) {
                return Err(Error::RowNotFound(key.clone()));
            }
            if !distinct.contains(&key) {
                distinct.push(key);
            }
        }
        debug!(
            target: "rowdex::storage",
            relation = %relation,
            rows = distinct.len(),
            "delete batch"
        );
        for key in distinct {
            table.rows.remove(key);
        }
        Ok(())
    }
}
