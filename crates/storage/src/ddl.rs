//! Schema administration
//!
//! These operations change a table's shape or identity. None of them are
//! part of the [`Store`](rowdex_core::Store) contract: the selection algebra
//! never invokes them, and they must only run before or after a selection's
//! lifetime. Each returns the freshly reflected [`Relation`] the way a
//! migration tool re-reflects after altering.

use crate::memory::MemoryStore;
use rowdex_core::{Error, Record, Relation, RelationId, Result, Store, Value};
use std::collections::BTreeMap;
use tracing::debug;

impl MemoryStore {
    /// Remove a table and all of its rows
    ///
    /// # Errors
    ///
    /// `UnknownRelation` when it does not exist.
    pub fn drop_table(&self, id: &RelationId) -> Result<()> {
        let mut tables = self.tables.write();
        if tables.remove(id).is_none() {
            return Err(Error::UnknownRelation(id.to_string()));
        }
        debug!(target: "rowdex::storage", relation = %id, "drop table");
        Ok(())
    }

    /// Rename a table, keeping its namespace
    ///
    /// # Errors
    ///
    /// `UnknownRelation` for the source, `Storage` when the target name is
    /// taken.
    pub fn rename_table(&self, id: &RelationId, new_name: &str) -> Result<Relation> {
        let mut tables = self.tables.write();
        let new_id = match id.namespace() {
            Some(ns) => RelationId::with_namespace(new_name, ns),
            None => RelationId::new(new_name),
        };
        if tables.contains_key(&new_id) {
            return Err(Error::Storage(format!("relation `{new_id}` already exists")));
        }
        let mut table = tables
            .remove(id)
            .ok_or_else(|| Error::UnknownRelation(id.to_string()))?;
        table.relation = Relation::new(
            new_id.clone(),
            table.relation.columns().to_vec(),
            table.relation.key_columns().to_vec(),
        )?;
        let relation = table.relation.clone();
        debug!(target: "rowdex::storage", from = %id, to = %new_id, "rename table");
        tables.insert(new_id, table);
        Ok(relation)
    }

    /// Copy a table's schema and rows under a new name
    ///
    /// With `replace` set, an existing table of that name is dropped first;
    /// without it, a name collision is an error.
    pub fn copy_table(&self, id: &RelationId, new_name: &str, replace: bool) -> Result<Relation> {
        let (relation, rows) = {
            let tables = self.tables.read();
            let table = Self::table(&tables, id)?;
            (table.relation.clone(), table.rows.clone())
        };
        let new_id = match id.namespace() {
            Some(ns) => RelationId::with_namespace(new_name, ns),
            None => RelationId::new(new_name),
        };
        let target_exists = self.tables.read().contains_key(&new_id);
        if replace && target_exists {
            self.drop_table(&new_id)?;
        }
        let copy = Relation::new(
            new_id.clone(),
            relation.columns().to_vec(),
            relation.key_columns().to_vec(),
        )?;
        self.create_table(copy.clone())?;
        {
            let mut tables = self.tables.write();
            let table = Self::table_mut(&mut tables, &new_id)?;
            table.rows = rows;
        }
        debug!(target: "rowdex::storage", from = %id, to = %new_id, "copy table");
        Ok(copy)
    }

    /// Append every row of one table into another with the same columns
    ///
    /// # Errors
    ///
    /// `Storage` when the column lists differ, `DuplicateKey` on key
    /// collisions.
    pub fn insert_from_table(&self, src: &RelationId, dst: &RelationId) -> Result<()> {
        let rows: Vec<Record> = {
            let tables = self.tables.read();
            let src_table = Self::table(&tables, src)?;
            let dst_table = Self::table(&tables, dst)?;
            if src_table.relation.columns() != dst_table.relation.columns() {
                return Err(Error::Storage(format!(
                    "relations `{src}` and `{dst}` have different columns"
                )));
            }
            src_table.rows.values().cloned().collect()
        };
        self.insert_rows(dst, &rows)
    }

    /// Add a column, filling existing rows with null
    ///
    /// # Errors
    ///
    /// `Storage` when the column already exists.
    pub fn add_column(&self, id: &RelationId, column: &str) -> Result<Relation> {
        let mut tables = self.tables.write();
        let table = Self::table_mut(&mut tables, id)?;
        if table.relation.has_column(column) {
            return Err(Error::Storage(format!(
                "column `{column}` already exists in `{id}`"
            )));
        }
        let mut columns = table.relation.columns().to_vec();
        columns.push(column.to_string());
        table.relation = Relation::new(
            id.clone(),
            columns,
            table.relation.key_columns().to_vec(),
        )?;
        for record in table.rows.values_mut() {
            record.set(column.to_string(), Value::Null);
        }
        debug!(target: "rowdex::storage", relation = %id, column, "add column");
        Ok(table.relation.clone())
    }

    /// Rename a column, rewriting stored rows (and keys, for a key column)
    ///
    /// # Errors
    ///
    /// `UnknownColumn` for the old name, `Storage` when the new name is
    /// taken.
    pub fn rename_column(&self, id: &RelationId, old: &str, new: &str) -> Result<Relation> {
        let mut tables = self.tables.write();
        let table = Self::table_mut(&mut tables, id)?;
        table.relation.require_column(old)?;
        if table.relation.has_column(new) {
            return Err(Error::Storage(format!(
                "column `{new}` already exists in `{id}`"
            )));
        }
        let columns = table
            .relation
            .columns()
            .iter()
            .map(|c| if c == old { new.to_string() } else { c.clone() })
            .collect();
        let key_columns: Vec<String> = table
            .relation
            .key_columns()
            .iter()
            .map(|c| if c == old { new.to_string() } else { c.clone() })
            .collect();
        table.relation = Relation::new(id.clone(), columns, key_columns)?;

        let mut rows = BTreeMap::new();
        for (_, record) in std::mem::take(&mut table.rows) {
            let mut renamed = Record::new();
            for (name, value) in record.iter() {
                let name = if name == old { new } else { name };
                renamed.set(name.to_string(), value.clone());
            }
            let key = table.relation.row_key_of(&renamed)?;
            rows.insert(key, renamed);
        }
        table.rows = rows;
        debug!(target: "rowdex::storage", relation = %id, old, new, "rename column");
        Ok(table.relation.clone())
    }

    /// Drop a non-key column and its values
    ///
    /// # Errors
    ///
    /// `UnknownColumn` when absent, `Storage` when it is part of the
    /// primary key.
    pub fn drop_column(&self, id: &RelationId, column: &str) -> Result<Relation> {
        let mut tables = self.tables.write();
        let table = Self::table_mut(&mut tables, id)?;
        table.relation.require_column(column)?;
        if table.relation.is_key_column(column) {
            return Err(Error::Storage(format!(
                "cannot drop primary-key column `{column}` of `{id}`; re-key the table first"
            )));
        }
        let columns = table
            .relation
            .columns()
            .iter()
            .filter(|c| *c != column)
            .cloned()
            .collect();
        table.relation = Relation::new(
            id.clone(),
            columns,
            table.relation.key_columns().to_vec(),
        )?;
        for record in table.rows.values_mut() {
            record.remove(column);
        }
        debug!(target: "rowdex::storage", relation = %id, column, "drop column");
        Ok(table.relation.clone())
    }

    /// Re-key a table on different columns
    ///
    /// Every row must hold a distinct, fully non-null value tuple under the
    /// new key. Rows are re-ordered by the new key.
    ///
    /// # Errors
    ///
    /// `UnknownColumn` for an absent key column, `ValueShape` for a null
    /// key value, `DuplicateKey` when two rows collide under the new key.
    pub fn replace_primary_key(&self, id: &RelationId, key_columns: Vec<String>) -> Result<Relation> {
        let mut tables = self.tables.write();
        let table = Self::table_mut(&mut tables, id)?;
        let relation = Relation::new(id.clone(), table.relation.columns().to_vec(), key_columns)?;

        let mut rows = BTreeMap::new();
        for record in table.rows.values() {
            let key = relation.row_key_of(record)?;
            if key.iter().any(|(_, v)| v.is_null()) {
                return Err(Error::ValueShape(format!(
                    "row {key} has a null value under the new primary key of `{id}`"
                )));
            }
            if rows.insert(key.clone(), record.clone()).is_some() {
                return Err(Error::DuplicateKey(key));
            }
        }
        table.relation = relation.clone();
        table.rows = rows;
        debug!(
            target: "rowdex::storage",
            relation = %id,
            key = ?relation.key_columns(),
            "replace primary key"
        );
        Ok(relation)
    }
}
