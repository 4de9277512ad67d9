//! Relation identity and schema
//!
//! A `RelationId` names a table (plus optional namespace) and is what the
//! [`Store`](crate::store::Store) contract keys every call on. A `Relation`
//! is the reflected schema the algebra works against: ordered column names
//! and a non-empty ordered primary-key column list.
//!
//! A relation without a primary key cannot be addressed by this layer at
//! all; construction fails with `MissingPrimaryKey` before any selection
//! can be built on it.

use crate::error::{Error, Result};
use crate::record::{Record, RowKey};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Name (+ optional namespace) identifying one relation in a store
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RelationId {
    name: String,
    namespace: Option<String>,
}

impl RelationId {
    /// Identify a relation by bare name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: None,
        }
    }

    /// Identify a relation inside a namespace
    pub fn with_namespace(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: Some(namespace.into()),
        }
    }

    /// Bare relation name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Namespace, when present
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }
}

impl fmt::Display for RelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "{ns}.{}", self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

impl From<&str> for RelationId {
    fn from(name: &str) -> Self {
        RelationId::new(name)
    }
}

impl From<String> for RelationId {
    fn from(name: String) -> Self {
        RelationId::new(name)
    }
}

/// Reflected schema of one relation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relation {
    id: RelationId,
    columns: Vec<String>,
    key_columns: Vec<String>,
}

impl Relation {
    /// Build a relation schema, validating its shape
    ///
    /// # Errors
    ///
    /// `MissingPrimaryKey` when `key_columns` is empty, `UnknownColumn` when
    /// a key column is not among the columns, `Storage` on a duplicate
    /// column name.
    pub fn new(
        id: RelationId,
        columns: Vec<String>,
        key_columns: Vec<String>,
    ) -> Result<Self> {
        if key_columns.is_empty() {
            return Err(Error::MissingPrimaryKey {
                relation: id.to_string(),
            });
        }
        for (i, column) in columns.iter().enumerate() {
            if columns[..i].contains(column) {
                return Err(Error::Storage(format!(
                    "duplicate column `{column}` in relation `{id}`"
                )));
            }
        }
        for key in &key_columns {
            if !columns.contains(key) {
                return Err(Error::UnknownColumn {
                    relation: id.to_string(),
                    column: key.clone(),
                });
            }
        }
        Ok(Self {
            id,
            columns,
            key_columns,
        })
    }

    /// Relation identity
    pub fn id(&self) -> &RelationId {
        &self.id
    }

    /// Ordered column names
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Ordered primary-key column names
    pub fn key_columns(&self) -> &[String] {
        &self.key_columns
    }

    /// True when the relation has the column
    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    /// True when the column is part of the primary key
    pub fn is_key_column(&self, column: &str) -> bool {
        self.key_columns.iter().any(|c| c == column)
    }

    /// Validate that a column exists on this relation
    ///
    /// # Errors
    ///
    /// `UnknownColumn` when it does not.
    pub fn require_column(&self, column: &str) -> Result<()> {
        if self.has_column(column) {
            Ok(())
        } else {
            Err(Error::UnknownColumn {
                relation: self.id.to_string(),
                column: column.to_string(),
            })
        }
    }

    /// Extract the row key a record carries, if it carries all key columns
    pub fn try_row_key(&self, record: &Record) -> Option<RowKey> {
        let mut pairs = Vec::with_capacity(self.key_columns.len());
        for key in &self.key_columns {
            pairs.push((key.clone(), record.get(key)?.clone()));
        }
        Some(RowKey::from_pairs(pairs))
    }

    /// Extract the row key a record must carry
    ///
    /// # Errors
    ///
    /// `ValueShape` when the record is missing a primary-key column.
    pub fn row_key_of(&self, record: &Record) -> Result<RowKey> {
        self.try_row_key(record).ok_or_else(|| {
            Error::ValueShape(format!(
                "record is missing a primary-key column of relation `{}` (key columns: {:?})",
                self.id, self.key_columns
            ))
        })
    }
}
