//! Records and row keys
//!
//! A `Record` is an ordered mapping of column name to [`Value`]; insertion
//! order is column order. Records may be partial (a subset of a relation's
//! columns), which is how column-restricted reads and partial updates travel.
//!
//! A `RowKey` is the ordered mapping of each primary-key column to its value.
//! It is the only stable identity a row has: positional indices are valid
//! only within one ordering snapshot, row keys survive across operations.

use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Ordered column-name to value mapping
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    fields: Vec<(String, Value)>,
}

impl Record {
    /// Create an empty record
    pub fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Build a record from (column, value) pairs, preserving order
    ///
    /// A repeated column name overwrites the earlier value in place.
    pub fn from_pairs<I, N, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (N, V)>,
        N: Into<String>,
        V: Into<Value>,
    {
        let mut record = Self::new();
        for (name, value) in pairs {
            record.set(name.into(), value.into());
        }
        record
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True when the record has no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Look up a value by column name
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    /// True when the record carries the column
    pub fn contains(&self, column: &str) -> bool {
        self.get(column).is_some()
    }

    /// Set a value, replacing in place or appending at the end
    pub fn set(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        let column = column.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(name, _)| *name == column) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((column, value)),
        }
    }

    /// Remove a field, returning its value if present
    pub fn remove(&mut self, column: &str) -> Option<Value> {
        let idx = self.fields.iter().position(|(name, _)| name == column)?;
        Some(self.fields.remove(idx).1)
    }

    /// Column names in record order
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    /// Iterate over (column, value) pairs in record order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Overlay another record's fields onto this one
    ///
    /// Fields present in `other` replace or extend this record; fields
    /// absent from `other` are untouched.
    pub fn merge(&mut self, other: &Record) {
        for (name, value) in &other.fields {
            self.set(name.clone(), value.clone());
        }
    }

    /// Keep only the named columns, in the given order
    ///
    /// Columns the record does not carry are skipped.
    pub fn project(&self, columns: &[String]) -> Record {
        let mut out = Record::new();
        for column in columns {
            if let Some(value) = self.get(column) {
                out.set(column.clone(), value.clone());
            }
        }
        out
    }
}

impl<'a> IntoIterator for &'a Record {
    type Item = (&'a str, &'a Value);
    type IntoIter = Box<dyn Iterator<Item = (&'a str, &'a Value)> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.fields.iter().map(|(n, v)| (n.as_str(), v)))
    }
}

/// Primary-key values identifying one row
///
/// Fields are ordered by the relation's primary-key column order, so two
/// keys of the same relation compare field by field, which is also the
/// table's row ordering.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RowKey {
    fields: Vec<(String, Value)>,
}

impl RowKey {
    /// Build a key from (column, value) pairs, preserving order
    pub fn from_pairs<I, N, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (N, V)>,
        N: Into<String>,
        V: Into<Value>,
    {
        Self {
            fields: pairs
                .into_iter()
                .map(|(n, v)| (n.into(), v.into()))
                .collect(),
        }
    }

    /// Number of key columns
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True when the key has no columns
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Look up a key value by column name
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    /// Key column names in key order
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    /// Iterate over (column, value) pairs in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// View the key as a partial record
    pub fn to_record(&self) -> Record {
        Record::from_pairs(self.fields.iter().map(|(n, v)| (n.clone(), v.clone())))
    }
}

impl fmt::Display for RowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, (name, value)) in self.fields.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{name}={value}")?;
        }
        write!(f, ")")
    }
}
