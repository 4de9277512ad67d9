//! Mutation propagation
//!
//! Writes flow through a selection in three steps: materialize the current
//! row keys of the target, build one batch of keyed records in memory, and
//! stage that batch on the shared session. The store only ever sees batch
//! calls, never a row-at-a-time loop.
//!
//! The update payload is shape-checked against the selection. A
//! column-restricted target takes a scalar (broadcast) or a positional
//! value sequence; a row target takes a record or a positional record
//! sequence. Positional payloads stop at the shorter side, the same
//! documented quirk the comparisons carry.
//!
//! Primary-key columns are never updatable through a selection. A record
//! payload may carry key columns, but they must match the row it lands on;
//! re-keying rows is schema administration, not an update.

use crate::compare::Operand;
use crate::selection::{ColumnSet, RowSet, Selection};
use rowdex_core::{Error, Record, Result, RowKey, Value};

/// Update payload shapes a selection accepts
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateValue {
    /// One value, broadcast to every targeted row (column targets)
    Scalar(Value),
    /// Values consumed positionally against the targeted rows (column targets)
    Values(Vec<Value>),
    /// One full or partial record (single-row targets)
    Record(Record),
    /// Records consumed positionally against the targeted rows
    Records(Vec<Record>),
}

impl From<Value> for UpdateValue {
    fn from(value: Value) -> Self {
        UpdateValue::Scalar(value)
    }
}

impl From<Vec<Value>> for UpdateValue {
    fn from(values: Vec<Value>) -> Self {
        UpdateValue::Values(values)
    }
}

impl From<Record> for UpdateValue {
    fn from(record: Record) -> Self {
        UpdateValue::Record(record)
    }
}

impl From<Vec<Record>> for UpdateValue {
    fn from(records: Vec<Record>) -> Self {
        UpdateValue::Records(records)
    }
}

impl From<i64> for UpdateValue {
    fn from(value: i64) -> Self {
        UpdateValue::Scalar(Value::Int(value))
    }
}

impl From<f64> for UpdateValue {
    fn from(value: f64) -> Self {
        UpdateValue::Scalar(Value::Float(value))
    }
}

impl From<bool> for UpdateValue {
    fn from(value: bool) -> Self {
        UpdateValue::Scalar(Value::Bool(value))
    }
}

impl From<&str> for UpdateValue {
    fn from(value: &str) -> Self {
        UpdateValue::Scalar(Value::Text(value.to_string()))
    }
}

impl Selection {
    // ========== Update ==========

    /// Stage an update of this selection to the given payload
    ///
    /// Row keys are materialized before the batch is built, and exactly one
    /// batched update reaches the session.
    ///
    /// # Errors
    ///
    /// `ValueShape` when the payload shape does not fit the selection,
    /// `KeyMismatch` when a record carries key values that contradict the
    /// row it is aligned to, `RowNotFound` when a targeted row has
    /// disappeared.
    pub fn update(&self, value: impl Into<UpdateValue>) -> Result<()> {
        let value: UpdateValue = value.into();
        let keys = self.row_keys()?;
        let batch = match (self.columns(), value) {
            (ColumnSet::One(column), UpdateValue::Scalar(value)) => {
                self.refuse_key_column(column)?;
                keys.iter()
                    .map(|key| cell_record(key, column, value.clone()))
                    .collect()
            }
            (ColumnSet::One(column), UpdateValue::Values(values)) => {
                self.refuse_key_column(column)?;
                keys.iter()
                    .zip(values)
                    .map(|(key, value)| cell_record(key, column, value))
                    .collect()
            }
            (ColumnSet::One(_), payload) => {
                return Err(Error::ValueShape(format!(
                    "a {} selection takes a scalar or a value sequence, not {}",
                    self.kind(),
                    payload_name(&payload)
                )))
            }
            (_, UpdateValue::Record(record)) => {
                let RowSet::One(key) = self.rows() else {
                    return Err(Error::ValueShape(format!(
                        "a {} selection takes a record sequence, not a single record",
                        self.kind()
                    )));
                };
                vec![keyed_record(self, key, &record)?]
            }
            (_, UpdateValue::Records(records)) => keys
                .iter()
                .zip(records.iter())
                .map(|(key, record)| keyed_record(self, key, record))
                .collect::<Result<_>>()?,
            (_, payload) => {
                return Err(Error::ValueShape(format!(
                    "a {} selection takes record payloads, not {}",
                    self.kind(),
                    payload_name(&payload)
                )))
            }
        };
        self.session().stage_update(self.relation(), batch)
    }

    // ========== Delete ==========

    /// Stage deletion of every row this selection resolves to
    ///
    /// Column restriction does not narrow a delete; the underlying rows go.
    pub fn delete(&self) -> Result<()> {
        let keys = self.row_keys()?;
        self.session().stage_delete(self.relation(), keys)
    }

    // ========== Arithmetic ==========

    /// Read the selected column, add the amount, stage the update
    ///
    /// Read-modify-write with no isolation beyond the shared session;
    /// concurrent writers can race. The amount is a scalar broadcast or a
    /// positional sequence, stopping at the shorter side.
    ///
    /// # Errors
    ///
    /// `ValueShape` unless the selection is column-restricted,
    /// `TypeMismatch` or `Arithmetic` from the value arithmetic.
    pub fn increment_by(&self, amount: impl Into<Operand>) -> Result<()> {
        self.arithmetic_update(amount.into(), Value::add)
    }

    /// Read the selected column, subtract the amount, stage the update
    ///
    /// Same contract as [`Selection::increment_by`].
    pub fn decrement_by(&self, amount: impl Into<Operand>) -> Result<()> {
        self.arithmetic_update(amount.into(), Value::sub)
    }

    fn arithmetic_update(
        &self,
        amount: Operand,
        op: impl Fn(&Value, &Value) -> Result<Value>,
    ) -> Result<()> {
        let column = self.single_column()?.to_string();
        self.refuse_key_column(&column)?;
        let keys = self.row_keys()?;
        let values = self.values()?;
        let batch = match amount {
            Operand::Scalar(amount) => keys
                .iter()
                .zip(values.iter())
                .map(|(key, value)| Ok(cell_record(key, &column, op(value, &amount)?)))
                .collect::<Result<Vec<_>>>()?,
            Operand::Sequence(amounts) => keys
                .iter()
                .zip(values.iter())
                .zip(amounts.iter())
                .map(|((key, value), amount)| Ok(cell_record(key, &column, op(value, amount)?)))
                .collect::<Result<Vec<_>>>()?,
        };
        self.session().stage_update(self.relation(), batch)
    }

    fn refuse_key_column(&self, column: &str) -> Result<()> {
        if self.relation().is_key_column(column) {
            return Err(Error::ValueShape(format!(
                "cannot update primary-key column `{column}` of `{}`; re-key the table instead",
                self.relation().id()
            )));
        }
        Ok(())
    }
}

/// One-cell update record: the row's key plus the new value
fn cell_record(key: &RowKey, column: &str, value: Value) -> Record {
    let mut record = key.to_record();
    record.set(column.to_string(), value);
    record
}

/// Merge a caller record onto a resolved row key, checking carried keys
///
/// Key columns the record carries must agree with the resolved key; other
/// fields ride along untouched.
fn keyed_record(selection: &Selection, key: &RowKey, record: &Record) -> Result<Record> {
    let relation = selection.relation();
    for (column, expected) in key.iter() {
        if let Some(found) = record.get(column) {
            if found != expected {
                let found_key = RowKey::from_pairs(
                    key.iter()
                        .map(|(c, v)| (c.to_string(), record.get(c).unwrap_or(v).clone())),
                );
                return Err(Error::KeyMismatch {
                    expected: key.clone(),
                    found: found_key,
                });
            }
        }
    }
    for column in record.columns() {
        relation.require_column(column)?;
    }
    let mut merged = key.to_record();
    merged.merge(record);
    Ok(merged)
}

fn payload_name(payload: &UpdateValue) -> &'static str {
    match payload {
        UpdateValue::Scalar(_) => "a scalar",
        UpdateValue::Values(_) => "a value sequence",
        UpdateValue::Record(_) => "a single record",
        UpdateValue::Records(_) => "a record sequence",
    }
}
