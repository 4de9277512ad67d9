//! Selections
//!
//! A `Selection` is an immutable (row set × column set) view bound to one
//! relation and one shared [`Session`]. It is created only by resolving an
//! index expression against a parent selection (or the root table handle),
//! and it is discarded after use; there is no registry of live selections.
//!
//! The two restriction axes are explicit tagged variants. Their nine
//! combinations reproduce the classic selection taxonomy (whole table,
//! single column, keyed sub-table, single record, single value, and so on)
//! without a type per combination; [`SelectionKind`] names the combination
//! when something needs to talk about it.
//!
//! Narrowing rules are uniform: the meaning of an index expression depends
//! only on its shape, never on which kind of selection it is applied to.
//! Positions and masks resolve against the selection's current row keys at
//! the moment of resolution, so a selection re-reads the session rather
//! than caching counts.

use crate::session::Session;
use rowdex_core::{Error, IndexExpr, Record, Relation, Result, RowKey, SlicePlan, Value};
use std::fmt;
use std::sync::Arc;

/// Row-axis restriction of a selection
#[derive(Debug, Clone, PartialEq)]
pub enum RowSet {
    /// Every row of the relation
    All,
    /// An explicit list of rows, by key, in order
    Keyed(Vec<RowKey>),
    /// Exactly one row
    One(RowKey),
}

/// Column-axis restriction of a selection
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnSet {
    /// Every column of the relation
    All,
    /// An explicit list of columns, in order
    Named(Vec<String>),
    /// Exactly one column
    One(String),
}

/// Name of a (row set × column set) combination
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionKind {
    /// All rows, all columns
    Table,
    /// All rows, a named column subset
    TableSubColumn,
    /// All rows, one column
    Column,
    /// Keyed rows, all columns
    SubTable,
    /// Keyed rows, a named column subset
    SubTableSubColumn,
    /// Keyed rows, one column
    SubColumn,
    /// One row, all columns
    Record,
    /// One row, a named column subset
    SubRecord,
    /// One row, one column
    Value,
}

impl fmt::Display for SelectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SelectionKind::Table => "table",
            SelectionKind::TableSubColumn => "table sub-column",
            SelectionKind::Column => "column",
            SelectionKind::SubTable => "sub-table",
            SelectionKind::SubTableSubColumn => "sub-table sub-column",
            SelectionKind::SubColumn => "sub-column",
            SelectionKind::Record => "record",
            SelectionKind::SubRecord => "sub-record",
            SelectionKind::Value => "value",
        };
        write!(f, "{name}")
    }
}

/// Immutable (row set × column set) view over one relation
#[derive(Clone)]
pub struct Selection {
    session: Arc<Session>,
    relation: Relation,
    rows: RowSet,
    columns: ColumnSet,
}

impl Selection {
    /// The whole-table selection (all rows, all columns)
    pub fn table(session: Arc<Session>, relation: Relation) -> Self {
        Self {
            session,
            relation,
            rows: RowSet::All,
            columns: ColumnSet::All,
        }
    }

    /// The session this selection reads and stages through
    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// The relation this selection is bound to
    pub fn relation(&self) -> &Relation {
        &self.relation
    }

    /// Row-axis restriction
    pub fn rows(&self) -> &RowSet {
        &self.rows
    }

    /// Column-axis restriction
    pub fn columns(&self) -> &ColumnSet {
        &self.columns
    }

    /// Which of the nine classic combinations this selection is
    pub fn kind(&self) -> SelectionKind {
        match (&self.rows, &self.columns) {
            (RowSet::All, ColumnSet::All) => SelectionKind::Table,
            (RowSet::All, ColumnSet::Named(_)) => SelectionKind::TableSubColumn,
            (RowSet::All, ColumnSet::One(_)) => SelectionKind::Column,
            (RowSet::Keyed(_), ColumnSet::All) => SelectionKind::SubTable,
            (RowSet::Keyed(_), ColumnSet::Named(_)) => SelectionKind::SubTableSubColumn,
            (RowSet::Keyed(_), ColumnSet::One(_)) => SelectionKind::SubColumn,
            (RowSet::One(_), ColumnSet::All) => SelectionKind::Record,
            (RowSet::One(_), ColumnSet::Named(_)) => SelectionKind::SubRecord,
            (RowSet::One(_), ColumnSet::One(_)) => SelectionKind::Value,
        }
    }

    // ========== Narrowing ==========

    /// Resolve an index expression into a narrower selection
    ///
    /// Narrowing never mutates; it returns a new selection bound to the
    /// same session. A chain folds left to right, so
    /// `select(("age", 0..2))` equals `select("age")` then `select(0..2)`.
    ///
    /// # Errors
    ///
    /// `IndexOutOfRange`, `SliceError`, `FilterLengthMismatch`,
    /// `UnknownColumn`, or `UnsupportedKeyType` for an empty chain.
    pub fn select(&self, key: impl Into<IndexExpr>) -> Result<Selection> {
        self.resolve(&key.into())
    }

    fn resolve(&self, key: &IndexExpr) -> Result<Selection> {
        match key {
            IndexExpr::Position(position) => {
                let keys = self.current_keys()?;
                let resolved = SlicePlan::resolve_position(*position, keys.len())?;
                Ok(self.with_rows(RowSet::One(keys[resolved].clone())))
            }
            IndexExpr::Range(range) => {
                // The full range over an unrestricted row set narrows nothing
                if range.is_full() && self.rows == RowSet::All {
                    return Ok(self.clone());
                }
                let keys = self.current_keys()?;
                let plan = SlicePlan::resolve(*range, keys.len())?;
                Ok(self.with_rows(RowSet::Keyed(keys[plan.positions()].to_vec())))
            }
            IndexExpr::Column(column) => {
                self.relation.require_column(column)?;
                Ok(self.with_columns(ColumnSet::One(column.clone())))
            }
            IndexExpr::Columns(columns) => {
                for column in columns {
                    self.relation.require_column(column)?;
                }
                Ok(self.with_columns(ColumnSet::Named(columns.clone())))
            }
            IndexExpr::Mask(filter) => {
                let keys = self.current_keys()?;
                filter.check_len(keys.len())?;
                let picked = keys
                    .into_iter()
                    .zip(filter.iter())
                    .filter(|(_, selected)| *selected)
                    .map(|(key, _)| key)
                    .collect();
                Ok(self.with_rows(RowSet::Keyed(picked)))
            }
            IndexExpr::Chain(parts) => {
                if parts.is_empty() {
                    return Err(Error::UnsupportedKeyType(
                        "empty chain narrows nothing".to_string(),
                    ));
                }
                let mut current = self.clone();
                for part in parts {
                    current = current.resolve(part)?;
                }
                Ok(current)
            }
        }
    }

    fn with_rows(&self, rows: RowSet) -> Selection {
        Selection {
            session: Arc::clone(&self.session),
            relation: self.relation.clone(),
            rows,
            columns: self.columns.clone(),
        }
    }

    fn with_columns(&self, columns: ColumnSet) -> Selection {
        Selection {
            session: Arc::clone(&self.session),
            relation: self.relation.clone(),
            rows: self.rows.clone(),
            columns,
        }
    }

    // ========== Materialization ==========

    /// The selection's row keys, resolved now, in row order
    pub fn row_keys(&self) -> Result<Vec<RowKey>> {
        self.current_keys()
    }

    /// Current row count of this selection
    pub fn row_count(&self) -> Result<usize> {
        match &self.rows {
            RowSet::All => self.session.row_count(&self.relation),
            RowSet::Keyed(keys) => Ok(keys.len()),
            RowSet::One(_) => Ok(1),
        }
    }

    fn current_keys(&self) -> Result<Vec<RowKey>> {
        match &self.rows {
            RowSet::All => self.session.row_keys(&self.relation),
            RowSet::Keyed(keys) => Ok(keys.clone()),
            RowSet::One(key) => Ok(vec![key.clone()]),
        }
    }

    pub(crate) fn projection(&self) -> Option<Vec<String>> {
        match &self.columns {
            ColumnSet::All => None,
            ColumnSet::Named(columns) => Some(columns.clone()),
            ColumnSet::One(column) => Some(vec![column.clone()]),
        }
    }

    /// The single column this selection is restricted to
    ///
    /// # Errors
    ///
    /// `ValueShape` when the selection is not column-restricted.
    pub(crate) fn single_column(&self) -> Result<&str> {
        match &self.columns {
            ColumnSet::One(column) => Ok(column.as_str()),
            _ => Err(Error::ValueShape(format!(
                "a {} selection is not restricted to one column",
                self.kind()
            ))),
        }
    }

    /// Materialize the selected records, projected to the selected columns
    pub fn records(&self) -> Result<Vec<Record>> {
        let projection = self.projection();
        match &self.rows {
            RowSet::All => self.session.records(&self.relation, projection.as_deref()),
            RowSet::Keyed(keys) => {
                self.session
                    .records_by_keys(&self.relation, keys, projection.as_deref())
            }
            RowSet::One(key) => self.session.records_by_keys(
                &self.relation,
                std::slice::from_ref(key),
                projection.as_deref(),
            ),
        }
    }

    /// Materialize the single selected record
    ///
    /// # Errors
    ///
    /// `ValueShape` unless the selection is restricted to one row,
    /// `RowNotFound` when that row no longer exists.
    pub fn record(&self) -> Result<Record> {
        match &self.rows {
            RowSet::One(key) => {
                let mut records = self.session.records_by_keys(
                    &self.relation,
                    std::slice::from_ref(key),
                    self.projection().as_deref(),
                )?;
                Ok(records.remove(0))
            }
            _ => Err(Error::ValueShape(format!(
                "a {} selection is not restricted to one row",
                self.kind()
            ))),
        }
    }

    /// Materialize the selected column's values, in row order
    ///
    /// # Errors
    ///
    /// `ValueShape` unless the selection is restricted to one column.
    pub fn values(&self) -> Result<Vec<Value>> {
        let column = self.single_column()?.to_string();
        match &self.rows {
            RowSet::All => self.session.column_values(&self.relation, &column),
            RowSet::Keyed(keys) => {
                self.session
                    .column_values_by_keys(&self.relation, &column, keys)
            }
            RowSet::One(key) => self.session.column_values_by_keys(
                &self.relation,
                &column,
                std::slice::from_ref(key),
            ),
        }
    }

    /// Materialize the single selected value
    ///
    /// # Errors
    ///
    /// `ValueShape` unless the selection is one row and one column.
    pub fn value(&self) -> Result<Value> {
        let column = self.single_column()?.to_string();
        match &self.rows {
            RowSet::One(key) => {
                let mut values = self.session.column_values_by_keys(
                    &self.relation,
                    &column,
                    std::slice::from_ref(key),
                )?;
                Ok(values.remove(0))
            }
            _ => Err(Error::ValueShape(format!(
                "a {} selection is not restricted to one row",
                self.kind()
            ))),
        }
    }
}

impl fmt::Debug for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Selection")
            .field("relation", &self.relation.id().to_string())
            .field("kind", &self.kind())
            .field("rows", &self.rows)
            .field("columns", &self.columns)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rowdex_core::{Filter, RangeExpr, RelationId, Store};
    use rowdex_storage::MemoryStore;

    fn seeded() -> Selection {
        let store = MemoryStore::new();
        let id = RelationId::new("people");
        let relation = Relation::new(
            id.clone(),
            vec!["id".into(), "name".into(), "age".into()],
            vec!["id".into()],
        )
        .unwrap();
        store.create_table(relation.clone()).unwrap();
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
        Selection::table(Arc::new(Session::new(Arc::new(store))), relation)
    }

    fn key(id: i64) -> RowKey {
        RowKey::from_pairs([("id", Value::Int(id))])
    }

    // ====================================================================
    // Kind classification
    // ====================================================================

    #[test]
    fn kinds_cover_the_nine_combinations() {
        let table = seeded();
        assert_eq!(table.kind(), SelectionKind::Table);
        assert_eq!(table.select("age").unwrap().kind(), SelectionKind::Column);
        assert_eq!(
            table.select(vec!["id", "age"]).unwrap().kind(),
            SelectionKind::TableSubColumn
        );
        assert_eq!(
            table.select(0i64..2).unwrap().kind(),
            SelectionKind::SubTable
        );
        assert_eq!(table.select(0i64).unwrap().kind(), SelectionKind::Record);
        assert_eq!(
            table.select(("age", 0i64)).unwrap().kind(),
            SelectionKind::Value
        );
        assert_eq!(
            table.select(("age", 0i64..2)).unwrap().kind(),
            SelectionKind::SubColumn
        );
        assert_eq!(
            table.select((vec!["id", "age"], 0i64..2)).unwrap().kind(),
            SelectionKind::SubTableSubColumn
        );
        assert_eq!(
            table.select((vec!["id", "age"], 0i64)).unwrap().kind(),
            SelectionKind::SubRecord
        );
    }

    // ====================================================================
    // Position narrowing
    // ====================================================================

    #[test]
    fn position_selects_the_row_at_that_ordinal() {
        let table = seeded();
        let record = table.select(1i64).unwrap().record().unwrap();
        assert_eq!(record.get("name"), Some(&Value::Text("Grace".into())));
    }

    #[test]
    fn negative_position_counts_from_the_end() {
        let table = seeded();
        let last = table.select(-1i64).unwrap().record().unwrap();
        let explicit = table.select(3i64).unwrap().record().unwrap();
        assert_eq!(last, explicit);
    }

    #[test]
    fn position_out_of_range_raises() {
        let table = seeded();
        let err = table.select(5i64).unwrap_err();
        assert!(matches!(err, Error::IndexOutOfRange { .. }));
    }

    #[test]
    fn position_inside_a_sub_table_is_relative() {
        let table = seeded();
        let sub = table.select(1i64..4).unwrap();
        let record = sub.select(0i64).unwrap().record().unwrap();
        assert_eq!(record.get("id"), Some(&Value::Int(2)));
    }

    // ====================================================================
    // Range narrowing
    // ====================================================================

    #[test]
    fn range_binds_the_resolved_keys() {
        let table = seeded();
        let sub = table.select(1i64..3).unwrap();
        assert_eq!(sub.row_keys().unwrap(), vec![key(2), key(3)]);
    }

    #[test]
    fn full_range_on_table_stays_unrestricted() {
        let table = seeded();
        let same = table.select(..).unwrap();
        assert_eq!(same.kind(), SelectionKind::Table);
    }

    #[test]
    fn full_range_on_sub_table_keeps_the_keys() {
        let table = seeded();
        let sub = table.select(1i64..3).unwrap().select(..).unwrap();
        assert_eq!(sub.row_keys().unwrap(), vec![key(2), key(3)]);
    }

    #[test]
    fn slices_compose_relatively() {
        let table = seeded();
        let nested = table.select(1i64..4).unwrap().select(1i64..2).unwrap();
        assert_eq!(nested.row_keys().unwrap(), vec![key(3)]);
    }

    #[test]
    fn inverted_range_raises_slice_error() {
        let table = seeded();
        let err = table.select(3i64..1).unwrap_err();
        assert!(matches!(err, Error::SliceError { .. }));
    }

    #[test]
    fn range_on_empty_table_is_empty() {
        let store = MemoryStore::new();
        let id = RelationId::new("empty");
        let relation =
            Relation::new(id.clone(), vec!["id".into()], vec!["id".into()]).unwrap();
        store.create_table(relation.clone()).unwrap();
        let table = Selection::table(Arc::new(Session::new(Arc::new(store))), relation);
        let sub = table.select(..).unwrap();
        assert_eq!(sub.records().unwrap(), vec![]);
        let sub = table.select(RangeExpr::new(2, 7)).unwrap();
        assert_eq!(sub.row_count().unwrap(), 0);
    }

    // ====================================================================
    // Column narrowing
    // ====================================================================

    #[test]
    fn column_narrowing_keeps_the_row_set() {
        let table = seeded();
        let sub_column = table.select(1i64..3).unwrap().select("age").unwrap();
        assert_eq!(
            sub_column.values().unwrap(),
            vec![Value::Int(18), Value::Int(19)]
        );
    }

    #[test]
    fn unknown_column_raises() {
        let table = seeded();
        let err = table.select("salary").unwrap_err();
        assert!(matches!(err, Error::UnknownColumn { .. }));
    }

    #[test]
    fn named_columns_project_records() {
        let table = seeded();
        let records = table.select(vec!["name", "age"]).unwrap().records().unwrap();
        assert_eq!(records.len(), 4);
        let columns: Vec<_> = records[0].columns().collect();
        assert_eq!(columns, vec!["name", "age"]);
    }

    // ====================================================================
    // Mask narrowing
    // ====================================================================

    #[test]
    fn mask_selects_true_positions() {
        let table = seeded();
        let filter = Filter::new(vec![false, true, true, true]);
        let sub = table.select(filter).unwrap();
        assert_eq!(sub.row_keys().unwrap(), vec![key(2), key(3), key(4)]);
    }

    #[test]
    fn stale_mask_raises_instead_of_truncating() {
        let table = seeded();
        let filter = Filter::new(vec![true, false]);
        let err = table.select(filter).unwrap_err();
        assert!(matches!(err, Error::FilterLengthMismatch { .. }));
    }

    // ====================================================================
    // Chains
    // ====================================================================

    #[test]
    fn chain_order_does_not_change_the_result() {
        let table = seeded();
        let by_column_first = table.select(("age", 0i64..2)).unwrap();
        let by_rows_first = table.select(0i64..2).unwrap().select("age").unwrap();
        assert_eq!(
            by_column_first.row_keys().unwrap(),
            by_rows_first.row_keys().unwrap()
        );
        assert_eq!(
            by_column_first.values().unwrap(),
            by_rows_first.values().unwrap()
        );
    }

    #[test]
    fn empty_chain_is_unsupported() {
        let table = seeded();
        let err = table.select(IndexExpr::Chain(vec![])).unwrap_err();
        assert!(matches!(err, Error::UnsupportedKeyType(_)));
    }

    #[test]
    fn three_part_chain_folds_left_to_right() {
        let table = seeded();
        let value = table
            .select((1i64..4, "age", 0i64))
            .unwrap()
            .value()
            .unwrap();
        assert_eq!(value, Value::Int(18));
    }

    // ====================================================================
    // Materialization shape checks
    // ====================================================================

    #[test]
    fn record_requires_single_row() {
        let table = seeded();
        let err = table.record().unwrap_err();
        assert!(matches!(err, Error::ValueShape(_)));
    }

    #[test]
    fn values_requires_single_column() {
        let table = seeded();
        let err = table.values().unwrap_err();
        assert!(matches!(err, Error::ValueShape(_)));
    }

    #[test]
    fn value_requires_both_axes_single() {
        let table = seeded();
        let err = table.select("age").unwrap().value().unwrap_err();
        assert!(matches!(err, Error::ValueShape(_)));
        let value = table.select(("age", 2i64)).unwrap().value().unwrap();
        assert_eq!(value, Value::Int(19));
    }

    #[test]
    fn deleted_row_raises_row_not_found_on_read() {
        let table = seeded();
        let record_selection = table.select(0i64).unwrap();
        table
            .session()
            .stage_delete(table.relation(), vec![key(1)])
            .unwrap();
        let err = record_selection.record().unwrap_err();
        assert!(matches!(err, Error::RowNotFound(_)));
    }

    #[test]
    fn selection_reflects_sibling_staged_writes() {
        let table = seeded();
        let ages = table.select("age").unwrap();
        table
            .session()
            .stage_update(
                table.relation(),
                vec![Record::from_pairs([("id", 1i64), ("age", 99i64)])],
            )
            .unwrap();
        assert_eq!(ages.values().unwrap()[0], Value::Int(99));
    }
}
