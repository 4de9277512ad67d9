//! Selection algebra for rowdex
//!
//! This crate turns a primary-keyed relation into an addressable,
//! sliceable, filterable collection:
//! - Session: the scoped unit of work every selection shares
//! - Selection: an immutable (row set × column set) view, narrowed by
//!   index expressions and chained tuples
//! - comparison methods producing positional filters
//! - mutation propagation: batched keyed updates, deletes, inserts, and
//!   read-modify-write arithmetic
//! - SessionTable: the root handle that opens the unit of work and
//!   validates the relation's primary key

#![warn(missing_docs)]
#![warn(clippy::all)]

mod compare;
mod mutate;
mod selection;
mod session;
mod table;

pub use compare::Operand;
pub use mutate::UpdateValue;
pub use selection::{ColumnSet, RowSet, Selection, SelectionKind};
pub use session::Session;
pub use table::{SessionTable, TableInfo};
