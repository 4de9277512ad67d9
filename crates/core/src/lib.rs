//! Core types and contracts for rowdex
//!
//! This crate defines the foundational types used throughout the system:
//! - Value: scalar cell value with a total order
//! - Record / RowKey: ordered field maps; a RowKey is a row's stable identity
//! - Relation / RelationId: reflected schema and relation identity
//! - Filter: positional boolean row mask
//! - IndexExpr / SlicePlan: the closed union of key shapes and position
//!   resolution against a live row count
//! - Store: the minimal read/write contract the selection algebra consumes
//! - Error: error type hierarchy

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod filter;
pub mod index;
pub mod record;
pub mod relation;
pub mod store;
pub mod value;

pub use error::{Error, Result};
pub use filter::Filter;
pub use index::{IndexExpr, RangeExpr, SlicePlan};
pub use record::{Record, RowKey};
pub use relation::{Relation, RelationId};
pub use store::{RowSelector, Store};
pub use value::Value;
