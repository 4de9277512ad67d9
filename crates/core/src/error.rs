//! Error types for the selection algebra
//!
//! This module defines all error types used throughout the system.
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.
//!
//! Every error is raised synchronously at the point of resolution or
//! materialization. Nothing in this layer retries or suppresses; an error
//! escaping a unit of work rolls its staged writes back.

use crate::record::RowKey;
use thiserror::Error;

/// Result type alias for rowdex operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the selection algebra and its store collaborators
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Relation has no primary key; fatal at handle construction
    #[error("relation `{relation}` has no primary key; a primary key is required to address rows")]
    MissingPrimaryKey {
        /// Relation the caller tried to open
        relation: String,
    },

    /// Integer position outside `[-row_count, row_count)`
    #[error("position {position} out of range for row count {row_count}")]
    IndexOutOfRange {
        /// Requested position, as given by the caller
        position: i64,
        /// Row count at the moment of resolution
        row_count: usize,
    },

    /// Resolved stop precedes resolved start
    #[error("invalid slice: resolved stop {stop} precedes resolved start {start}")]
    SliceError {
        /// Resolved start position
        start: usize,
        /// Resolved stop position
        stop: usize,
    },

    /// Index expression shape not accepted where it was used
    #[error("unsupported key type: {0}")]
    UnsupportedKeyType(String),

    /// Caller-supplied record carries primary-key values that do not match
    /// the row it was positionally aligned to
    #[error("primary-key mismatch: record carries {found:?}, resolved row is {expected:?}")]
    KeyMismatch {
        /// Key of the row the record was aligned to
        expected: RowKey,
        /// Key values the record carried
        found: RowKey,
    },

    /// A row key used for a single-row read, update, or delete no longer
    /// exists in the relation
    #[error("row not found: {0:?}")]
    RowNotFound(RowKey),

    /// Column name absent from the relation
    #[error("relation `{relation}` has no column `{column}`")]
    UnknownColumn {
        /// Relation that was addressed
        relation: String,
        /// Missing column name
        column: String,
    },

    /// Relation name absent from the store
    #[error("unknown relation: `{0}`")]
    UnknownRelation(String),

    /// Insert would duplicate an existing primary key
    #[error("duplicate primary key: {0:?}")]
    DuplicateKey(RowKey),

    /// Filter length does not match the row count it is applied against
    #[error("filter length {filter_len} does not match row count {row_count}")]
    FilterLengthMismatch {
        /// Length of the filter
        filter_len: usize,
        /// Row count of the selection it was applied to
        row_count: usize,
    },

    /// Values of incompatible types were compared or combined
    #[error("type mismatch: {left} vs {right}")]
    TypeMismatch {
        /// Type name of the left operand
        left: &'static str,
        /// Type name of the right operand
        right: &'static str,
    },

    /// Arithmetic failed on values of the right type (overflow)
    #[error("arithmetic error: {0}")]
    Arithmetic(String),

    /// Update or insert payload shape does not fit the selection it targets
    #[error("value shape error: {0}")]
    ValueShape(String),

    /// Storage layer error
    #[error("storage error: {0}")]
    Storage(String),
}
