//! Index expressions and position resolution
//!
//! An `IndexExpr` is the closed union of every key shape the selection
//! algebra accepts: a row position, a half-open position range, a column
//! name, a list of column names, a boolean mask, or a chain of those. The
//! resolver matches exhaustively over this union, so an unhandled shape is
//! a compile error here rather than a silent no-op at run time.
//!
//! `SlicePlan` converts caller-side positions (which may be negative or
//! open-ended) into concrete `[start, stop)` bounds against the row count
//! current at the moment of resolution.
//!
//! ## Range semantics
//!
//! - missing start is 0, missing stop is the row count
//! - negative positions count from the end
//! - bounds clamp into `[0, row_count]`
//! - a row count of 0 always resolves to the empty `(0, 0)` range
//! - a resolved stop strictly below the resolved start is a `SliceError`;
//!   an inverted range almost always means caller error, so it raises
//!   instead of quietly selecting nothing. `stop == start` is an empty
//!   selection, not an error.

use crate::error::{Error, Result};
use crate::filter::Filter;
use serde::{Deserialize, Serialize};
use std::ops::{Range, RangeFrom, RangeFull, RangeTo};

/// Half-open position range with optional, possibly negative bounds
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeExpr {
    /// Starting position; `None` means 0
    pub start: Option<i64>,
    /// Stopping position (exclusive); `None` means the row count
    pub stop: Option<i64>,
}

impl RangeExpr {
    /// Range with both bounds given
    pub fn new(start: i64, stop: i64) -> Self {
        Self {
            start: Some(start),
            stop: Some(stop),
        }
    }

    /// The full range (everything)
    pub fn full() -> Self {
        Self {
            start: None,
            stop: None,
        }
    }

    /// Range from a position to the end
    pub fn from_start(start: i64) -> Self {
        Self {
            start: Some(start),
            stop: None,
        }
    }

    /// Range from the beginning up to a position
    pub fn to_stop(stop: i64) -> Self {
        Self {
            start: None,
            stop: Some(stop),
        }
    }

    /// True when neither bound is given
    pub fn is_full(&self) -> bool {
        self.start.is_none() && self.stop.is_none()
    }
}

/// Concrete `[start, stop)` bounds resolved against one row count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlicePlan {
    start: usize,
    stop: usize,
}

impl SlicePlan {
    /// Resolve a range against the current row count
    ///
    /// # Errors
    ///
    /// `SliceError` when the resolved stop precedes the resolved start.
    pub fn resolve(range: RangeExpr, row_count: usize) -> Result<Self> {
        if row_count == 0 {
            return Ok(Self { start: 0, stop: 0 });
        }
        let start = clamp_bound(range.start.unwrap_or(0), row_count);
        let stop = match range.stop {
            Some(stop) => clamp_bound(stop, row_count),
            None => row_count,
        };
        if stop < start {
            return Err(Error::SliceError { start, stop });
        }
        Ok(Self { start, stop })
    }

    /// Resolve a single position against the current row count
    ///
    /// Negative positions count from the end.
    ///
    /// # Errors
    ///
    /// `IndexOutOfRange` outside `[-row_count, row_count)`.
    pub fn resolve_position(position: i64, row_count: usize) -> Result<usize> {
        let count = row_count as i64;
        if position >= count || position < -count {
            return Err(Error::IndexOutOfRange {
                position,
                row_count,
            });
        }
        let resolved = if position < 0 {
            position + count
        } else {
            position
        };
        Ok(resolved as usize)
    }

    /// Resolved start position
    pub fn start(&self) -> usize {
        self.start
    }

    /// Resolved stop position (exclusive)
    pub fn stop(&self) -> usize {
        self.stop
    }

    /// Number of positions covered
    pub fn len(&self) -> usize {
        self.stop - self.start
    }

    /// True when the plan covers no positions
    pub fn is_empty(&self) -> bool {
        self.stop == self.start
    }

    /// The covered positions as a standard range
    pub fn positions(&self) -> Range<usize> {
        self.start..self.stop
    }
}

/// Clamp a possibly negative bound into `[0, row_count]`
fn clamp_bound(bound: i64, row_count: usize) -> usize {
    let count = row_count as i64;
    let shifted = if bound < 0 { bound + count } else { bound };
    shifted.clamp(0, count) as usize
}

/// Closed union of the key shapes the resolver accepts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum IndexExpr {
    /// Row position, negative counting from the end
    Position(i64),
    /// Half-open row position range
    Range(RangeExpr),
    /// Single column name
    Column(String),
    /// List of column names
    Columns(Vec<String>),
    /// Positional boolean mask over the current rows
    Mask(Filter),
    /// Left-to-right fold of sub-expressions
    Chain(Vec<IndexExpr>),
}

impl IndexExpr {
    /// Short name of the shape, for diagnostics
    pub fn shape_name(&self) -> &'static str {
        match self {
            IndexExpr::Position(_) => "position",
            IndexExpr::Range(_) => "range",
            IndexExpr::Column(_) => "column",
            IndexExpr::Columns(_) => "column list",
            IndexExpr::Mask(_) => "mask",
            IndexExpr::Chain(_) => "chain",
        }
    }
}

impl From<i64> for IndexExpr {
    fn from(position: i64) -> Self {
        IndexExpr::Position(position)
    }
}

impl From<i32> for IndexExpr {
    fn from(position: i32) -> Self {
        IndexExpr::Position(i64::from(position))
    }
}

impl From<&str> for IndexExpr {
    fn from(column: &str) -> Self {
        IndexExpr::Column(column.to_string())
    }
}

impl From<String> for IndexExpr {
    fn from(column: String) -> Self {
        IndexExpr::Column(column)
    }
}

impl From<Vec<String>> for IndexExpr {
    fn from(columns: Vec<String>) -> Self {
        IndexExpr::Columns(columns)
    }
}

impl From<Vec<&str>> for IndexExpr {
    fn from(columns: Vec<&str>) -> Self {
        IndexExpr::Columns(columns.into_iter().map(str::to_string).collect())
    }
}

impl From<&[&str]> for IndexExpr {
    fn from(columns: &[&str]) -> Self {
        IndexExpr::Columns(columns.iter().map(|c| c.to_string()).collect())
    }
}

impl From<Filter> for IndexExpr {
    fn from(filter: Filter) -> Self {
        IndexExpr::Mask(filter)
    }
}

impl From<RangeExpr> for IndexExpr {
    fn from(range: RangeExpr) -> Self {
        IndexExpr::Range(range)
    }
}

impl From<Range<i64>> for IndexExpr {
    fn from(range: Range<i64>) -> Self {
        IndexExpr::Range(RangeExpr::new(range.start, range.end))
    }
}

impl From<RangeFrom<i64>> for IndexExpr {
    fn from(range: RangeFrom<i64>) -> Self {
        IndexExpr::Range(RangeExpr::from_start(range.start))
    }
}

impl From<RangeTo<i64>> for IndexExpr {
    fn from(range: RangeTo<i64>) -> Self {
        IndexExpr::Range(RangeExpr::to_stop(range.end))
    }
}

impl From<RangeFull> for IndexExpr {
    fn from(_: RangeFull) -> Self {
        IndexExpr::Range(RangeExpr::full())
    }
}

impl<A, B> From<(A, B)> for IndexExpr
where
    A: Into<IndexExpr>,
    B: Into<IndexExpr>,
{
    fn from((a, b): (A, B)) -> Self {
        IndexExpr::Chain(vec![a.into(), b.into()])
    }
}

impl<A, B, C> From<(A, B, C)> for IndexExpr
where
    A: Into<IndexExpr>,
    B: Into<IndexExpr>,
    C: Into<IndexExpr>,
{
    fn from((a, b, c): (A, B, C)) -> Self {
        IndexExpr::Chain(vec![a.into(), b.into(), c.into()])
    }
}
