//! Positional row filters
//!
//! A `Filter` is an ordered sequence of booleans, one per row of the
//! selection whose values produced it. It is positional: entry `i` refers to
//! the row at position `i` under the ordering in force when the filter was
//! derived. A filter carries no memory of that ordering beyond its length,
//! so every application site checks length against the current row count and
//! raises instead of truncating.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Ordered boolean sequence selecting a row subset by position
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    mask: Vec<bool>,
}

impl Filter {
    /// Build a filter from a boolean sequence
    pub fn new(mask: Vec<bool>) -> Self {
        Self { mask }
    }

    /// Number of positions covered
    pub fn len(&self) -> usize {
        self.mask.len()
    }

    /// True when the filter covers no positions
    pub fn is_empty(&self) -> bool {
        self.mask.is_empty()
    }

    /// Number of selected (true) positions
    pub fn selected_count(&self) -> usize {
        self.mask.iter().filter(|b| **b).count()
    }

    /// The boolean at a position, if covered
    pub fn get(&self, position: usize) -> Option<bool> {
        self.mask.get(position).copied()
    }

    /// Iterate the booleans in position order
    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        self.mask.iter().copied()
    }

    /// Check this filter against a row count before applying it
    ///
    /// # Errors
    ///
    /// `FilterLengthMismatch` when the lengths differ.
    pub fn check_len(&self, row_count: usize) -> Result<()> {
        if self.mask.len() == row_count {
            Ok(())
        } else {
            Err(Error::FilterLengthMismatch {
                filter_len: self.mask.len(),
                row_count,
            })
        }
    }

    /// Positional conjunction with another filter of the same length
    ///
    /// # Errors
    ///
    /// `FilterLengthMismatch` when the lengths differ.
    pub fn and(&self, other: &Filter) -> Result<Filter> {
        self.combine(other, |a, b| a && b)
    }

    /// Positional disjunction with another filter of the same length
    ///
    /// # Errors
    ///
    /// `FilterLengthMismatch` when the lengths differ.
    pub fn or(&self, other: &Filter) -> Result<Filter> {
        self.combine(other, |a, b| a || b)
    }

    /// Positional negation
    pub fn not(&self) -> Filter {
        Filter::new(self.mask.iter().map(|b| !b).collect())
    }

    fn combine(&self, other: &Filter, op: impl Fn(bool, bool) -> bool) -> Result<Filter> {
        if self.mask.len() != other.mask.len() {
            return Err(Error::FilterLengthMismatch {
                filter_len: other.mask.len(),
                row_count: self.mask.len(),
            });
        }
        Ok(Filter::new(
            self.mask
                .iter()
                .zip(other.mask.iter())
                .map(|(a, b)| op(*a, *b))
                .collect(),
        ))
    }
}

impl From<Vec<bool>> for Filter {
    fn from(mask: Vec<bool>) -> Self {
        Filter::new(mask)
    }
}

impl FromIterator<bool> for Filter {
    fn from_iter<I: IntoIterator<Item = bool>>(iter: I) -> Self {
        Filter::new(iter.into_iter().collect())
    }
}
