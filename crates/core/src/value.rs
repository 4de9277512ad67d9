//! Cell values
//!
//! This module defines `Value`, the closed scalar enum stored in every table
//! cell and primary-key field.
//!
//! ## Type rules
//!
//! - Five types only: Null, Bool, Int, Float, Text
//! - No implicit coercions anywhere in the system
//! - Different types are NEVER equal: `Int(1) != Float(1.0)`
//! - Values are totally ordered so they can key ordered maps; ordering is
//!   type rank first (Null < Bool < Int < Float < Text), then value
//!
//! ## Float caveat
//!
//! Floats compare by `f64::total_cmp` to keep the order total. This deviates
//! from IEEE-754 equality in two spots: `NaN == NaN`, and `-0.0 < 0.0`. Rows
//! keyed by NaN are addressable rather than unequal to themselves.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Canonical cell value for all table surfaces
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Value {
    /// Null value
    Null,
    /// Boolean value
    Bool(bool),
    /// 64-bit signed integer
    Int(i64),
    /// 64-bit floating point
    Float(f64),
    /// UTF-8 string
    Text(String),
}

impl Value {
    /// Get the type name as a string
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "Null",
            Value::Bool(_) => "Bool",
            Value::Int(_) => "Int",
            Value::Float(_) => "Float",
            Value::Text(_) => "Text",
        }
    }

    /// Rank used for cross-type ordering
    fn rank(&self) -> u8 {
        match self {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Int(_) => 2,
            Value::Float(_) => 3,
            Value::Text(_) => 4,
        }
    }

    /// Check if this is a null value
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Get as bool if this is a Bool value
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get as i64 if this is an Int value
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Get as f64 if this is a Float value
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Get as &str if this is a Text value
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Add another value to this one
    ///
    /// Both operands must be `Int` or both `Float`; there is no implicit
    /// numeric coercion.
    ///
    /// # Errors
    ///
    /// `TypeMismatch` for any other pairing, `Arithmetic` on integer
    /// overflow.
    pub fn add(&self, other: &Value) -> Result<Value> {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a
                .checked_add(*b)
                .map(Value::Int)
                .ok_or_else(|| Error::Arithmetic(format!("integer overflow: {a} + {b}"))),
            (Value::Float(a), Value::Float(b)) => Ok(Value::Float(a + b)),
            (l, r) => Err(Error::TypeMismatch {
                left: l.type_name(),
                right: r.type_name(),
            }),
        }
    }

    /// Subtract another value from this one
    ///
    /// Same typing rules as [`Value::add`].
    ///
    /// # Errors
    ///
    /// `TypeMismatch` for non-numeric or mixed pairings, `Arithmetic` on
    /// integer overflow.
    pub fn sub(&self, other: &Value) -> Result<Value> {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a
                .checked_sub(*b)
                .map(Value::Int)
                .ok_or_else(|| Error::Arithmetic(format!("integer overflow: {a} - {b}"))),
            (Value::Float(a), Value::Float(b)) => Ok(Value::Float(a - b)),
            (l, r) => Err(Error::TypeMismatch {
                left: l.type_name(),
                right: r.type_name(),
            }),
        }
    }

    /// Order this value against another of the same type
    ///
    /// Used by the relational comparisons that produce filters. Equality
    /// never needs this; ordering comparisons refuse mixed types instead of
    /// silently ordering by type rank.
    ///
    /// # Errors
    ///
    /// `TypeMismatch` when the operands have different types.
    pub fn compare_same_type(&self, other: &Value) -> Result<Ordering> {
        if self.type_name() != other.type_name() {
            return Err(Error::TypeMismatch {
                left: self.type_name(),
                right: other.type_name(),
            });
        }
        Ok(self.cmp(other))
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a.total_cmp(b) == Ordering::Equal,
            (Value::Text(a), Value::Text(b)) => a == b,
            // Different types are never equal
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Value::Null, Value::Null) => Ordering::Equal,
            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            (Value::Int(a), Value::Int(b)) => a.cmp(b),
            (Value::Float(a), Value::Float(b)) => a.total_cmp(b),
            (Value::Text(a), Value::Text(b)) => a.cmp(b),
            (a, b) => a.rank().cmp(&b.rank()),
        }
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}
