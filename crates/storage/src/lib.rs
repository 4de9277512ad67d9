//! In-memory storage for rowdex
//!
//! This crate provides [`MemoryStore`], the reference implementation of the
//! [`Store`](rowdex_core::Store) contract, plus the schema-administration
//! surface (create, drop, rename, copy, re-key) that operates outside any
//! selection's lifetime.
//!
//! Rows live in a `BTreeMap` keyed by [`RowKey`](rowdex_core::RowKey), so
//! the deterministic ascending-primary-key ordering the contract requires
//! is structural rather than enforced per query.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod ddl;
mod memory;

pub use memory::MemoryStore;
