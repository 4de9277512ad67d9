//! End-to-end tests for the selection algebra
//!
//! These exercise the full stack: MemoryStore underneath, a shared session
//! in the middle, selections on top.

mod common;

mod filters;
mod indexing;
mod mutation;
mod unit_of_work;
