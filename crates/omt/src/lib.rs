//! This crate contains an order-maintenance tree: a mutable, totally
//! ordered sequence container indexed by position, meant to hold the
//! sorted entries of a storage engine node.
//!
//! An [Omt] keeps its values either in a flat ring buffer (cheap bulk
//! ingest and sequential reads) or in a weight-balanced search tree
//! embedded in an arena (O(log n) positional edits), switching between
//! the two transparently. See [Omt] for the operation set.

#![warn(missing_docs)]

mod arena;
mod omt;
mod tree;

/// Errors returned by the fallible container operations.
pub mod error;

pub use crate::error::Error;
pub use crate::omt::{Direction, Omt};

#[cfg(test)]
mod proptests;
