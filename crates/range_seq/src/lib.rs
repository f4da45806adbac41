//! Rank-indexed sequence container over a bottom-up splay tree.
//!
//! Supports range add, range reverse, cyclic range rotation, and range
//! minimum over a sequence of integers, plus single-element insert and
//! delete, all in amortized `O(log n)`. The tag algebra is pluggable
//! through [`LazyMapMonoid`] policies.

pub mod policy;

mod command;
mod tree;

pub use command::{Command, CommandError};
pub use policy::{LazyMapMonoid, RangeMinRangeAdd, RangeSumRangeAdd};
pub use tree::{SeqError, SplaySeq};
