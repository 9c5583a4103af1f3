#![deny(missing_docs)]

//! The **set-partition-unrank** crate computes, for a set of `n` labelled elements and a
//! block count `k`, the partition of rank `r` among all partitions of the set into exactly
//! `k` nonempty blocks, without enumerating the partitions that come before it.
//!
//! There are `S(n, k)` such partitions, where `S` is the Stirling number of the second kind,
//! so valid ranks are `0..S(n, k)`. Use `stirling_count` to get that bound and `unrank` to
//! get the partition.
//!
//! Partitions are represented as sequences of blocks, each block being the ascending list of
//! its 1-based labels, and blocks are ordered by their smallest label. Ranks follow the
//! lexicographic order of that representation, a block being smaller than its extensions:
//!
//! ```text
//! rank  0: [[1] [2] [3 4 5]]
//! ...
//! rank 10: [[1 2 3] [4] [5]]
//! ...
//! rank 24: [[1 5] [2 4] [3]]
//! ```
//!
//! # How it works
//!
//! The first block always contains the smallest remaining element. It is extended one element
//! at a time: a closed-form count of the partitions compatible with a block prefix
//! (see `formula`) is monotone in the position of the next element, so each element is found
//! by binary search (see `finder`). Once the block is complete its rank offset is subtracted,
//! `n` shrinks by the block size, `k` by one, and the search repeats until one block is left.
//!
//! The counts need Stirling numbers from columns `k - 1` and `k` only. The default streaming
//! provider keeps exactly those two columns and computes the next lower one on a background
//! thread while the current block is searched; the triangle provider precomputes the whole
//! table once and shares it between calls (see `stirling`).
//!
//! # How to use
//!
//! For one-off calls, use the free functions `unrank` and `stirling_count`.
//! To pick the provider or the formula form, build an `Unranker` from an `UnrankConfig`.
//! To walk every partition of a given shape in rank order, use `Unranker::partitions`.
//!
//! ```
//! use num_bigint::BigUint;
//! use set_partition_unrank::{stirling_count, unrank};
//!
//! assert_eq!(stirling_count(5, 3), BigUint::from(25u32));
//! let p = unrank(5, 3, &BigUint::from(10u32)).unwrap();
//! assert_eq!(p.to_string(), "[[1 2 3] [4] [5]]");
//! ```
//!
//! Every partition also has a restricted growth sequence form (`Partition::to_restricted_growth`),
//! and `RestrictedGrowth` enumerates all partitions in that form.

pub mod enumerate;
pub mod error;
pub mod finder;
pub mod formula;
pub mod labels;
pub mod rgs;
pub mod stirling;
pub mod unrank;

pub use crate::enumerate::Partitions;
pub use crate::error::{Error, Result};
pub use crate::formula::{block_count, BlockCounter, FormulaStrategy};
pub use crate::labels::{is_restricted_growth, map_to_labels, Block, Partition};
pub use crate::rgs::RestrictedGrowth;
pub use crate::stirling::triangle::{session_cache, Triangle, TriangleCache, MAX_TRIANGLE_DIM};
pub use crate::stirling::{initial_columns, previous_column, Column, ColumnPair, StirlingColumns};
pub use crate::unrank::{bell_count, stirling_count, unrank, ProviderStrategy, UnrankConfig, Unranker};
