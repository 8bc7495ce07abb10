//! Directory tree walking logic
//!
//! This module drives a [`Backend`](crate::backend::Backend) through a directory
//! subtree without recursion and aggregates sizes like du. It supports two modes:
//!
//! - `TreeWalker`: builds the full tree in memory, then emits every entry with its
//!   full path in parent-before-children order
//! - `StreamingWalker`: emits compact parent-indexed records while walking and
//!   releases each subtree as soon as it is closed

mod arena;
mod entry;
mod ordering;
mod streaming;
mod summary;
mod traversal;
mod utils;
mod walker;

// Re-export public types
pub use entry::{Entry, EntryKind};
pub use streaming::{StreamingOutput, StreamingWalker};
pub use summary::WalkSummary;
pub use utils::format_size;
pub use walker::{TreeOutput, TreeWalker};
