//! dtscan - walks a directory subtree through a pluggable backend and reports sizes like du

pub mod backend;
pub mod error;
pub mod output;
pub mod tree;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use backend::{Backend, Direction, LocalBackend, LocalConfig, NavError};
pub use error::{Result, WalkError};
pub use output::{FullFormatter, JsonFormatter, RecordFormatter};
pub use tree::{
    Entry, EntryKind, StreamingOutput, StreamingWalker, TreeOutput, TreeWalker, WalkSummary,
    format_size,
};
