//! Report serializers
//!
//! This module provides the encoders that consume walker callbacks:
//! - Full-path text lines (`TreeWalker`)
//! - JSON lines (`TreeWalker`)
//! - Compact parent-indexed records (`StreamingWalker`)
//!
//! # Module Structure
//!
//! - `full` - `<path>[/] <size>` lines
//! - `json` - one JSON object per entry
//! - `records` - `0`/`1` records for reverse mode

mod full;
mod json;
mod records;

pub use full::FullFormatter;
pub use json::JsonFormatter;
pub use records::RecordFormatter;
