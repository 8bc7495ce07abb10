//! Compact record output for reverse (streaming) mode
//!
//! Two record kinds, one per line, space separated:
//!
//! - `0 <id> <path>` announces a directory before anything inside it
//! - `1 <parent-id> <seq> <size> <dir-id-or-0> <items-or-0> <name>` reports an entry
//!
//! Only announces carry a full path; a consumer rebuilds the tree from parent ids.

use std::io::{self, Write};

use crate::tree::{Entry, StreamingOutput, WalkSummary};

/// Writes reverse-mode records for use with `StreamingWalker`.
pub struct RecordFormatter<W: Write> {
    out: W,
}

impl<W: Write> RecordFormatter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> StreamingOutput for RecordFormatter<W> {
    fn announce_dir(&mut self, id: u32, path: &[u8]) -> io::Result<()> {
        write!(self.out, "0 {} ", id)?;
        self.out.write_all(path)?;
        self.out.write_all(b"\n")
    }

    fn output_entry(&mut self, parent_id: u32, entry: &Entry) -> io::Result<()> {
        let (dir_id, items) = if entry.is_dir() {
            (entry.id, entry.items)
        } else {
            (0, 0)
        };
        write!(
            self.out,
            "1 {} {} {} {} {} ",
            parent_id, entry.seq, entry.size, dir_id, items
        )?;
        self.out.write_all(&entry.name)?;
        self.out.write_all(b"\n")
    }

    fn finish(&mut self, _summary: &WalkSummary) -> io::Result<()> {
        self.out.flush()
    }
}
