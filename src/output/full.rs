//! Full-path text output
//!
//! One line per entry: `<path>[/] <size>`. Directories carry a trailing slash, so the
//! root with an empty name prints as `/ <size>`.

use std::io::{self, Write};

use crate::tree::{Entry, TreeOutput, WalkSummary};

/// Writes full-mode text lines for use with `TreeWalker`.
pub struct FullFormatter<W: Write> {
    out: W,
}

impl<W: Write> FullFormatter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> TreeOutput for FullFormatter<W> {
    fn output_entry(&mut self, path: &[u8], entry: &Entry) -> io::Result<()> {
        self.out.write_all(path)?;
        if entry.is_dir() {
            self.out.write_all(b"/")?;
        }
        writeln!(self.out, " {}", entry.size)
    }

    fn finish(&mut self, _summary: &WalkSummary) -> io::Result<()> {
        self.out.flush()
    }
}
