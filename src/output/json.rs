//! JSON lines output
//!
//! One object per entry in full-mode order. Machine-readable alternative to the
//! full-path text lines; names that are not valid UTF-8 are rendered lossily.

use std::borrow::Cow;
use std::io::{self, Write};

use serde::Serialize;

use crate::tree::{Entry, TreeOutput, WalkSummary};

/// Serializable form of one emitted entry.
#[derive(Debug, Serialize)]
struct JsonEntry<'a> {
    path: Cow<'a, str>,
    #[serde(rename = "type")]
    kind: &'static str,
    size: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    items: Option<u32>,
}

/// Writes one JSON object per line for use with `TreeWalker`.
pub struct JsonFormatter<W: Write> {
    out: W,
}

impl<W: Write> JsonFormatter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> TreeOutput for JsonFormatter<W> {
    fn output_entry(&mut self, path: &[u8], entry: &Entry) -> io::Result<()> {
        let record = JsonEntry {
            path: String::from_utf8_lossy(path),
            kind: if entry.is_dir() { "dir" } else { "file" },
            size: entry.size,
            items: entry.is_dir().then_some(entry.items),
        };
        serde_json::to_writer(&mut self.out, &record)?;
        self.out.write_all(b"\n")
    }

    fn finish(&mut self, _summary: &WalkSummary) -> io::Result<()> {
        self.out.flush()
    }
}
