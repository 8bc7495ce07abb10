//! Entry type for discovered filesystem objects

use std::borrow::Cow;

/// Whether an entry is a directory or a leaf file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum EntryKind {
    #[default]
    Directory,
    File,
}

/// One discovered object in the scanned tree.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Entry {
    /// Leaf name as raw bytes, never a path.
    pub name: Vec<u8>,
    pub kind: EntryKind,
    /// Byte count. For directories this is the recursive total once the walk closes them.
    pub size: u64,
    /// Directory id, unique per walk and assigned in discovery order. Zero for files.
    pub id: u32,
    /// Position among siblings after sorting: subdirectories first, then files.
    pub seq: u32,
    /// Number of immediate children. Zero for files.
    pub items: u32,
}

impl Entry {
    pub fn dir(name: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            kind: EntryKind::Directory,
            ..Default::default()
        }
    }

    pub fn file(name: impl Into<Vec<u8>>, size: u64) -> Self {
        Self {
            name: name.into(),
            kind: EntryKind::File,
            size,
            ..Default::default()
        }
    }

    /// Root of a walk. An empty name is left out of every emitted path.
    pub fn root(name: impl Into<Vec<u8>>) -> Self {
        Self::dir(name)
    }

    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }

    /// Name for display; invalid UTF-8 is replaced.
    pub fn name_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.name)
    }
}
