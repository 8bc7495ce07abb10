//! Counters reported at the end of a walk

/// What a completed walk saw and did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WalkSummary {
    /// Directories discovered below the root.
    pub dirs: usize,
    pub files: usize,
    /// Subdirectories the backend refused to enter; their subtrees count as empty.
    pub skipped: usize,
    /// Final recursive size of the root.
    pub total_size: u64,
    /// Nodes allocated during the walk (the root excluded).
    pub allocated: usize,
    /// Nodes released during the walk. Equal to `allocated` once a walk completes.
    pub released: usize,
}
