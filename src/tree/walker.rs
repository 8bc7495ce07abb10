//! TreeWalker - builds the full tree in memory, then replays it with final sizes

use std::io;

use crate::backend::Backend;
use crate::error::Result;

use super::arena::{NodeArena, VisitMark};
use super::entry::Entry;
use super::summary::WalkSummary;
use super::traversal::{BaseTraversal, next_sibling_or_parent};
use super::utils::entry_path;

/// Receives entries from [`TreeWalker`] in parent-before-children order, each with
/// its full path and final size.
pub trait TreeOutput {
    fn output_entry(&mut self, path: &[u8], entry: &Entry) -> io::Result<()>;

    fn finish(&mut self, _summary: &WalkSummary) -> io::Result<()> {
        Ok(())
    }
}

/// Two-pass walker.
///
/// The first pass drives the backend through the whole subtree and folds every
/// directory's size into its parent. The second pass touches only memory: it emits
/// each directory's subdirectories and files, releasing files immediately and each
/// subdirectory chain once its subtree has been emitted. Memory use is O(entries).
pub struct TreeWalker<B: Backend> {
    backend: B,
}

impl<B: Backend> TreeWalker<B> {
    /// Create a new two-pass walker driving `backend`
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Get the backend, positioned where the last walk left it
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Give the backend back to the caller
    pub fn into_backend(self) -> B {
        self.backend
    }

    /// Walk the subtree below the backend's current position.
    ///
    /// `root` describes that position. It comes back with `id = 1`, its item count and
    /// its recursive size; the walk consumes everything below it.
    pub fn walk<O: TreeOutput>(&mut self, root: &mut Entry, output: &mut O) -> Result<WalkSummary> {
        let mut walk = BaseTraversal::start(&mut self.backend, root)?;
        let result = aggregate(&mut walk).and_then(|()| emit(&mut walk, output));
        let summary = walk.finish(root);
        result?;
        output.finish(&summary)?;
        Ok(summary)
    }
}

/// First pass: materialize every reachable directory and compute its size.
fn aggregate<B: Backend>(walk: &mut BaseTraversal<'_, B>) -> Result<()> {
    let mut cursor = Some(NodeArena::ROOT);
    while let Some(d) = cursor {
        if walk.arena[d].mark == VisitMark::Fresh {
            walk.read_dir(d);
            if let Some(child) = walk.go_child(d) {
                walk.arena[d].mark = VisitMark::Returning;
                cursor = Some(child);
                continue;
            }
        } else {
            walk.arena[d].mark = VisitMark::Fresh;
        }
        walk.arena.fold_sizes(d);
        cursor = walk.go_sibling_or_parent(d)?;
    }
    Ok(())
}

/// Second pass: emit the built tree and release it. No backend calls.
fn emit<B: Backend, O: TreeOutput>(walk: &mut BaseTraversal<'_, B>, output: &mut O) -> Result<()> {
    let root = NodeArena::ROOT;
    entry_path(&walk.arena, root, &mut walk.path);
    output.output_entry(&walk.path, &walk.arena[root].entry)?;

    let mut cursor = Some(root);
    while let Some(d) = cursor {
        if walk.arena[d].mark == VisitMark::Fresh {
            let mut next = walk.arena[d].child;
            while let Some(c) = next {
                entry_path(&walk.arena, c, &mut walk.path);
                output.output_entry(&walk.path, &walk.arena[c].entry)?;
                next = walk.arena[c].sibling;
            }

            let mut next = walk.arena[d].file_child.take();
            while let Some(f) = next {
                entry_path(&walk.arena, f, &mut walk.path);
                output.output_entry(&walk.path, &walk.arena[f].entry)?;
                next = walk.arena[f].sibling;
                walk.arena.release(f);
            }

            if let Some(child) = walk.arena[d].child {
                walk.arena[d].mark = VisitMark::Returning;
                cursor = Some(child);
                continue;
            }
        } else {
            walk.arena[d].mark = VisitMark::Fresh;
        }

        let mut next = walk.arena[d].child.take();
        while let Some(c) = next {
            next = walk.arena[c].sibling;
            walk.arena.release(c);
        }
        cursor = next_sibling_or_parent(&walk.arena, d);
    }
    Ok(())
}
