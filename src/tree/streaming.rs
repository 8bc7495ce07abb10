//! StreamingWalker - emits records while walking, without keeping finished subtrees

use std::io;

use crate::backend::Backend;
use crate::error::Result;

use super::arena::{NodeArena, NodeId, VisitMark};
use super::entry::Entry;
use super::summary::WalkSummary;
use super::traversal::BaseTraversal;
use super::utils::entry_path;

/// Callback for streaming output.
///
/// A directory is announced (id and full path) as soon as its parent has been listed,
/// before it is entered. Entries are reported with their parent's id: files as soon as
/// they are listed, directories once their whole subtree is closed and their size is
/// final. The root is announced first (parent id 0 on its entry record) and reported
/// last.
pub trait StreamingOutput {
    fn announce_dir(&mut self, id: u32, path: &[u8]) -> io::Result<()>;

    fn output_entry(&mut self, parent_id: u32, entry: &Entry) -> io::Result<()>;

    fn finish(&mut self, _summary: &WalkSummary) -> io::Result<()> {
        Ok(())
    }
}

/// Single-pass walker fusing aggregation, emission and release.
///
/// Files are emitted and released as soon as their directory is listed; a directory's
/// subdirectories are emitted and released when the directory closes. Memory use is
/// bounded by the listed-but-unclosed directories along the current path.
pub struct StreamingWalker<B: Backend> {
    backend: B,
}

impl<B: Backend> StreamingWalker<B> {
    /// Create a new streaming walker driving `backend`
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

    /// Walk and stream the subtree below the backend's current position.
    ///
    /// Records already written stay written if the walk fails part way.
    pub fn walk_streaming<O: StreamingOutput>(
        &mut self,
        root: &mut Entry,
        output: &mut O,
    ) -> Result<WalkSummary> {
        let mut walk = BaseTraversal::start(&mut self.backend, root)?;
        let result = stream(&mut walk, output);
        let summary = walk.finish(root);
        result?;
        output.output_entry(0, root)?;
        output.finish(&summary)?;
        Ok(summary)
    }
}

fn stream<B: Backend, O: StreamingOutput>(
    walk: &mut BaseTraversal<'_, B>,
    output: &mut O,
) -> Result<()> {
    let root = NodeArena::ROOT;
    entry_path(&walk.arena, root, &mut walk.path);
    output.announce_dir(walk.arena[root].entry.id, &walk.path)?;

    let mut cursor = Some(root);
    while let Some(d) = cursor {
        if walk.arena[d].mark == VisitMark::Fresh {
            walk.read_dir(d);

            let mut next = walk.arena[d].child;
            while let Some(c) = next {
                entry_path(&walk.arena, c, &mut walk.path);
                output.announce_dir(walk.arena[c].entry.id, &walk.path)?;
                next = walk.arena[c].sibling;
            }

            let files = walk.arena[d].file_child.take();
            emit_fold_release(&mut walk.arena, d, files, output)?;

            if let Some(child) = walk.go_child(d) {
                walk.arena[d].mark = VisitMark::Returning;
                cursor = Some(child);
                continue;
            }
        } else {
            walk.arena[d].mark = VisitMark::Fresh;
        }

        let dirs = walk.arena[d].child.take();
        emit_fold_release(&mut walk.arena, d, dirs, output)?;
        cursor = walk.go_sibling_or_parent(d)?;
    }
    Ok(())
}

/// Emit every entry of the chain starting at `head`, add its size to `dir` and
/// release it. The chain must already be detached from `dir`.
fn emit_fold_release<O: StreamingOutput>(
    arena: &mut NodeArena,
    dir: NodeId,
    head: Option<NodeId>,
    output: &mut O,
) -> Result<()> {
    let parent_id = arena[dir].entry.id;
    let mut next = head;
    while let Some(id) = next {
        next = arena[id].sibling;
        let entry = arena.release(id);
        output.output_entry(parent_id, &entry)?;
        let size = &mut arena[dir].entry.size;
        *size = size.saturating_add(entry.size);
    }
    Ok(())
}
