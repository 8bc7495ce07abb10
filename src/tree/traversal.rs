//! Common tree traversal logic shared by TreeWalker and StreamingWalker.
//!
//! Both walkers move one cursor over the tree without recursion. Every directory
//! node carries a [`VisitMark`]: on a fresh visit the directory is materialized
//! and the walk tries to descend; on a returning visit (or when no child can be
//! entered) the directory is closed and the cursor moves to the next reachable
//! sibling, or up to the parent.

use tracing::{debug, error};

use crate::backend::{Backend, Direction};
use crate::error::{Result, WalkError};

use super::arena::{NodeArena, NodeId};
use super::entry::Entry;
use super::ordering::order_children;
use super::summary::WalkSummary;

/// Walk state shared by both walkers: the node arena plus the backend driving it.
pub(crate) struct BaseTraversal<'a, B: Backend> {
    pub arena: NodeArena,
    /// Scratch buffer for emitted paths.
    pub path: Vec<u8>,
    backend: &'a mut B,
    next_id: u32,
    dirs: usize,
    files: usize,
    skipped: usize,
}

impl<'a, B: Backend> BaseTraversal<'a, B> {
    /// Validate and initialize the caller's root, then take it over for the walk.
    /// Hand it back with [`BaseTraversal::finish`].
    pub fn start(backend: &'a mut B, root: &mut Entry) -> Result<Self> {
        if !root.is_dir() {
            error!(name = %root.name_lossy(), "walk root must be a directory");
            return Err(WalkError::InvalidRoot {
                details: format!("'{}' is not a directory", root.name_lossy()),
            });
        }

        let mut root = std::mem::take(root);
        root.id = 1;
        root.seq = 0;
        root.size = 0;
        root.items = 0;

        Ok(Self {
            arena: NodeArena::with_root(root),
            path: Vec::new(),
            backend,
            next_id: 2,
            dirs: 0,
            files: 0,
            skipped: 0,
        })
    }

    /// Return the root to the caller and report what the walk did.
    pub fn finish(mut self, root: &mut Entry) -> WalkSummary {
        if self.arena.live() > 0 {
            debug!(live = self.arena.live(), "walk stopped with entries still held");
        }
        *root = self.arena.take_root();
        WalkSummary {
            dirs: self.dirs,
            files: self.files,
            skipped: self.skipped,
            total_size: root.size,
            allocated: self.arena.allocated(),
            released: self.arena.released(),
        }
    }

    /// Enumerate the directory the backend cursor is in and hang the results under
    /// `dir`, sorted and numbered. New subdirectories get their ids here, in
    /// discovery order.
    pub fn read_dir(&mut self, dir: NodeId) {
        let mut dirs = Vec::new();
        let mut files = Vec::new();

        for mut entry in self.backend.enumerate() {
            entry.items = 0;
            if entry.is_dir() {
                entry.id = self.next_id;
                entry.size = 0;
                self.next_id += 1;
                dirs.push(self.arena.alloc(entry, dir));
            } else {
                entry.id = 0;
                files.push(self.arena.alloc(entry, dir));
            }
        }

        self.dirs += dirs.len();
        self.files += files.len();
        order_children(&mut self.arena, dir, dirs, files);
    }

    /// Move the backend into the first subdirectory of `dir` that accepts it.
    /// Returns `None` when `dir` has no subdirectories or none can be entered.
    pub fn go_child(&mut self, dir: NodeId) -> Option<NodeId> {
        let mut candidate = self.arena[dir].child;
        while let Some(c) = candidate {
            let name = &self.arena[c].entry.name;
            match self.backend.navigate(Direction::EnterChild(name)) {
                Ok(()) => return Some(c),
                Err(err) => {
                    debug!(name = %self.arena[c].entry.name_lossy(), error = %err, "skipping unreachable directory");
                    self.skipped += 1;
                    candidate = self.arena[c].sibling;
                }
            }
        }
        None
    }

    /// Move the backend from the closed directory `dir` to its next reachable
    /// sibling, or back to its parent when no sibling is left.
    ///
    /// Returns `None` once the root is closed. Failing to reach the parent is fatal.
    pub fn go_sibling_or_parent(&mut self, dir: NodeId) -> Result<Option<NodeId>> {
        let mut candidate = self.arena[dir].sibling;
        while let Some(s) = candidate {
            let name = &self.arena[s].entry.name;
            match self.backend.navigate(Direction::NextSibling(name)) {
                Ok(()) => return Ok(Some(s)),
                Err(err) => {
                    debug!(name = %self.arena[s].entry.name_lossy(), error = %err, "skipping unreachable directory");
                    self.skipped += 1;
                    candidate = self.arena[s].sibling;
                }
            }
        }

        let Some(parent) = self.arena[dir].parent else {
            return Ok(None);
        };
        if let Err(err) = self.backend.navigate(Direction::ExitToParent) {
            let name = &self.arena[dir].entry.name;
            error!(name = %String::from_utf8_lossy(name), error = %err, "cannot return to parent directory");
            return Err(WalkError::lost_position(name, err));
        }
        Ok(Some(parent))
    }
}

/// In-memory counterpart of [`BaseTraversal::go_sibling_or_parent`] for replaying an
/// already built tree.
pub(crate) fn next_sibling_or_parent(arena: &NodeArena, dir: NodeId) -> Option<NodeId> {
    let node = &arena[dir];
    node.sibling.or(node.parent)
}
