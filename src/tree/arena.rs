//! Node storage for the tree under construction.
//!
//! Nodes live in slab slots addressed by [`NodeId`]. Each directory node heads two
//! singly linked chains threaded through `sibling`: its subdirectories (`child`) and
//! its files (`file_child`). A chain is owned by whoever holds its head; releasing a
//! node empties its slot for reuse. The root occupies a fixed slot, is supplied by the
//! caller and is never counted as an allocation.

use std::ops::{Index, IndexMut};

use super::entry::Entry;

/// Handle to a live node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct NodeId(usize);

/// Traversal state of a directory node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum VisitMark {
    /// Not entered yet, or closed and reset.
    #[default]
    Fresh,
    /// Descended into a child; the next visit comes back from below.
    Returning,
}

#[derive(Debug)]
pub(crate) struct Node {
    pub entry: Entry,
    pub parent: Option<NodeId>,
    pub sibling: Option<NodeId>,
    pub child: Option<NodeId>,
    pub file_child: Option<NodeId>,
    pub mark: VisitMark,
}

impl Node {
    fn new(entry: Entry, parent: Option<NodeId>) -> Self {
        Self {
            entry,
            parent,
            sibling: None,
            child: None,
            file_child: None,
            mark: VisitMark::Fresh,
        }
    }
}

pub(crate) struct NodeArena {
    slots: Vec<Option<Node>>,
    vacant: Vec<usize>,
    allocated: usize,
    released: usize,
}

impl NodeArena {
    pub const ROOT: NodeId = NodeId(0);

    pub fn with_root(root: Entry) -> Self {
        Self {
            slots: vec![Some(Node::new(root, None))],
            vacant: Vec::new(),
            allocated: 0,
            released: 0,
        }
    }

    /// Allocate a node for `entry` under `parent`. Links other than `parent` start empty.
    pub fn alloc(&mut self, entry: Entry, parent: NodeId) -> NodeId {
        self.allocated += 1;
        let node = Node::new(entry, Some(parent));
        match self.vacant.pop() {
            Some(slot) => {
                self.slots[slot] = Some(node);
                NodeId(slot)
            }
            None => {
                self.slots.push(Some(node));
                NodeId(self.slots.len() - 1)
            }
        }
    }

    /// Release a node and hand back its entry. The node must already be unlinked
    /// from its owner and own no chains.
    pub fn release(&mut self, id: NodeId) -> Entry {
        assert_ne!(id, Self::ROOT, "the root is owned by the caller");
        let node = match self.slots[id.0].take() {
            Some(node) => node,
            None => panic!("node {} released twice", id.0),
        };
        debug_assert!(
            node.child.is_none() && node.file_child.is_none(),
            "released node still owns children"
        );
        self.vacant.push(id.0);
        self.released += 1;
        node.entry
    }

    /// Move the root entry out, leaving the arena without a root.
    pub fn take_root(&mut self) -> Entry {
        self.slots[Self::ROOT.0]
            .take()
            .map(|node| node.entry)
            .unwrap_or_default()
    }

    /// Iterate a chain from its head.
    pub fn siblings(&self, head: Option<NodeId>) -> Chain<'_> {
        Chain { arena: self, next: head }
    }

    /// Add the sizes of both child chains of `dir` to its own size, saturating at `u64::MAX`.
    pub fn fold_sizes(&mut self, dir: NodeId) {
        let node = &self[dir];
        let total = self
            .siblings(node.file_child)
            .chain(self.siblings(node.child))
            .fold(0u64, |acc, id| acc.saturating_add(self[id].entry.size));
        let size = &mut self[dir].entry.size;
        *size = size.saturating_add(total);
    }

    pub fn allocated(&self) -> usize {
        self.allocated
    }

    pub fn released(&self) -> usize {
        self.released
    }

    /// Nodes currently alive, not counting the root.
    pub fn live(&self) -> usize {
        self.allocated - self.released
    }
}

impl Index<NodeId> for NodeArena {
    type Output = Node;

    fn index(&self, id: NodeId) -> &Node {
        match self.slots.get(id.0).and_then(Option::as_ref) {
            Some(node) => node,
            None => panic!("node {} used after release", id.0),
        }
    }
}

impl IndexMut<NodeId> for NodeArena {
    fn index_mut(&mut self, id: NodeId) -> &mut Node {
        match self.slots.get_mut(id.0).and_then(Option::as_mut) {
            Some(node) => node,
            None => panic!("node {} used after release", id.0),
        }
    }
}

/// Iterator over the node ids of one sibling chain.
pub(crate) struct Chain<'a> {
    arena: &'a NodeArena,
    next: Option<NodeId>,
}

impl Iterator for Chain<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.next?;
        self.next = self.arena[id].sibling;
        Some(id)
    }
}
