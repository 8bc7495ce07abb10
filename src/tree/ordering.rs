//! Sibling ordering and numbering.
//!
//! After a directory level is enumerated its subdirectories and files are sorted by
//! raw name bytes and numbered in one space: subdirectories take `0..dirs`, files take
//! `dirs..dirs + files`. Directory ids are handed out earlier, at discovery time.

use super::arena::{NodeArena, NodeId};

/// Sort the subdirectories and files discovered under `dir`, number them, link them
/// into `dir`'s two chains and record the item count.
pub(crate) fn order_children(
    arena: &mut NodeArena,
    dir: NodeId,
    dirs: Vec<NodeId>,
    files: Vec<NodeId>,
) {
    let dir_count = dirs.len() as u32;
    let items = dir_count + files.len() as u32;

    let child = link_sorted(arena, dirs, 0);
    let file_child = link_sorted(arena, files, dir_count);

    let node = &mut arena[dir];
    node.child = child;
    node.file_child = file_child;
    node.entry.items = items;
}

/// Sort `ids` by name, assign consecutive `seq` values from `first_seq`, thread the
/// sibling links in that order and return the new chain head.
fn link_sorted(arena: &mut NodeArena, mut ids: Vec<NodeId>, first_seq: u32) -> Option<NodeId> {
    ids.sort_by(|a, b| arena[*a].entry.name.cmp(&arena[*b].entry.name));

    for (i, &id) in ids.iter().enumerate() {
        let node = &mut arena[id];
        node.entry.seq = first_seq + i as u32;
        node.sibling = ids.get(i + 1).copied();
    }
    ids.first().copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::Entry;

    fn names(arena: &NodeArena, head: Option<NodeId>) -> Vec<(String, u32)> {
        arena
            .siblings(head)
            .map(|id| {
                let e = &arena[id].entry;
                (e.name_lossy().into_owned(), e.seq)
            })
            .collect()
    }

    #[test]
    fn test_dirs_numbered_before_files() {
        let mut arena = NodeArena::with_root(Entry::root(""));
        let root = NodeArena::ROOT;
        let dirs = ["b", "a", "c"]
            .iter()
            .map(|n| arena.alloc(Entry::dir(*n), root))
            .collect();
        let files = ["z.txt", "m.txt"]
            .iter()
            .map(|n| arena.alloc(Entry::file(*n, 1), root))
            .collect();

        order_children(&mut arena, root, dirs, files);

        let node = &arena[root];
        assert_eq!(node.entry.items, 5);
        assert_eq!(
            names(&arena, node.child),
            vec![("a".into(), 0), ("b".into(), 1), ("c".into(), 2)]
        );
        assert_eq!(
            names(&arena, node.file_child),
            vec![("m.txt".into(), 3), ("z.txt".into(), 4)]
        );
    }

    #[test]
    fn test_sort_is_bytewise() {
        let mut arena = NodeArena::with_root(Entry::root(""));
        let root = NodeArena::ROOT;
        let files = [&b"b"[..], b"B", b"a", b"\xc3\xa9", b"_"]
            .iter()
            .map(|n| arena.alloc(Entry::file(n.to_vec(), 1), root))
            .collect();

        order_children(&mut arena, root, Vec::new(), files);

        let order: Vec<Vec<u8>> = arena
            .siblings(arena[root].file_child)
            .map(|id| arena[id].entry.name.clone())
            .collect();
        assert_eq!(
            order,
            vec![
                b"B".to_vec(),
                b"_".to_vec(),
                b"a".to_vec(),
                b"b".to_vec(),
                b"\xc3\xa9".to_vec()
            ]
        );
        assert_eq!(arena[root].child, None);
    }

    #[test]
    fn test_empty_directory() {
        let mut arena = NodeArena::with_root(Entry::root(""));
        order_children(&mut arena, NodeArena::ROOT, Vec::new(), Vec::new());
        let node = &arena[NodeArena::ROOT];
        assert_eq!(node.entry.items, 0);
        assert!(node.child.is_none() && node.file_child.is_none());
    }
}
