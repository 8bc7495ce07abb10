//! Shared utility functions for tree walking

use super::arena::{NodeArena, NodeId};

/// Write the slash-joined path of `id` into `buf`, replacing its contents.
///
/// Ancestors are walked up to the first one with an empty name (normally the root),
/// which is left out together with its separator.
pub(crate) fn entry_path(arena: &NodeArena, id: NodeId, buf: &mut Vec<u8>) {
    let mut lineage = vec![id];
    let mut cur = id;
    while let Some(parent) = arena[cur].parent {
        if arena[parent].entry.name.is_empty() {
            break;
        }
        lineage.push(parent);
        cur = parent;
    }

    buf.clear();
    for (i, &node) in lineage.iter().rev().enumerate() {
        if i > 0 {
            buf.push(b'/');
        }
        buf.extend_from_slice(&arena[node].entry.name);
    }
}

/// Format a size in bytes to human-readable format.
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;
    const TB: u64 = GB * 1024;

    if bytes >= TB {
        format!("{:.1}T", bytes as f64 / TB as f64)
    } else if bytes >= GB {
        format!("{:.1}G", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1}M", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1}K", bytes as f64 / KB as f64)
    } else {
        format!("{}B", bytes)
    }
}
