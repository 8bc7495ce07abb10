//! Test utilities: an in-memory backend and temporary directory trees.
//!
//! This module is only compiled for tests, benchmarks and the `test-utils` feature.

use std::fs;
use std::path::{Path, PathBuf};
use std::vec;

use tempfile::TempDir;

use crate::backend::{Backend, Direction, NavError};
use crate::tree::Entry;

#[derive(Debug)]
enum MemKind {
    Dir(Vec<usize>),
    File(u64),
}

#[derive(Debug)]
struct MemNode {
    name: Vec<u8>,
    kind: MemKind,
    denied: bool,
    fail_exit: bool,
}

/// Backend double over a tree held in memory.
///
/// Children are listed in insertion order, so callers control the order the walker
/// sees. Directories can be marked as impossible to enter, or impossible to leave.
/// Every navigation attempt is logged as `enter NAME`, `sibling NAME` or `exit`,
/// with a trailing ` !` when it failed.
#[derive(Debug)]
pub struct MemoryBackend {
    nodes: Vec<MemNode>,
    cursor: Vec<usize>,
    log: Vec<String>,
    enumerations: usize,
}

impl MemoryBackend {
    /// Create an empty tree with the cursor at its root.
    pub fn new() -> Self {
        Self {
            nodes: vec![MemNode {
                name: Vec::new(),
                kind: MemKind::Dir(Vec::new()),
                denied: false,
                fail_exit: false,
            }],
            cursor: vec![0],
            log: Vec::new(),
            enumerations: 0,
        }
    }

    /// Add a directory, creating missing parents.
    pub fn dir(mut self, path: &str) -> Self {
        self.ensure_dir(path);
        self
    }

    /// Add a file of `size` bytes, creating missing parents.
    pub fn file(mut self, path: &str, size: u64) -> Self {
        let (parent, name) = match path.rsplit_once('/') {
            Some((parent, name)) => (self.ensure_dir(parent), name),
            None => (0, path),
        };
        self.push_child(parent, name.as_bytes(), MemKind::File(size));
        self
    }

    /// Make navigation into the directory at `path` fail.
    pub fn deny(mut self, path: &str) -> Self {
        let idx = self.ensure_dir(path);
        self.nodes[idx].denied = true;
        self
    }

    /// Make navigation from the directory at `path` back to its parent fail.
    pub fn fail_exit_from(mut self, path: &str) -> Self {
        let idx = self.ensure_dir(path);
        self.nodes[idx].fail_exit = true;
        self
    }

    /// Navigation attempts so far.
    pub fn navigation_log(&self) -> &[String] {
        &self.log
    }

    /// Number of `enumerate` calls so far.
    pub fn enumerations(&self) -> usize {
        self.enumerations
    }

    /// Slash-joined path of the cursor, empty at the root.
    pub fn position(&self) -> String {
        self.cursor[1..]
            .iter()
            .map(|&idx| String::from_utf8_lossy(&self.nodes[idx].name).into_owned())
            .collect::<Vec<_>>()
            .join("/")
    }

    /// Sum of every file size in the tree.
    pub fn total_size(&self) -> u64 {
        self.nodes
            .iter()
            .map(|n| match n.kind {
                MemKind::File(size) => size,
                MemKind::Dir(_) => 0,
            })
            .sum()
    }

    fn ensure_dir(&mut self, path: &str) -> usize {
        let mut cur = 0;
        for part in path.split('/').filter(|p| !p.is_empty()) {
            cur = match self.find_child(cur, part.as_bytes()) {
                Some(idx) => idx,
                None => self.push_child(cur, part.as_bytes(), MemKind::Dir(Vec::new())),
            };
        }
        cur
    }

    fn push_child(&mut self, parent: usize, name: &[u8], kind: MemKind) -> usize {
        let idx = self.nodes.len();
        self.nodes.push(MemNode {
            name: name.to_vec(),
            kind,
            denied: false,
            fail_exit: false,
        });
        match &mut self.nodes[parent].kind {
            MemKind::Dir(children) => children.push(idx),
            MemKind::File(_) => panic!("cannot add a child under a file"),
        }
        idx
    }

    fn find_child(&self, parent: usize, name: &[u8]) -> Option<usize> {
        match &self.nodes[parent].kind {
            MemKind::Dir(children) => children
                .iter()
                .copied()
                .find(|&idx| self.nodes[idx].name == name),
            MemKind::File(_) => None,
        }
    }

    /// Resolve `name` under `parent` as an enterable directory.
    fn enterable(&self, parent: usize, name: &[u8]) -> Result<usize, NavError> {
        let lossy = || String::from_utf8_lossy(name).into_owned();
        let idx = self
            .find_child(parent, name)
            .ok_or_else(|| NavError::NoSuchEntry { name: lossy() })?;
        let node = &self.nodes[idx];
        if let MemKind::File(_) = node.kind {
            return Err(NavError::NotADirectory {
                path: PathBuf::from(lossy()),
            });
        }
        if node.denied {
            return Err(NavError::Denied { name: lossy() });
        }
        Ok(idx)
    }

    fn try_navigate(&mut self, direction: Direction<'_>) -> Result<(), NavError> {
        match direction {
            Direction::EnterChild(name) => {
                let top = self.cursor[self.cursor.len() - 1];
                let idx = self.enterable(top, name)?;
                self.cursor.push(idx);
            }
            Direction::NextSibling(name) => {
                if self.cursor.len() < 2 {
                    return Err(NavError::AtTop);
                }
                let parent = self.cursor[self.cursor.len() - 2];
                let idx = self.enterable(parent, name)?;
                let last = self.cursor.len() - 1;
                self.cursor[last] = idx;
            }
            Direction::ExitToParent => {
                if self.cursor.len() < 2 {
                    return Err(NavError::AtTop);
                }
                let top = &self.nodes[self.cursor[self.cursor.len() - 1]];
                if top.fail_exit {
                    return Err(NavError::Denied {
                        name: "..".to_string(),
                    });
                }
                self.cursor.pop();
            }
        }
        Ok(())
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl Backend for MemoryBackend {
    type Listing = vec::IntoIter<Entry>;

    fn enumerate(&mut self) -> Self::Listing {
        self.enumerations += 1;
        let top = self.cursor[self.cursor.len() - 1];
        let children = match &self.nodes[top].kind {
            MemKind::Dir(children) => children.as_slice(),
            MemKind::File(_) => &[],
        };
        children
            .iter()
            .map(|&idx| {
                let node = &self.nodes[idx];
                match node.kind {
                    MemKind::Dir(_) => Entry::dir(node.name.clone()),
                    MemKind::File(size) => Entry::file(node.name.clone(), size),
                }
            })
            .collect::<Vec<_>>()
            .into_iter()
    }

    fn navigate(&mut self, direction: Direction<'_>) -> Result<(), NavError> {
        let result = self.try_navigate(direction);
        let mut line = match direction {
            Direction::EnterChild(name) => format!("enter {}", String::from_utf8_lossy(name)),
            Direction::NextSibling(name) => format!("sibling {}", String::from_utf8_lossy(name)),
            Direction::ExitToParent => "exit".to_string(),
        };
        if result.is_err() {
            line.push_str(" !");
        }
        self.log.push(line);
        result
    }
}

/// A temporary directory tree for testing the local backend.
///
/// The directory is removed when dropped.
pub struct TestDir {
    dir: TempDir,
}

impl TestDir {
    /// Create a new empty temporary directory.
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        Self { dir }
    }

    /// Get the path to the temporary directory.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Add a file of `size` zero bytes, creating parent directories as needed.
    pub fn add_file(&self, path: &str, size: usize) -> PathBuf {
        let full_path = self.dir.path().join(path);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent dirs");
        }
        fs::write(&full_path, vec![0u8; size]).expect("Failed to write file");
        full_path
    }

    /// Add an empty directory, creating parents as needed.
    pub fn add_dir(&self, path: &str) -> PathBuf {
        let full_path = self.dir.path().join(path);
        fs::create_dir_all(&full_path).expect("Failed to create dir");
        full_path
    }
}

impl Default for TestDir {
    fn default() -> Self {
        Self::new()
    }
}
