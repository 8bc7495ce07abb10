//! Local filesystem backend

use std::ffi::{OsStr, OsString};
use std::fs::{self, Metadata};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use glob::Pattern;
use tracing::{debug, warn};

use crate::tree::Entry;

use super::config::LocalConfig;
use super::{Backend, Direction, NavError};

/// Backend over the local filesystem. The cursor is a path below the scan root.
///
/// The identities of the directories on the cursor path are kept so that a symlink
/// leading back to one of them is refused instead of walked again.
pub struct LocalBackend {
    cursor: PathBuf,
    depth: usize,
    follow_symlinks: bool,
    filter: Arc<EntryFilter>,
    lineage: Vec<Option<DirKey>>,
}

impl LocalBackend {
    /// Open a backend positioned inside `root`, which must be a listable directory.
    pub fn open(root: impl AsRef<Path>, config: LocalConfig) -> Result<Self, NavError> {
        let root = root.as_ref().to_path_buf();
        // The scan root itself may be a symlink; only children honor follow_symlinks
        let meta = check_listable(&root, true)?;
        Ok(Self {
            cursor: root,
            depth: 0,
            follow_symlinks: config.follow_symlinks,
            filter: Arc::new(EntryFilter::new(&config)),
            lineage: vec![dir_key(&meta)],
        })
    }

    /// Directory the cursor is currently inside.
    pub fn cursor(&self) -> &Path {
        &self.cursor
    }

    /// Levels below the scan root.
    pub fn depth(&self) -> usize {
        self.depth
    }
}

impl LocalBackend {
    /// Check `target` can be listed and is not one of the first `ancestors`
    /// directories on the cursor path.
    fn check_enterable(&self, target: &Path, ancestors: usize) -> Result<Option<DirKey>, NavError> {
        let key = dir_key(&check_listable(target, self.follow_symlinks)?);
        if key.is_some() && self.lineage[..ancestors].contains(&key) {
            return Err(NavError::Loop {
                path: target.to_path_buf(),
            });
        }
        Ok(key)
    }
}

impl Backend for LocalBackend {
    type Listing = LocalListing;

    fn enumerate(&mut self) -> LocalListing {
        let inner = match fs::read_dir(&self.cursor) {
            Ok(rd) => Some(rd),
            Err(err) => {
                warn!(path = %self.cursor.display(), error = %err, "cannot list directory");
                None
            }
        };
        LocalListing {
            inner,
            follow_symlinks: self.follow_symlinks,
            filter: Arc::clone(&self.filter),
        }
    }

    fn navigate(&mut self, direction: Direction<'_>) -> Result<(), NavError> {
        match direction {
            Direction::EnterChild(name) => {
                let target = self.cursor.join(name_to_path(name));
                let key = self.check_enterable(&target, self.lineage.len())?;
                self.cursor = target;
                self.depth += 1;
                self.lineage.push(key);
            }
            Direction::NextSibling(name) => {
                if self.depth == 0 {
                    return Err(NavError::AtTop);
                }
                let target = match self.cursor.parent() {
                    Some(parent) => parent.join(name_to_path(name)),
                    None => return Err(NavError::AtTop),
                };
                let key = self.check_enterable(&target, self.lineage.len() - 1)?;
                self.cursor = target;
                if let Some(last) = self.lineage.last_mut() {
                    *last = key;
                }
            }
            Direction::ExitToParent => {
                if self.depth == 0 || !self.cursor.pop() {
                    return Err(NavError::AtTop);
                }
                self.depth -= 1;
                self.lineage.pop();
            }
        }
        Ok(())
    }
}

/// Lazy listing of one local directory.
pub struct LocalListing {
    inner: Option<fs::ReadDir>,
    follow_symlinks: bool,
    filter: Arc<EntryFilter>,
}

impl Iterator for LocalListing {
    type Item = Entry;

    fn next(&mut self) -> Option<Entry> {
        loop {
            let dent = match self.inner.as_mut()?.next()? {
                Ok(dent) => dent,
                Err(err) => {
                    debug!(error = %err, "skipping unreadable directory entry");
                    continue;
                }
            };

            let path = dent.path();
            let name = dent.file_name();
            if self.filter.rejects(&name, &path) {
                continue;
            }

            // DirEntry::metadata does not traverse symlinks
            let meta = if self.follow_symlinks {
                fs::metadata(&path).or_else(|_| dent.metadata())
            } else {
                dent.metadata()
            };
            let meta = match meta {
                Ok(meta) => meta,
                Err(err) => {
                    debug!(path = %path.display(), error = %err, "skipping entry without metadata");
                    continue;
                }
            };

            let name = name_to_bytes(name);
            return Some(if meta.is_dir() {
                Entry::dir(name)
            } else {
                Entry::file(name, meta.len())
            });
        }
    }
}

/// Decides which directory entries are left out of listings.
#[derive(Debug)]
struct EntryFilter {
    names: Vec<String>,
    patterns: Vec<Pattern>,
    max_path_len: usize,
    skip_hidden: bool,
}

impl EntryFilter {
    fn new(config: &LocalConfig) -> Self {
        let patterns = config
            .ignore_patterns
            .iter()
            .filter_map(|raw| match Pattern::new(raw) {
                Ok(p) => Some(p),
                Err(err) => {
                    warn!(pattern = %raw, error = %err, "invalid ignore pattern, matching exact name only");
                    None
                }
            })
            .collect();
        Self {
            names: config.ignore_patterns.clone(),
            patterns,
            max_path_len: config.max_path_len,
            skip_hidden: config.skip_hidden,
        }
    }

    fn rejects(&self, name: &OsStr, path: &Path) -> bool {
        if path.as_os_str().len() > self.max_path_len {
            debug!(path = %path.display(), "omitting entry with overlong path");
            return true;
        }

        let name = name.to_string_lossy();
        if self.skip_hidden && name.starts_with('.') {
            return true;
        }
        self.names.iter().any(|n| *n == name) || self.patterns.iter().any(|p| p.matches(&name))
    }
}

/// Check that `path` is a directory the process can list.
fn check_listable(path: &Path, follow_symlinks: bool) -> Result<Metadata, NavError> {
    let meta = if follow_symlinks {
        fs::metadata(path)
    } else {
        fs::symlink_metadata(path)
    }
    .map_err(|e| NavError::io(path, e))?;

    if !meta.is_dir() {
        return Err(NavError::NotADirectory {
            path: path.to_path_buf(),
        });
    }
    fs::read_dir(path).map_err(|e| NavError::io(path, e))?;
    Ok(meta)
}

/// Device and inode of a directory.
type DirKey = (u64, u64);

#[cfg(unix)]
fn dir_key(meta: &Metadata) -> Option<DirKey> {
    use std::os::unix::fs::MetadataExt;
    Some((meta.dev(), meta.ino()))
}

#[cfg(not(unix))]
fn dir_key(_meta: &Metadata) -> Option<DirKey> {
    None
}

#[cfg(unix)]
fn name_to_bytes(name: OsString) -> Vec<u8> {
    use std::os::unix::ffi::OsStringExt;
    name.into_vec()
}

#[cfg(not(unix))]
fn name_to_bytes(name: OsString) -> Vec<u8> {
    name.to_string_lossy().into_owned().into_bytes()
}

#[cfg(unix)]
fn name_to_path(name: &[u8]) -> PathBuf {
    use std::os::unix::ffi::OsStrExt;
    PathBuf::from(OsStr::from_bytes(name))
}

#[cfg(not(unix))]
fn name_to_path(name: &[u8]) -> PathBuf {
    PathBuf::from(String::from_utf8_lossy(name).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::EntryKind;
    use tempfile::TempDir;

    fn setup() -> TempDir {
        let dir = TempDir::new().expect("Failed to create temp dir");
        fs::create_dir_all(dir.path().join("a/inner")).unwrap();
        fs::create_dir_all(dir.path().join("b")).unwrap();
        fs::write(dir.path().join("z.txt"), vec![0u8; 10]).unwrap();
        fs::write(dir.path().join("a/w.txt"), vec![0u8; 5]).unwrap();
        fs::write(dir.path().join(".hidden"), b"x").unwrap();
        dir
    }

    fn listing(backend: &mut LocalBackend) -> Vec<(String, EntryKind, u64)> {
        let mut entries: Vec<_> = backend
            .enumerate()
            .map(|e| (e.name_lossy().into_owned(), e.kind, e.size))
            .collect();
        entries.sort();
        entries
    }

    #[test]
    fn test_enumerate_reports_kinds_and_sizes() {
        let dir = setup();
        let mut backend = LocalBackend::open(dir.path(), LocalConfig::default()).unwrap();
        let entries = listing(&mut backend);

        assert!(entries.contains(&("z.txt".to_string(), EntryKind::File, 10)));
        assert!(entries.contains(&(".hidden".to_string(), EntryKind::File, 1)));
        assert!(entries.iter().any(|(n, k, _)| n == "a" && *k == EntryKind::Directory));
        assert!(entries.iter().any(|(n, k, _)| n == "b" && *k == EntryKind::Directory));
        assert_eq!(entries.len(), 4);
    }

    #[test]
    fn test_navigation_moves_cursor() {
        let dir = setup();
        let mut backend = LocalBackend::open(dir.path(), LocalConfig::default()).unwrap();

        backend.navigate(Direction::EnterChild(b"a")).unwrap();
        assert_eq!(backend.cursor(), dir.path().join("a"));
        assert_eq!(backend.depth(), 1);

        backend.navigate(Direction::NextSibling(b"b")).unwrap();
        assert_eq!(backend.cursor(), dir.path().join("b"));

        backend.navigate(Direction::ExitToParent).unwrap();
        assert_eq!(backend.cursor(), dir.path());
        assert_eq!(backend.depth(), 0);
    }

    #[test]
    fn test_failed_navigation_keeps_cursor() {
        let dir = setup();
        let mut backend = LocalBackend::open(dir.path(), LocalConfig::default()).unwrap();

        let err = backend.navigate(Direction::EnterChild(b"z.txt")).unwrap_err();
        assert!(matches!(err, NavError::NotADirectory { .. }));
        assert!(backend.navigate(Direction::EnterChild(b"missing")).is_err());
        assert_eq!(backend.cursor(), dir.path());

        backend.navigate(Direction::EnterChild(b"a")).unwrap();
        assert!(backend.navigate(Direction::NextSibling(b"nope")).is_err());
        assert_eq!(backend.cursor(), dir.path().join("a"));
    }

    #[test]
    fn test_cannot_leave_scan_root() {
        let dir = setup();
        let mut backend = LocalBackend::open(dir.path(), LocalConfig::default()).unwrap();
        assert!(matches!(
            backend.navigate(Direction::ExitToParent),
            Err(NavError::AtTop)
        ));
        assert!(matches!(
            backend.navigate(Direction::NextSibling(b"a")),
            Err(NavError::AtTop)
        ));
    }

    #[test]
    fn test_open_rejects_files() {
        let dir = setup();
        assert!(LocalBackend::open(dir.path().join("z.txt"), LocalConfig::default()).is_err());
        assert!(LocalBackend::open(dir.path().join("missing"), LocalConfig::default()).is_err());
    }

    #[test]
    fn test_ignore_patterns_and_hidden() {
        let dir = setup();
        let config = LocalConfig {
            ignore_patterns: vec!["*.txt".to_string(), "b".to_string()],
            skip_hidden: true,
            ..Default::default()
        };
        let mut backend = LocalBackend::open(dir.path(), config).unwrap();
        let names: Vec<_> = listing(&mut backend).into_iter().map(|(n, _, _)| n).collect();
        assert_eq!(names, vec!["a".to_string()]);
    }

    #[test]
    fn test_overlong_paths_are_omitted() {
        let dir = setup();
        let limit = dir.path().join("z.txt").as_os_str().len();
        let config = LocalConfig {
            max_path_len: limit,
            ..Default::default()
        };
        let mut backend = LocalBackend::open(dir.path(), config).unwrap();
        let names: Vec<_> = listing(&mut backend).into_iter().map(|(n, _, _)| n).collect();
        // ".hidden" is longer than "z.txt"
        assert!(names.contains(&"z.txt".to_string()));
        assert!(!names.contains(&".hidden".to_string()));
    }

    #[test]
    #[cfg(unix)]
    fn test_symlinked_directory_is_a_file_unless_followed() {
        let dir = setup();
        std::os::unix::fs::symlink(dir.path().join("a"), dir.path().join("link")).unwrap();

        let mut backend = LocalBackend::open(dir.path(), LocalConfig::default()).unwrap();
        let entries = listing(&mut backend);
        let link = entries.iter().find(|(n, _, _)| n == "link").unwrap();
        assert_eq!(link.1, EntryKind::File);
        assert!(backend.navigate(Direction::EnterChild(b"link")).is_err());

        let config = LocalConfig {
            follow_symlinks: true,
            ..Default::default()
        };
        let mut backend = LocalBackend::open(dir.path(), config).unwrap();
        let entries = listing(&mut backend);
        let link = entries.iter().find(|(n, _, _)| n == "link").unwrap();
        assert_eq!(link.1, EntryKind::Directory);
        backend.navigate(Direction::EnterChild(b"link")).unwrap();
    }

    #[test]
    #[cfg(unix)]
    fn test_followed_link_to_ancestor_is_refused() {
        let dir = setup();
        std::os::unix::fs::symlink("..", dir.path().join("a/up")).unwrap();
        std::os::unix::fs::symlink(".", dir.path().join("a/inner/here")).unwrap();

        let config = LocalConfig {
            follow_symlinks: true,
            ..Default::default()
        };
        let mut backend = LocalBackend::open(dir.path(), config).unwrap();
        backend.navigate(Direction::EnterChild(b"a")).unwrap();

        let err = backend.navigate(Direction::EnterChild(b"up")).unwrap_err();
        assert!(matches!(err, NavError::Loop { .. }));
        assert_eq!(backend.cursor(), dir.path().join("a"));

        backend.navigate(Direction::EnterChild(b"inner")).unwrap();
        let err = backend.navigate(Direction::EnterChild(b"here")).unwrap_err();
        assert!(matches!(err, NavError::Loop { .. }));
        // A sibling may not be the current directory's own parent either
        let err = backend.navigate(Direction::NextSibling(b"..")).unwrap_err();
        assert!(matches!(err, NavError::Loop { .. }));

        backend.navigate(Direction::ExitToParent).unwrap();
        backend.navigate(Direction::NextSibling(b"b")).unwrap();
        assert_eq!(backend.cursor(), dir.path().join("b"));
        assert_eq!(backend.depth(), 1);
    }

    #[test]
    fn test_backend_can_move_to_another_thread() {
        let dir = setup();
        let backend = LocalBackend::open(dir.path(), LocalConfig::default()).unwrap();
        let count = std::thread::spawn(move || {
            let mut backend = backend;
            backend.enumerate().count()
        })
        .join()
        .unwrap();
        assert_eq!(count, 4);
    }
}
