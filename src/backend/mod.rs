//! Backend capability consumed by the tree walkers
//!
//! A backend owns a navigation cursor over some hierarchical namespace (local
//! filesystem, FTP, SMB, ...) and exposes exactly two operations:
//!
//! - `enumerate`: list the directory the cursor is currently inside
//! - `navigate`: move the cursor to a child, a sibling, or the parent
//!
//! The walkers never open files or know protocol details; they only drive these
//! two calls and build their own tree from the results.

mod config;
mod local;

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::tree::Entry;

pub use config::LocalConfig;
pub use local::{LocalBackend, LocalListing};

/// Where to move the backend cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction<'a> {
    /// From a directory into one of its subdirectories.
    EnterChild(&'a [u8]),
    /// From a directory to another subdirectory of the same parent.
    NextSibling(&'a [u8]),
    /// From a directory back to its parent.
    ExitToParent,
}

/// Navigation failure reported by a backend.
///
/// Failing `EnterChild` or `NextSibling` is recoverable: the walker skips that
/// directory. Failing `ExitToParent` aborts the walk.
#[derive(Debug, Error)]
pub enum NavError {
    #[error("cannot access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{path} is not a directory")]
    NotADirectory { path: PathBuf },

    #[error("already at the top of the scan")]
    AtTop,

    #[error("no directory named '{name}'")]
    NoSuchEntry { name: String },

    #[error("access to '{name}' denied")]
    Denied { name: String },

    #[error("{path} leads back to a directory above it")]
    Loop { path: PathBuf },
}

impl NavError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// The enumerate/navigate contract a walker drives.
///
/// `enumerate` is called once per directory while the cursor is inside it. The
/// returned listing yields entries with `name`, `kind` and (for files) `size` set;
/// it is finite and consumed exactly once. Per-entry failures are the backend's
/// business: the walker treats whatever the listing yields as authoritative.
pub trait Backend {
    type Listing: Iterator<Item = Entry>;

    fn enumerate(&mut self) -> Self::Listing;

    fn navigate(&mut self, direction: Direction<'_>) -> Result<(), NavError>;
}

impl<B: Backend + ?Sized> Backend for &mut B {
    type Listing = B::Listing;

    fn enumerate(&mut self) -> Self::Listing {
        (**self).enumerate()
    }

    fn navigate(&mut self, direction: Direction<'_>) -> Result<(), NavError> {
        (**self).navigate(direction)
    }
}
