//! Error types for tree walking.

use std::io;

use thiserror::Error;

use crate::backend::NavError;

/// Shared `Result` alias for walks.
pub type Result<T> = std::result::Result<T, WalkError>;

/// Errors that abort a walk.
///
/// Failing to enter a child or move to a sibling is not an error at this level: the
/// walkers skip such entries and carry on. Everything here ends the run.
#[derive(Debug, Error)]
pub enum WalkError {
    #[error("[DT-1001] invalid root: {details}")]
    InvalidRoot { details: String },

    /// The backend could not return to the parent directory. The in-memory cursor and
    /// the backend cursor no longer agree, so nothing after this point can be trusted.
    #[error("[DT-2001] lost position leaving '{name}': {source}")]
    LostPosition {
        name: String,
        #[source]
        source: NavError,
    },

    #[error("[DT-3001] output failure: {0}")]
    Io(#[from] io::Error),
}

impl WalkError {
    /// Stable machine-parseable error code.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidRoot { .. } => "DT-1001",
            Self::LostPosition { .. } => "DT-2001",
            Self::Io(_) => "DT-3001",
        }
    }

    pub(crate) fn lost_position(name: &[u8], source: NavError) -> Self {
        Self::LostPosition {
            name: String::from_utf8_lossy(name).into_owned(),
            source,
        }
    }
}
