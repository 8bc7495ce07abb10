//! Configuration types for the local filesystem backend

/// Paths longer than this are omitted from listings by default.
pub const DEFAULT_MAX_PATH_LEN: usize = 4096;

/// Configuration for local filesystem enumeration.
#[derive(Debug, Clone)]
pub struct LocalConfig {
    /// Follow symbolic links. When off, a link is reported as a file with its own size.
    pub follow_symlinks: bool,
    /// Names to leave out of listings (exact names or glob patterns)
    pub ignore_patterns: Vec<String>,
    /// Entries whose full path is longer than this many bytes are omitted.
    pub max_path_len: usize,
    /// Leave out dot-entries.
    pub skip_hidden: bool,
}

impl Default for LocalConfig {
    fn default() -> Self {
        Self {
            follow_symlinks: false,
            ignore_patterns: Vec::new(),
            max_path_len: DEFAULT_MAX_PATH_LEN,
            skip_hidden: false,
        }
    }
}
