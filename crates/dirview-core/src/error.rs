//! Error types for `dirview-core`.
//!
//! All fallible operations in the core library return [`CoreResult<T>`],
//! which is an alias for `Result<T, CoreError>`. Per-entry failures during a
//! scan never surface here; they are logged and the entry is skipped.

use std::path::PathBuf;

use crate::rename::{PatternError, TransformError};

/// Unified error type for all core operations.
///
/// Each variant captures just enough context for the caller to display
/// a meaningful message or take corrective action.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// The target path does not exist.
    #[error("path not found: {0}")]
    NotFound(PathBuf),

    /// The process lacks permission to access the path.
    #[error("permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// A directory was expected but the path points to a file.
    #[error("not a directory: {0}")]
    NotADirectory(PathBuf),

    /// A file or directory name is invalid (empty, contains path separators, etc.).
    #[error("invalid name: {0}")]
    InvalidName(String),

    /// Failed to parse a TOML configuration file.
    #[error("config parse error: {0}")]
    ConfigParse(String),

    /// A bulk-rename pattern failed to compile.
    #[error("invalid rename pattern: {0}")]
    Pattern(#[from] PatternError),

    /// A compiled pattern produced a name that does not fit the output buffer.
    #[error("rename failed: {0}")]
    Transform(#[from] TransformError),

    /// Persisted view state could not be read back.
    #[error("view state error: {0}")]
    Persist(String),

    /// A change-notification subscription could not be issued.
    #[error("watch error: {0}")]
    Watch(String),

    /// The file-operation executor refused or failed to start a request.
    #[error("file operation failed: {0}")]
    FileOp(String),

    /// An I/O error that doesn't fit a more specific variant.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CoreError {
    /// Maps an I/O error for `path` onto the most specific variant.
    pub(crate) fn from_io(err: std::io::Error, path: &std::path::Path) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => CoreError::NotFound(path.to_path_buf()),
            std::io::ErrorKind::PermissionDenied => CoreError::PermissionDenied(path.to_path_buf()),
            _ => CoreError::Io(err),
        }
    }
}

/// Convenience alias used throughout `dirview-core`.
pub type CoreResult<T> = Result<T, CoreError>;
