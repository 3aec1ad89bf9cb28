//! Filesystem collaborators used by the scanner.
//!
//! The scanner never touches `std::fs` directly for enumeration; it goes
//! through [`DirectoryLister`] and [`ShortcutResolver`] so that frontends can
//! plug in platform adapters (or in-memory fakes in tests).

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::error::{CoreError, CoreResult};

/// One raw child as reported by the platform, before classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEntry {
    /// File name as the OS returned it. May not be valid UTF-8.
    pub name: OsString,
    pub is_dir: bool,
    /// The entry looks like a link to another target and must be resolved.
    pub is_shortcut: bool,
    pub size: u64,
    pub created: Option<SystemTime>,
    pub modified: Option<SystemTime>,
}

impl RawEntry {
    /// Builds a plain file entry.
    pub fn file(name: impl Into<OsString>, size: u64) -> Self {
        Self {
            name: name.into(),
            is_dir: false,
            is_shortcut: false,
            size,
            created: None,
            modified: None,
        }
    }

    /// Builds a plain directory entry.
    pub fn dir(name: impl Into<OsString>) -> Self {
        Self {
            name: name.into(),
            is_dir: true,
            is_shortcut: false,
            size: 0,
            created: None,
            modified: None,
        }
    }

    /// Builds a shortcut-like entry that the scanner will try to resolve.
    pub fn shortcut(name: impl Into<OsString>) -> Self {
        Self {
            name: name.into(),
            is_dir: false,
            is_shortcut: true,
            size: 0,
            created: None,
            modified: None,
        }
    }

    #[must_use]
    pub fn with_times(self, created: Option<SystemTime>, modified: Option<SystemTime>) -> Self {
        Self {
            created,
            modified,
            ..self
        }
    }
}

/// Enumerates the immediate children of a directory.
///
/// Implementations may report `.` and `..`; the scanner skips the former
/// and handles the latter according to configuration. Children whose
/// metadata cannot be read should be skipped rather than failing the whole
/// enumeration.
pub trait DirectoryLister {
    /// # Errors
    ///
    /// Returns an error only when the directory itself cannot be listed.
    fn enumerate(&self, dir: &Path) -> CoreResult<Vec<RawEntry>>;
}

/// How a shortcut asks its target to be opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShowState {
    #[default]
    Normal,
    Minimized,
    Maximized,
}

/// The resolved contents of a shortcut-like file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortcutTarget {
    pub target_path: PathBuf,
    pub working_dir: Option<PathBuf>,
    pub arguments: String,
    pub show_state: ShowState,
}

/// Resolves a shortcut-like file to the target it points at.
///
/// Stateless from the caller's point of view: any platform handles an
/// implementation needs are its own business.
pub trait ShortcutResolver {
    /// # Errors
    ///
    /// Returns an error if `path` is not a readable shortcut.
    fn resolve_shortcut(&self, path: &Path) -> CoreResult<ShortcutTarget>;
}

/// [`DirectoryLister`] backed by `std::fs::read_dir`.
///
/// Reports `..` first whenever the directory has a parent, mirroring the
/// enumeration order of platforms that list it natively. Symbolic links and
/// `.lnk` files are flagged as shortcuts.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdLister;

impl DirectoryLister for StdLister {
    fn enumerate(&self, dir: &Path) -> CoreResult<Vec<RawEntry>> {
        let meta = std::fs::metadata(dir).map_err(|e| CoreError::from_io(e, dir))?;
        if !meta.is_dir() {
            return Err(CoreError::NotADirectory(dir.to_path_buf()));
        }

        let read_dir = std::fs::read_dir(dir).map_err(|e| CoreError::from_io(e, dir))?;

        let mut entries = Vec::new();

        if let Some(parent) = dir.parent() {
            let parent_meta = std::fs::metadata(parent).ok();
            entries.push(RawEntry::dir("..").with_times(
                parent_meta.as_ref().and_then(|m| m.created().ok()),
                parent_meta.as_ref().and_then(|m| m.modified().ok()),
            ));
        }

        for dir_entry in read_dir {
            let dir_entry = match dir_entry {
                Ok(e) => e,
                Err(err) => {
                    tracing::trace!("skipping unreadable entry in {}: {err}", dir.display());
                    continue;
                }
            };
            // DirEntry::metadata does not follow symlinks.
            let metadata = match dir_entry.metadata() {
                Ok(m) => m,
                Err(err) => {
                    tracing::trace!(
                        "skipping {}: metadata unavailable: {err}",
                        dir_entry.path().display()
                    );
                    continue;
                }
            };
            let name = dir_entry.file_name();
            let is_symlink = metadata.file_type().is_symlink();
            let is_dir = !is_symlink && metadata.is_dir();
            let is_shortcut = is_symlink || (!is_dir && has_lnk_extension(&name));

            entries.push(RawEntry {
                name,
                is_dir,
                is_shortcut,
                size: if is_dir { 0 } else { metadata.len() },
                created: metadata.created().ok(),
                modified: metadata.modified().ok(),
            });
        }

        Ok(entries)
    }
}

fn has_lnk_extension(name: &std::ffi::OsStr) -> bool {
    Path::new(name)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("lnk"))
}

/// [`ShortcutResolver`] for POSIX symbolic links.
///
/// Relative link targets are made absolute against the link's parent
/// directory, which is also reported as the working directory.
#[derive(Debug, Clone, Copy, Default)]
pub struct SymlinkResolver;

impl ShortcutResolver for SymlinkResolver {
    fn resolve_shortcut(&self, path: &Path) -> CoreResult<ShortcutTarget> {
        let raw_target = std::fs::read_link(path).map_err(|e| CoreError::from_io(e, path))?;
        let parent = path.parent().map(Path::to_path_buf);

        let target_path = match (&parent, raw_target.is_relative()) {
            (Some(parent), true) => parent.join(&raw_target),
            _ => raw_target,
        };

        Ok(ShortcutTarget {
            target_path,
            working_dir: parent,
            arguments: String::new(),
            show_state: ShowState::Normal,
        })
    }
}
