//! Directory entry representation.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// What a directory entry points at, resolved once at scan time.
///
/// Shortcut-like files are classified by following their target: a link to
/// an existing directory is [`EntryKind::SymlinkToDirectory`], a link to an
/// existing file is [`EntryKind::SymlinkToFile`], anything else is
/// [`EntryKind::InvalidSymlink`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    Directory,
    File,
    SymlinkToDirectory,
    SymlinkToFile,
    InvalidSymlink,
}

impl EntryKind {
    /// Every kind, in the order used by per-kind visibility tables.
    pub const ALL: [EntryKind; 5] = [
        EntryKind::Directory,
        EntryKind::File,
        EntryKind::SymlinkToDirectory,
        EntryKind::SymlinkToFile,
        EntryKind::InvalidSymlink,
    ];

    /// Returns `true` for real directories (not links to them).
    pub fn is_directory(self) -> bool {
        self == EntryKind::Directory
    }

    /// Returns `true` for regular files (not links to them).
    pub fn is_file(self) -> bool {
        self == EntryKind::File
    }

    /// Returns `true` for any kind of shortcut, valid or not.
    pub fn is_symlink(self) -> bool {
        matches!(
            self,
            EntryKind::SymlinkToDirectory | EntryKind::SymlinkToFile | EntryKind::InvalidSymlink
        )
    }
}

/// A single child of a scanned directory.
///
/// `DirectoryEntry` is immutable once built by the scanner. The `id` is the
/// zero-based enumeration index and is only unique within one scan
/// generation: the next full scan rebuilds every entry from scratch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    id: u32,
    path: PathBuf,
    name: String,
    kind: EntryKind,
    size: u64,
    created: Option<SystemTime>,
    modified: Option<SystemTime>,
}

impl DirectoryEntry {
    /// Creates an entry. Directory sizes are forced to `0`.
    pub fn new(
        id: u32,
        path: PathBuf,
        name: String,
        kind: EntryKind,
        size: u64,
        created: Option<SystemTime>,
        modified: Option<SystemTime>,
    ) -> Self {
        Self {
            id,
            path,
            name,
            kind,
            size: if kind.is_directory() { 0 } else { size },
            created,
            modified,
        }
    }

    /// Scan-local identifier (enumeration order).
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Returns the full path of this entry.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the NFC-normalised file name (last component of the path).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the kind resolved at scan time.
    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    /// Returns the file size in bytes. Always `0` for directories.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Returns the creation time, if the platform reports one.
    pub fn created(&self) -> Option<SystemTime> {
        self.created
    }

    /// Returns the last modification time, if available.
    pub fn modified(&self) -> Option<SystemTime> {
        self.modified
    }

    /// Returns `true` for the synthetic parent reference (`..`).
    pub fn is_dotdot(&self) -> bool {
        self.name == ".."
    }
}

/// A [`DirectoryEntry`] plus the per-view state the UI mutates.
///
/// Owned exclusively by [`crate::nav::store::EntryStore`]; the whole
/// collection is discarded on every filesystem query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryView {
    pub entry: DirectoryEntry,
    pub is_selected: bool,
    pub is_filtered_out: bool,
    pub is_cut: bool,
    /// Byte offset into `entry.name()` of the filter match.
    pub highlight_start: usize,
    /// Byte length of the filter match; `0` means nothing is highlighted.
    pub highlight_len: usize,
    /// Remaining ticks of the "scrolled to" spotlight, `0` when idle.
    pub spotlight_ttl: u32,
}

impl EntryView {
    /// Wraps a freshly scanned entry with all flags cleared.
    pub fn new(entry: DirectoryEntry) -> Self {
        Self {
            entry,
            is_selected: false,
            is_filtered_out: false,
            is_cut: false,
            highlight_start: 0,
            highlight_len: 0,
            spotlight_ttl: 0,
        }
    }

    /// The highlighted slice of the entry name, if any.
    pub fn highlighted(&self) -> Option<&str> {
        if self.highlight_len == 0 {
            return None;
        }
        self.entry
            .name()
            .get(self.highlight_start..self.highlight_start + self.highlight_len)
    }

    pub(crate) fn clear_highlight(&mut self) {
        self.highlight_start = 0;
        self.highlight_len = 0;
    }
}
