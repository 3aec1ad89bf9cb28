//! Repopulating an [`EntryStore`] from the filesystem.

use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::fs::entry::{DirectoryEntry, EntryKind, EntryView};
use crate::fs::lister::{DirectoryLister, RawEntry, ShortcutResolver};
use crate::nav::store::EntryStore;

/// Scanner behavior switches, usually taken from [`crate::config::Config`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanOptions {
    /// Keep the parent reference (`..`) at index 0.
    pub show_dotdot_dir: bool,
    /// Follow shortcut-like files to classify their target. This is the slow
    /// path; when off, every shortcut is reported as an invalid symlink.
    pub resolve_shortcuts: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            show_dotdot_dir: true,
            resolve_shortcuts: true,
        }
    }
}

/// Bookkeeping updated by every successful scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    pub last_scan: Option<Instant>,
    /// Entries enumerated over the lifetime of the view.
    pub lifetime_enumerated: u64,
    pub successful_scans: u64,
}

/// Which stages of an update cycle to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanActions {
    pub query_filesystem: bool,
    pub filter: bool,
    pub sort: bool,
}

impl ScanActions {
    /// Re-enumerate, re-filter and re-sort.
    pub const FULL_REFRESH: Self = Self {
        query_filesystem: true,
        filter: true,
        sort: true,
    };
    /// Re-filter and re-sort the entries already in the store.
    pub const FILTER: Self = Self {
        query_filesystem: false,
        filter: true,
        sort: true,
    };
    /// Re-enumerate and re-sort without touching filter state.
    pub const QUERY: Self = Self {
        query_filesystem: true,
        filter: false,
        sort: true,
    };

    /// Combines two requests, running every stage either asks for.
    #[must_use]
    pub fn union(self, other: Self) -> Self {
        Self {
            query_filesystem: self.query_filesystem || other.query_filesystem,
            filter: self.filter || other.filter,
            sort: self.sort || other.sort,
        }
    }
}

/// Enumerates one directory into an [`EntryStore`].
pub struct Scanner<'a> {
    lister: &'a dyn DirectoryLister,
    resolver: &'a dyn ShortcutResolver,
    options: ScanOptions,
}

impl<'a> Scanner<'a> {
    pub fn new(
        lister: &'a dyn DirectoryLister,
        resolver: &'a dyn ShortcutResolver,
        options: ScanOptions,
    ) -> Self {
        Self {
            lister,
            resolver,
            options,
        }
    }

    /// Replaces the contents of `store` with the children of `dir`.
    ///
    /// Entries that were selected before the scan stay selected if an entry
    /// with exactly the same path comes back. Paths in `select_next` are
    /// selected the same way (first match wins) and the queue is emptied
    /// once the scan completes.
    ///
    /// Returns `false`, leaving the store empty, when `dir` is empty or
    /// cannot be listed. Entries whose name is not valid UTF-8 are skipped
    /// without aborting the scan.
    pub fn scan(
        &self,
        store: &mut EntryStore,
        dir: &Path,
        select_next: &mut Vec<PathBuf>,
        stats: &mut ScanStats,
        now: Instant,
    ) -> bool {
        let mut previously_selected = store.selected_paths();
        store.clear();

        if dir.as_os_str().is_empty() {
            return false;
        }

        let raw_entries = match self.lister.enumerate(dir) {
            Ok(entries) => entries,
            Err(err) => {
                tracing::debug!("scan of {} failed: {err}", dir.display());
                return false;
            }
        };

        let mut next_id: u32 = 0;
        let mut enumerated: u64 = 0;

        for raw in &raw_entries {
            let Some(name) = raw.name.to_str() else {
                tracing::debug!(
                    "skipping entry with undecodable name {:?} in {}",
                    raw.name,
                    dir.display()
                );
                continue;
            };
            if name == "." {
                continue;
            }

            let path = dir.join(&raw.name);
            let id = next_id;
            next_id += 1;
            enumerated += 1;

            if name == ".." {
                if self.options.show_dotdot_dir {
                    let entry = DirectoryEntry::new(
                        id,
                        path,
                        name.to_string(),
                        EntryKind::Directory,
                        0,
                        raw.created,
                        raw.modified,
                    );
                    store.push_front(EntryView::new(entry));
                }
                continue;
            }

            let kind = self.classify(raw, &path);
            let entry = DirectoryEntry::new(
                id,
                path,
                crate::nfc_string(name),
                kind,
                raw.size,
                raw.created,
                raw.modified,
            );

            let mut view = EntryView::new(entry);
            view.is_selected = take_match(&mut previously_selected, view.entry.path())
                || take_match(select_next, view.entry.path());
            store.push(view);
        }

        select_next.clear();
        stats.last_scan = Some(now);
        stats.lifetime_enumerated += enumerated;
        stats.successful_scans += 1;

        tracing::debug!(
            "scanned {}: {} entries ({} kept)",
            dir.display(),
            enumerated,
            store.len()
        );
        true
    }

    fn classify(&self, raw: &RawEntry, path: &Path) -> EntryKind {
        if raw.is_dir {
            return EntryKind::Directory;
        }
        if !raw.is_shortcut {
            return EntryKind::File;
        }
        if !self.options.resolve_shortcuts {
            return EntryKind::InvalidSymlink;
        }
        match self.resolver.resolve_shortcut(path) {
            Ok(target) if target.target_path.is_dir() => EntryKind::SymlinkToDirectory,
            Ok(target) if target.target_path.exists() => EntryKind::SymlinkToFile,
            Ok(_) => EntryKind::InvalidSymlink,
            Err(err) => {
                tracing::trace!("could not resolve shortcut {}: {err}", path.display());
                EntryKind::InvalidSymlink
            }
        }
    }
}

/// Removes the first path equal to `path` from `paths`, reporting whether
/// one was found.
fn take_match(paths: &mut Vec<PathBuf>, path: &Path) -> bool {
    match paths.iter().position(|p| p == path) {
        Some(index) => {
            paths.swap_remove(index);
            true
        }
        None => false,
    }
}
