//! Multi-key ordering of directory entries.

use std::cmp::Ordering;

use crate::fs::entry::{DirectoryEntry, EntryKind, EntryView};

/// The column an entry is compared by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortColumn {
    /// Enumeration order.
    Id,
    /// Case-insensitive name.
    Path,
    /// Kind precedence: directory, symlink to directory, file, symlink to
    /// file, invalid symlink.
    Type,
    /// Size in bytes; directories sort below empty files.
    Size,
    Created,
    Modified,
}

/// Sort order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    /// Smallest / earliest / A–Z first.
    Ascending,
    /// Largest / latest / Z–A first.
    Descending,
}

/// Ordered list of sort keys. Earlier keys dominate; later keys only break
/// ties. Entries equal on every key fall back to ascending id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    keys: Vec<(SortColumn, SortDirection)>,
}

impl Default for SortSpec {
    fn default() -> Self {
        Self::new(vec![(SortColumn::Path, SortDirection::Ascending)])
    }
}

impl SortSpec {
    pub fn new(keys: Vec<(SortColumn, SortDirection)>) -> Self {
        Self { keys }
    }

    /// A spec with a single key.
    pub fn by(column: SortColumn, direction: SortDirection) -> Self {
        Self::new(vec![(column, direction)])
    }

    /// Appends a tie-breaking key.
    #[must_use]
    pub fn then(mut self, column: SortColumn, direction: SortDirection) -> Self {
        self.keys.push((column, direction));
        self
    }

    pub fn keys(&self) -> &[(SortColumn, SortDirection)] {
        &self.keys
    }

    fn compare(&self, a: &DirectoryEntry, b: &DirectoryEntry) -> Ordering {
        self.keys
            .iter()
            .map(|&(column, direction)| {
                let ord = compare_by_column(a, b, column);
                match direction {
                    SortDirection::Ascending => ord,
                    SortDirection::Descending => ord.reverse(),
                }
            })
            .find(|ord| ord.is_ne())
            .unwrap_or_else(|| a.id().cmp(&b.id()))
    }
}

fn compare_by_column(a: &DirectoryEntry, b: &DirectoryEntry, column: SortColumn) -> Ordering {
    match column {
        SortColumn::Id => a.id().cmp(&b.id()),
        SortColumn::Path => compare_ignore_case(a.name(), b.name()),
        // Higher precedence sorts first.
        SortColumn::Type => type_precedence(b.kind()).cmp(&type_precedence(a.kind())),
        SortColumn::Size => compare_size(a, b),
        SortColumn::Created => a.created().cmp(&b.created()),
        SortColumn::Modified => a.modified().cmp(&b.modified()),
    }
}

fn compare_ignore_case(a: &str, b: &str) -> Ordering {
    a.chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase))
}

fn type_precedence(kind: EntryKind) -> u8 {
    match kind {
        EntryKind::Directory => 5,
        EntryKind::SymlinkToDirectory => 4,
        EntryKind::File => 3,
        EntryKind::SymlinkToFile => 2,
        EntryKind::InvalidSymlink => 1,
    }
}

fn compare_size(a: &DirectoryEntry, b: &DirectoryEntry) -> Ordering {
    let empty_file = |e: &DirectoryEntry| e.kind().is_file() && e.size() == 0;
    if a.kind().is_directory() && empty_file(b) {
        return Ordering::Less;
    }
    if empty_file(a) && b.kind().is_directory() {
        return Ordering::Greater;
    }
    a.size().cmp(&b.size())
}

/// Orders `entries` in place and returns the index of the first filtered-out
/// entry (`entries.len()` when none are filtered).
///
/// Filtered entries are moved, in their existing relative order, into one
/// trailing block. The visible prefix is first put into ascending id order,
/// so the result does not depend on the order the OS reported entries in,
/// and then stably sorted by `spec`.
pub fn sort_entries(entries: &mut [EntryView], spec: &SortSpec) -> usize {
    entries.sort_by_key(|v| v.is_filtered_out);
    let split = entries
        .iter()
        .position(|v| v.is_filtered_out)
        .unwrap_or(entries.len());

    let visible = &mut entries[..split];
    visible.sort_by_key(|v| v.entry.id());
    visible.sort_by(|a, b| spec.compare(&a.entry, &b.entry));

    split
}
