//! The entry collection behind one directory view.
//!
//! [`EntryStore`] owns the [`EntryView`]s of the current scan generation and
//! composes [filtering](crate::nav::filter) and [sorting](crate::nav::sort)
//! over them. The scanner replaces its contents wholesale; everything else
//! mutates flags in place.

use std::path::PathBuf;

use crate::fs::entry::{EntryKind, EntryView};
use crate::nav::filter::{apply_filter, FilterConfig, FilterOutcome};
use crate::nav::sort::{sort_entries, SortSpec};

/// Summary counts for status displays.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EntryCounts {
    pub total: usize,
    pub visible: usize,
    pub filtered: usize,
    pub selected_directories: usize,
    pub selected_files: usize,
    pub selected_symlinks: usize,
}

impl EntryCounts {
    pub fn selected(&self) -> usize {
        self.selected_directories + self.selected_files + self.selected_symlinks
    }
}

#[derive(Debug, Clone, Default)]
pub struct EntryStore {
    entries: Vec<EntryView>,
    /// Index of the first filtered-out entry after the last sort.
    first_filtered: usize,
}

impl EntryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[EntryView] {
        &self.entries
    }

    pub fn entries_mut(&mut self) -> &mut [EntryView] {
        &mut self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The unfiltered prefix produced by the last [`EntryStore::sort`].
    pub fn visible(&self) -> &[EntryView] {
        &self.entries[..self.first_filtered.min(self.entries.len())]
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
        self.first_filtered = 0;
    }

    pub(crate) fn push(&mut self, view: EntryView) {
        self.entries.push(view);
        self.first_filtered = self.entries.len();
    }

    /// Places `view` at index 0. Used for the parent reference.
    pub(crate) fn push_front(&mut self, view: EntryView) {
        self.entries.insert(0, view);
        self.first_filtered = self.entries.len();
    }

    pub fn filter(&mut self, config: &mut FilterConfig) -> FilterOutcome {
        apply_filter(&mut self.entries, config)
    }

    /// Sorts in place and returns the start of the filtered block.
    pub fn sort(&mut self, spec: &SortSpec) -> usize {
        self.first_filtered = sort_entries(&mut self.entries, spec);
        self.first_filtered
    }

    pub fn deselect_all(&mut self) {
        for view in &mut self.entries {
            view.is_selected = false;
        }
    }

    /// Selects every entry that is not filtered out.
    pub fn select_all_visible(&mut self, include_dotdot: bool) {
        for view in &mut self.entries {
            if view.is_filtered_out || (!include_dotdot && view.entry.is_dotdot()) {
                continue;
            }
            view.is_selected = true;
        }
    }

    /// Flips the selection of visible entries. Filtered entries end up
    /// unselected and `..` is left alone.
    pub fn invert_selection_visible(&mut self) {
        for view in &mut self.entries {
            if view.is_filtered_out {
                view.is_selected = false;
            } else if !view.entry.is_dotdot() {
                view.is_selected = !view.is_selected;
            }
        }
    }

    pub fn uncut(&mut self) {
        for view in &mut self.entries {
            view.is_cut = false;
        }
    }

    pub fn selected(&self) -> impl Iterator<Item = &EntryView> {
        self.entries.iter().filter(|v| v.is_selected)
    }

    /// Full paths of every selected entry, in store order.
    pub fn selected_paths(&self) -> Vec<PathBuf> {
        self.selected()
            .map(|v| v.entry.path().to_path_buf())
            .collect()
    }

    pub fn counts(&self) -> EntryCounts {
        let mut counts = EntryCounts {
            total: self.entries.len(),
            ..EntryCounts::default()
        };
        for view in &self.entries {
            if view.is_filtered_out {
                counts.filtered += 1;
                continue;
            }
            counts.visible += 1;
            if !view.is_selected {
                continue;
            }
            match view.entry.kind() {
                EntryKind::Directory => counts.selected_directories += 1,
                EntryKind::File => counts.selected_files += 1,
                _ => counts.selected_symlinks += 1,
            }
        }
        counts
    }

    /// Spotlights the entry at `index` for `ttl` ticks and stops every
    /// other spotlight. Out-of-range indices only clear.
    pub fn spotlight(&mut self, index: usize, ttl: u32) {
        for view in &mut self.entries {
            view.spotlight_ttl = 0;
        }
        if let Some(view) = self.entries.get_mut(index) {
            view.spotlight_ttl = ttl;
        }
    }

    /// Advances every active spotlight by one tick.
    pub fn tick_spotlights(&mut self) {
        for view in &mut self.entries {
            view.spotlight_ttl = view.spotlight_ttl.saturating_sub(1);
        }
    }
}
