//! Turning a selection and a pattern into a list of renames.

use std::path::PathBuf;

use crate::fs::entry::EntryView;
use crate::rename::collision::{find_collisions, Collision, RenameOp};
use crate::rename::pattern::CompiledPattern;
use crate::rename::transform::{transform, TransformContext, TransformError, DEFAULT_CAPACITY};

/// Knobs for [`plan_bulk_rename`], usually taken from
/// [`crate::config::RenameConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenameOptions {
    /// Maximum length of a generated name, in bytes.
    pub capacity: usize,
    pub counter_start: i64,
    pub counter_step: i64,
}

impl Default for RenameOptions {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            counter_start: 1,
            counter_step: 1,
        }
    }
}

/// An entry whose new name could not be generated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameFailure {
    /// Index of the entry in the slice the plan was built from.
    pub index: usize,
    pub error: TransformError,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenamePlan {
    pub renames: Vec<RenameOp>,
    pub failures: Vec<RenameFailure>,
}

impl RenamePlan {
    pub fn is_empty(&self) -> bool {
        self.renames.is_empty() && self.failures.is_empty()
    }

    /// Runs collision detection over the planned renames. This reorders
    /// [`RenamePlan::renames`]; the returned ranges refer to the new order.
    pub fn collisions(&mut self, entries: &[EntryView]) -> Vec<Collision> {
        find_collisions(&mut self.renames, entries)
    }

    /// Full `(from, to)` paths for every planned rename, in plan order.
    /// Renames that do not change the name are left out.
    pub fn path_pairs(&self, entries: &[EntryView]) -> Vec<(PathBuf, PathBuf)> {
        self.renames
            .iter()
            .filter_map(|op| {
                let entry = &entries.get(op.before)?.entry;
                if entry.name() == op.after {
                    return None;
                }
                let from = entry.path().to_path_buf();
                let to = from.with_file_name(&op.after);
                Some((from, to))
            })
            .collect()
    }
}

/// Splits a file name into stem and extension at the last dot. Names with no
/// dot, a leading dot only (`.bashrc`) or a trailing dot have no extension.
fn split_name(name: &str) -> (&str, Option<&str>) {
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => (stem, Some(ext)),
        _ => (name, None),
    }
}

/// Plans the renaming of every selected entry except `..`, in slice order.
///
/// Files are split into stem and extension; directories use their full name
/// and have no extension. The counter starts at `counter_start` and moves by
/// `counter_step` for each planned entry, including ones that fail. Failures
/// do not stop the batch.
pub fn plan_bulk_rename(
    entries: &[EntryView],
    pattern: &CompiledPattern,
    options: &RenameOptions,
) -> RenamePlan {
    let mut plan = RenamePlan::default();
    let mut counter = options.counter_start;

    for (index, view) in entries.iter().enumerate() {
        if !view.is_selected || view.entry.is_dotdot() {
            continue;
        }

        let entry = &view.entry;
        let (name, ext) = if entry.kind().is_directory() {
            (entry.name(), None)
        } else {
            split_name(entry.name())
        };
        let ctx = TransformContext {
            name,
            ext,
            counter,
            bytes: entry.size(),
        };

        match transform(pattern, &ctx, options.capacity) {
            Ok(after) => plan.renames.push(RenameOp { before: index, after }),
            Err(error) => {
                tracing::debug!("cannot rename {}: {error}", entry.name());
                plan.failures.push(RenameFailure { index, error });
            }
        }
        counter = counter.saturating_add(options.counter_step);
    }

    plan
}
