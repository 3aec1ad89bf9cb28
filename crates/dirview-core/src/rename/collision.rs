//! Detecting name clashes in a planned bulk rename.

use std::collections::HashSet;

use crate::fs::entry::EntryView;

/// One planned rename: the entry at `before` (an index into the entry
/// slice the plan was built from) gets the name `after`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameOp {
    pub before: usize,
    pub after: String,
}

/// A clash among renames `first..=last` (indices into the reordered rename
/// list), optionally also blocked by an existing entry that is not being
/// renamed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Collision {
    pub first: usize,
    pub last: usize,
    pub blocking: Option<usize>,
}

impl Collision {
    /// Number of renames involved. Always at least one.
    pub fn len(&self) -> usize {
        self.last - self.first + 1
    }
}

/// Finds every clash in `renames`.
///
/// `renames` is reordered by target name, descending, so that renames with
/// the same target are adjacent; the returned ranges index the reordered
/// list. Targets are compared byte for byte.
///
/// - A unique target that matches an entry not being renamed yields a
///   single-index collision pointing at that entry.
/// - A run of two or more identical targets yields one collision covering
///   the whole run, with a blocking entry only if the name is also taken by
///   an entry not being renamed.
///
/// Nothing is mutated besides the order of `renames`; callers decide whether
/// to block or warn.
pub fn find_collisions(renames: &mut [RenameOp], entries: &[EntryView]) -> Vec<Collision> {
    if renames.is_empty() {
        return Vec::new();
    }

    renames.sort_by(|a, b| b.after.cmp(&a.after));

    let renamed: HashSet<usize> = renames.iter().map(|r| r.before).collect();
    let blocking = |name: &str| {
        entries
            .iter()
            .enumerate()
            .find(|(i, v)| !renamed.contains(i) && v.entry.name() == name)
            .map(|(i, _)| i)
    };

    let first_dup = renames
        .windows(2)
        .position(|pair| pair[0].after == pair[1].after)
        .unwrap_or(renames.len());

    let mut collisions = Vec::new();

    for (i, rename) in renames[..first_dup].iter().enumerate() {
        if let Some(entry) = blocking(&rename.after) {
            collisions.push(Collision {
                first: i,
                last: i,
                blocking: Some(entry),
            });
        }
    }

    let mut first = first_dup;
    while first < renames.len() {
        let mut last = first;
        while last + 1 < renames.len() && renames[last + 1].after == renames[first].after {
            last += 1;
        }
        let blocker = blocking(&renames[first].after);
        if last > first || blocker.is_some() {
            collisions.push(Collision {
                first,
                last,
                blocking: blocker,
            });
        }
        first = last + 1;
    }

    collisions
}
