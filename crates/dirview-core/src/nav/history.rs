//! Bounded navigation history with back/forward support.

use std::path::{Path, PathBuf};

/// Default number of directories remembered per view.
pub const DEFAULT_MAX_HISTORY: usize = 30;

/// Immutable navigation history: a bounded list of visited directories and
/// a cursor into it.
///
/// Every mutation returns a **new** `History`. Pushing after going back
/// drops the forward tail (same semantics as a web browser); pushing at
/// capacity drops the oldest item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct History {
    items: Vec<PathBuf>,
    pos: usize,
    max: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_HISTORY)
    }
}

impl History {
    /// Creates an empty history holding at most `max` items (at least one).
    pub fn new(max: usize) -> Self {
        Self {
            items: Vec::new(),
            pos: 0,
            max: max.max(1),
        }
    }

    /// Rebuilds a history from persisted parts. Excess items are dropped from
    /// the front and `pos` is clamped into range.
    pub fn from_parts(mut items: Vec<PathBuf>, pos: usize, max: usize) -> Self {
        let max = max.max(1);
        let excess = items.len().saturating_sub(max);
        items.drain(..excess);
        let pos = pos.saturating_sub(excess).min(items.len().saturating_sub(1));
        Self { items, pos, max }
    }

    /// Records a visit to `path`. Visiting the current directory again is a
    /// no-op.
    pub fn push(&self, path: PathBuf) -> Self {
        if self.current() == Some(path.as_path()) {
            return self.clone();
        }
        let mut items: Vec<PathBuf> = if self.items.is_empty() {
            Vec::new()
        } else {
            self.items[..=self.pos].to_vec()
        };
        items.push(path);
        if items.len() > self.max {
            items.remove(0);
        }
        Self {
            pos: items.len() - 1,
            items,
            max: self.max,
        }
    }

    /// Go back one step. Returns the new History and the path to navigate to,
    /// or `None` if already at the oldest item.
    pub fn go_back(&self) -> Option<(Self, PathBuf)> {
        if !self.can_go_back() {
            return None;
        }
        let pos = self.pos - 1;
        let path = self.items[pos].clone();
        Some((
            Self {
                items: self.items.clone(),
                pos,
                max: self.max,
            },
            path,
        ))
    }

    /// Go forward one step. Returns the new History and the path to navigate
    /// to, or `None` if already at the newest item.
    pub fn go_forward(&self) -> Option<(Self, PathBuf)> {
        if !self.can_go_forward() {
            return None;
        }
        let pos = self.pos + 1;
        let path = self.items[pos].clone();
        Some((
            Self {
                items: self.items.clone(),
                pos,
                max: self.max,
            },
            path,
        ))
    }

    pub fn can_go_back(&self) -> bool {
        !self.items.is_empty() && self.pos > 0
    }

    pub fn can_go_forward(&self) -> bool {
        self.pos + 1 < self.items.len()
    }

    pub fn current(&self) -> Option<&Path> {
        self.items.get(self.pos).map(PathBuf::as_path)
    }

    pub fn items(&self) -> &[PathBuf] {
        &self.items
    }

    /// Index of the current item.
    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn max(&self) -> usize {
        self.max
    }
}
