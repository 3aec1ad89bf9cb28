//! [`WatchHandle`] backed by the platform's native notification API.
//!
//! Uses [`notify`]'s recommended watcher in non-recursive mode. Events are
//! delivered on notify's own thread into a channel that [`poll`] drains
//! without blocking, so any number of raw events between two polls are
//! reported as one change.
//!
//! [`poll`]: WatchHandle::poll

use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, TryRecvError};

use notify::event::{MetadataKind, ModifyKind};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

use crate::error::{CoreError, CoreResult};
use crate::watch::{ChangeEvent, WatchHandle};

/// Native directory watcher. Created idle; the OS watcher is only set up
/// on the first [`WatchHandle::issue`].
#[derive(Default)]
pub struct NotifyWatchHandle {
    watcher: Option<RecommendedWatcher>,
    rx: Option<Receiver<notify::Result<Event>>>,
    watched: Option<PathBuf>,
}

impl NotifyWatchHandle {
    pub fn new() -> Self {
        Self::default()
    }
}

impl WatchHandle for NotifyWatchHandle {
    fn issue(&mut self, dir: &Path) -> CoreResult<()> {
        // The notify stream stays open between changes, so re-arming the
        // same directory keeps the existing watcher.
        if self.watched.as_deref() == Some(dir) {
            return Ok(());
        }
        self.cancel();

        let (tx, rx) = mpsc::channel();
        let mut watcher =
            notify::recommended_watcher(tx).map_err(|e| CoreError::Watch(e.to_string()))?;
        watcher
            .watch(dir, RecursiveMode::NonRecursive)
            .map_err(|e| CoreError::Watch(format!("{}: {e}", dir.display())))?;

        self.watcher = Some(watcher);
        self.rx = Some(rx);
        self.watched = Some(dir.to_path_buf());
        Ok(())
    }

    fn poll(&mut self) -> Option<ChangeEvent> {
        let rx = self.rx.as_ref()?;
        let mut changed = false;
        let mut paths = Vec::new();

        loop {
            match rx.try_recv() {
                Ok(Ok(event)) => {
                    if is_relevant(&event.kind) {
                        changed = true;
                        paths.extend(event.paths);
                    }
                }
                Ok(Err(err)) => {
                    // Treat watcher errors as "something changed" so the view
                    // gets re-read rather than silently going stale.
                    tracing::warn!("watch error: {err}");
                    changed = true;
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }

        changed.then_some(ChangeEvent { paths })
    }

    fn cancel(&mut self) {
        if let (Some(watcher), Some(dir)) = (self.watcher.as_mut(), self.watched.as_deref()) {
            let _ = watcher.unwatch(dir);
        }
        self.watcher = None;
        self.rx = None;
        self.watched = None;
    }
}

/// Creation, deletion, renames, content writes and write-time changes.
fn is_relevant(kind: &EventKind) -> bool {
    match kind {
        EventKind::Any | EventKind::Create(_) | EventKind::Remove(_) => true,
        EventKind::Modify(ModifyKind::Metadata(meta)) => {
            matches!(meta, MetadataKind::WriteTime | MetadataKind::Any)
        }
        EventKind::Modify(_) => true,
        _ => false,
    }
}
