//! Planning of cut / copy / paste / delete.
//!
//! Nothing here touches the filesystem. A [`FileOpPayload`] collects what
//! the user cut or copied, and [`FileOpPayload::paste_into`] or
//! [`delete_selected`] turn that into one [`FileOpRequest`] for an external
//! [`FileOpExecutor`]. The caller only waits until the executor reports that
//! it has *started*; completion is reported later through a
//! [`crate::event::CommandSender`].

use std::path::{Path, PathBuf};

use tokio::sync::oneshot;

use crate::error::{CoreError, CoreResult};
use crate::fs::entry::EntryKind;
use crate::nav::store::EntryStore;

/// What an executor is asked to do with one path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileOpKind {
    Cut,
    Copy,
    Delete,
    Move,
}

/// One path held in a [`FileOpPayload`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileOpItem {
    pub kind: FileOpKind,
    pub entry_kind: EntryKind,
    pub path: PathBuf,
}

/// The parameters handed to a [`FileOpExecutor`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileOpRequest {
    pub items: Vec<(FileOpKind, PathBuf)>,
    /// Target directory for copies and moves; `None` for deletes.
    pub destination: Option<PathBuf>,
}

/// Handshake an executor completes once it has validated a request and
/// started working on it.
#[derive(Debug)]
pub struct StartSignal(oneshot::Sender<Result<(), String>>);

impl StartSignal {
    pub fn started(self) {
        let _ = self.0.send(Ok(()));
    }

    pub fn failed(self, reason: impl Into<String>) {
        let _ = self.0.send(Err(reason.into()));
    }
}

/// An asynchronous worker that performs the actual filesystem mutation.
///
/// `enqueue` must return promptly; the work itself happens elsewhere. The
/// executor must eventually complete `started`, either way. Dropping it
/// unsignalled is reported to the caller as a failure.
pub trait FileOpExecutor {
    fn enqueue(&self, request: FileOpRequest, started: StartSignal);
}

/// Hands `request` to `executor` and blocks until it has started.
///
/// Must not be called from inside an async runtime.
///
/// # Errors
///
/// Returns [`CoreError::FileOp`] if the executor refuses the request or
/// drops it without signalling.
pub fn execute(executor: &dyn FileOpExecutor, request: FileOpRequest) -> CoreResult<()> {
    let (tx, rx) = oneshot::channel();
    let count = request.items.len();
    executor.enqueue(request, StartSignal(tx));

    match rx.blocking_recv() {
        Ok(Ok(())) => {
            tracing::debug!("file operation started ({count} items)");
            Ok(())
        }
        Ok(Err(reason)) => Err(CoreError::FileOp(reason)),
        Err(_) => Err(CoreError::FileOp(
            "executor dropped the request before starting it".to_string(),
        )),
    }
}

/// The cut / copy buffer of one view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileOpPayload {
    items: Vec<FileOpItem>,
}

impl FileOpPayload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[FileOpItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Adds the selected entries as cut and marks them `is_cut`. Entries that
    /// are already cut are left alone. Returns how many were added.
    pub fn cut_selected(&mut self, store: &mut EntryStore) -> usize {
        let mut added = 0;
        for view in store.entries_mut() {
            if !view.is_selected || view.is_cut || view.entry.is_dotdot() {
                continue;
            }
            view.is_cut = true;
            self.items.push(FileOpItem {
                kind: FileOpKind::Cut,
                entry_kind: view.entry.kind(),
                path: view.entry.path().to_path_buf(),
            });
            added += 1;
        }
        added
    }

    /// Adds the selected entries as copies. Cut entries and paths already in
    /// the payload are skipped. Returns how many were added.
    pub fn copy_selected(&mut self, store: &EntryStore) -> usize {
        let mut added = 0;
        for view in store.selected() {
            if view.is_cut || view.entry.is_dotdot() {
                continue;
            }
            if self.items.iter().any(|i| i.path == view.entry.path()) {
                continue;
            }
            self.items.push(FileOpItem {
                kind: FileOpKind::Copy,
                entry_kind: view.entry.kind(),
                path: view.entry.path().to_path_buf(),
            });
            added += 1;
        }
        added
    }

    /// Sends the payload to `executor` as moves (for cut items) and copies
    /// into `destination`, and empties the payload once the executor has
    /// started. An empty payload is a no-op.
    ///
    /// # Errors
    ///
    /// [`CoreError::InvalidName`] for an empty destination, otherwise
    /// whatever [`execute`] reports. The payload is kept on error.
    pub fn paste_into(&mut self, destination: &Path, executor: &dyn FileOpExecutor) -> CoreResult<()> {
        if self.items.is_empty() {
            return Ok(());
        }
        if destination.as_os_str().is_empty() {
            return Err(CoreError::InvalidName("empty paste destination".to_string()));
        }

        let items = self
            .items
            .iter()
            .map(|item| {
                let kind = match item.kind {
                    FileOpKind::Cut => FileOpKind::Move,
                    other => other,
                };
                (kind, item.path.clone())
            })
            .collect();

        execute(
            executor,
            FileOpRequest {
                items,
                destination: Some(destination.to_path_buf()),
            },
        )?;
        self.items.clear();
        Ok(())
    }
}

/// Asks `executor` to delete every selected entry except `..`. Returns the
/// number of paths requested; `0` means nothing was sent.
///
/// # Errors
///
/// Whatever [`execute`] reports.
pub fn delete_selected(store: &EntryStore, executor: &dyn FileOpExecutor) -> CoreResult<usize> {
    let items: Vec<(FileOpKind, PathBuf)> = store
        .selected()
        .filter(|v| !v.entry.is_dotdot())
        .map(|v| (FileOpKind::Delete, v.entry.path().to_path_buf()))
        .collect();
    if items.is_empty() {
        return Ok(0);
    }
    let count = items.len();
    execute(
        executor,
        FileOpRequest {
            items,
            destination: None,
        },
    )?;
    Ok(count)
}
