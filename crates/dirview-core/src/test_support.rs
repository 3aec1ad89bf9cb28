//! In-memory doubles for the collaborators the core talks to.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use crate::error::{CoreError, CoreResult};
use crate::event::{CommandSender, ViewCommand};
use crate::fs::lister::{DirectoryLister, RawEntry, ShortcutResolver, ShortcutTarget, ShowState};
use crate::fs::ops::{FileOpExecutor, FileOpRequest, StartSignal};
use crate::fs::scan::ScanActions;
use crate::watch::{ChangeEvent, WatchHandle};

/// Directory listings keyed by path. Clones share the same listings, so a
/// test can keep a handle after boxing one into a view.
#[derive(Debug, Clone, Default)]
pub(crate) struct MemoryLister {
    dirs: Rc<RefCell<HashMap<PathBuf, Vec<RawEntry>>>>,
}

impl MemoryLister {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn set(&self, dir: impl Into<PathBuf>, entries: Vec<RawEntry>) {
        self.dirs.borrow_mut().insert(dir.into(), entries);
    }

    pub(crate) fn remove(&self, dir: impl AsRef<Path>) {
        self.dirs.borrow_mut().remove(dir.as_ref());
    }
}

impl DirectoryLister for MemoryLister {
    fn enumerate(&self, dir: &Path) -> CoreResult<Vec<RawEntry>> {
        self.dirs
            .borrow()
            .get(dir)
            .cloned()
            .ok_or_else(|| CoreError::NotFound(dir.to_path_buf()))
    }
}

/// Shortcut targets keyed by shortcut path.
#[derive(Debug, Clone, Default)]
pub(crate) struct MemoryResolver {
    targets: Rc<RefCell<HashMap<PathBuf, PathBuf>>>,
}

impl MemoryResolver {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn set(&self, shortcut: impl Into<PathBuf>, target: impl Into<PathBuf>) {
        self.targets
            .borrow_mut()
            .insert(shortcut.into(), target.into());
    }
}

impl ShortcutResolver for MemoryResolver {
    fn resolve_shortcut(&self, path: &Path) -> CoreResult<ShortcutTarget> {
        let target = self
            .targets
            .borrow()
            .get(path)
            .cloned()
            .ok_or_else(|| CoreError::NotFound(path.to_path_buf()))?;
        Ok(ShortcutTarget {
            target_path: target,
            working_dir: path.parent().map(Path::to_path_buf),
            arguments: String::new(),
            show_state: ShowState::Normal,
        })
    }
}

#[derive(Debug, Default)]
struct WatchLog {
    issued: Vec<PathBuf>,
    cancels: usize,
    active: bool,
    pending: usize,
    fail_next: bool,
}

/// A [`WatchHandle`] whose changes are triggered by the test.
#[derive(Debug, Clone, Default)]
pub(crate) struct ManualWatch {
    log: Rc<RefCell<WatchLog>>,
}

impl ManualWatch {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Simulates a change in the watched directory.
    pub(crate) fn signal(&self) {
        self.log.borrow_mut().pending += 1;
    }

    pub(crate) fn fail_next_issue(&self) {
        self.log.borrow_mut().fail_next = true;
    }

    /// Every successful `issue`, in order.
    pub(crate) fn issued(&self) -> Vec<PathBuf> {
        self.log.borrow().issued.clone()
    }

    pub(crate) fn cancels(&self) -> usize {
        self.log.borrow().cancels
    }
}

impl WatchHandle for ManualWatch {
    fn issue(&mut self, dir: &Path) -> CoreResult<()> {
        let mut log = self.log.borrow_mut();
        if log.fail_next {
            log.fail_next = false;
            return Err(CoreError::Watch(format!("refused {}", dir.display())));
        }
        log.issued.push(dir.to_path_buf());
        log.active = true;
        Ok(())
    }

    fn poll(&mut self) -> Option<ChangeEvent> {
        let mut log = self.log.borrow_mut();
        if !log.active || log.pending == 0 {
            return None;
        }
        log.pending = 0;
        Some(ChangeEvent::default())
    }

    fn cancel(&mut self) {
        let mut log = self.log.borrow_mut();
        log.cancels += 1;
        log.active = false;
    }
}

/// A [`FileOpExecutor`] that runs each request on its own thread and only
/// records it.
#[derive(Debug, Clone, Default)]
pub(crate) struct ThreadExecutor {
    requests: Arc<Mutex<Vec<FileOpRequest>>>,
    workers: Arc<Mutex<Vec<JoinHandle<()>>>>,
    refuse: Option<String>,
    silent: bool,
    report: Option<CommandSender>,
}

impl ThreadExecutor {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Refuses every request with `reason`.
    pub(crate) fn failing(reason: &str) -> Self {
        Self {
            refuse: Some(reason.to_string()),
            ..Self::default()
        }
    }

    /// Drops every request without signalling.
    pub(crate) fn silent() -> Self {
        Self {
            silent: true,
            ..Self::default()
        }
    }

    /// On completion, asks the view to select the pasted paths and refresh.
    pub(crate) fn reporting_to(mut self, tx: CommandSender) -> Self {
        self.report = Some(tx);
        self
    }

    pub(crate) fn requests(&self) -> Vec<FileOpRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Waits for every worker to finish.
    pub(crate) fn join(&self) {
        let workers: Vec<_> = self.workers.lock().unwrap().drain(..).collect();
        for worker in workers {
            worker.join().unwrap();
        }
    }
}

impl FileOpExecutor for ThreadExecutor {
    fn enqueue(&self, request: FileOpRequest, started: StartSignal) {
        let requests = Arc::clone(&self.requests);
        let refuse = self.refuse.clone();
        let silent = self.silent;
        let report = self.report.clone();

        let worker = std::thread::spawn(move || {
            if silent {
                drop(started);
                return;
            }
            if let Some(reason) = refuse {
                started.failed(reason);
                return;
            }
            requests.lock().unwrap().push(request.clone());
            started.started();

            if let Some(tx) = report {
                let pasted: Vec<PathBuf> = match &request.destination {
                    Some(dest) => request
                        .items
                        .iter()
                        .filter_map(|(_, path)| path.file_name().map(|n| dest.join(n)))
                        .collect(),
                    None => Vec::new(),
                };
                let _ = tx.send(ViewCommand::SelectPaths(pasted));
                let _ = tx.send(ViewCommand::Refresh(ScanActions::FULL_REFRESH));
            }
        });
        self.workers.lock().unwrap().push(worker);
    }
}
