//! One directory view: the context object every operation runs against.
//!
//! A [`DirectoryView`] owns its entry store, filter, sort order, history and
//! change watch. Nothing is global, so any number of views can coexist (a
//! dual-pane frontend simply owns two). The frontend drives a view by
//! calling [`DirectoryView::tick`] once per update cycle and the explicit
//! operations in response to user input.

use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::config::{Config, RenameConfig};
use crate::error::CoreResult;
use crate::event::{command_channel, drain, CommandReceiver, CommandSender};
use crate::fs::lister::{DirectoryLister, ShortcutResolver, StdLister, SymlinkResolver};
use crate::fs::ops::{self, FileOpExecutor, FileOpPayload};
use crate::fs::scan::{ScanActions, ScanOptions, ScanStats, Scanner};
use crate::nav::filter::FilterConfig;
use crate::nav::history::History;
use crate::nav::sort::SortSpec;
use crate::nav::store::EntryStore;
use crate::persist::ViewState;
use crate::rename::{compile_pattern, plan_bulk_rename, RenameOptions, RenamePlan};
use crate::watch::{ChangeWatch, NotifyWatchHandle, RefreshPolicy, WatchHandle, WatchState};

pub struct DirectoryView {
    id: u32,
    cwd: PathBuf,
    cwd_exists: bool,
    store: EntryStore,
    filter: FilterConfig,
    filter_error: Option<String>,
    sort: SortSpec,
    history: History,
    watch: ChangeWatch,
    policy: RefreshPolicy,
    options: ScanOptions,
    clear_filter_on_cwd_change: bool,
    rename: RenameConfig,
    select_next: Vec<PathBuf>,
    commands: CommandReceiver,
    sender: CommandSender,
    stats: ScanStats,
    lister: Box<dyn DirectoryLister>,
    resolver: Box<dyn ShortcutResolver>,
}

impl DirectoryView {
    /// Creates an empty view with no current directory. Call
    /// [`DirectoryView::navigate`] or [`DirectoryView::restore`] next.
    pub fn new(
        id: u32,
        config: &Config,
        lister: Box<dyn DirectoryLister>,
        resolver: Box<dyn ShortcutResolver>,
        watch: Box<dyn WatchHandle>,
    ) -> Self {
        let (sender, commands) = command_channel();
        Self {
            id,
            cwd: PathBuf::new(),
            cwd_exists: false,
            store: EntryStore::new(),
            filter: FilterConfig::new(),
            filter_error: None,
            sort: SortSpec::default(),
            history: History::new(config.general.max_history),
            watch: ChangeWatch::new(watch, config.refresh.debounce()),
            policy: config.refresh.policy,
            options: config.general.scan_options(),
            clear_filter_on_cwd_change: config.general.clear_filter_on_cwd_change,
            rename: config.rename.clone(),
            select_next: Vec::new(),
            commands,
            sender,
            stats: ScanStats::default(),
            lister,
            resolver,
        }
    }

    /// A view backed by the real filesystem: `std::fs` enumeration, symlink
    /// resolution and native change notification.
    pub fn with_std(id: u32, config: &Config) -> Self {
        Self::new(
            id,
            config,
            Box::new(StdLister),
            Box::new(SymlinkResolver),
            Box::new(NotifyWatchHandle::new()),
        )
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Whether the last filesystem query of the current directory succeeded.
    pub fn cwd_exists(&self) -> bool {
        self.cwd_exists
    }

    pub fn store(&self) -> &EntryStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut EntryStore {
        &mut self.store
    }

    pub fn filter(&self) -> &FilterConfig {
        &self.filter
    }

    /// Changes take effect on the next update with `filter` set.
    pub fn filter_mut(&mut self) -> &mut FilterConfig {
        &mut self.filter
    }

    /// The regex compile error from the last filter pass, if any.
    pub fn filter_error(&self) -> Option<&str> {
        self.filter_error.as_deref()
    }

    pub fn sort_spec(&self) -> &SortSpec {
        &self.sort
    }

    /// Replaces the sort order and re-sorts.
    pub fn set_sort(&mut self, spec: SortSpec) {
        self.sort = spec;
        self.store.sort(&self.sort);
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn refresh_policy(&self) -> RefreshPolicy {
        self.policy
    }

    pub fn set_refresh_policy(&mut self, policy: RefreshPolicy) {
        self.policy = policy;
    }

    pub fn watch_state(&self) -> WatchState {
        self.watch.state()
    }

    /// `true` when the directory changed under [`RefreshPolicy::Notify`] and
    /// the view has not been refreshed since.
    pub fn is_stale(&self) -> bool {
        self.watch.is_stale()
    }

    pub fn stats(&self) -> &ScanStats {
        &self.stats
    }

    /// A handle for posting [`crate::event::ViewCommand`]s from other threads.
    pub fn command_sender(&self) -> CommandSender {
        self.sender.clone()
    }

    /// Runs the requested stages now. Returns `false` if a filesystem query
    /// was requested and the directory could not be listed.
    pub fn update_entries(&mut self, actions: ScanActions) -> bool {
        self.update_entries_at(actions, Instant::now())
    }

    pub(crate) fn update_entries_at(&mut self, actions: ScanActions, now: Instant) -> bool {
        let actions = match self.absorb_commands() {
            Some(requested) => actions.union(requested),
            None => actions,
        };
        self.run_update(actions, now)
    }

    /// One update cycle: applies queued commands, then lets the change watch
    /// decide whether to refresh. Returns `true` if entries were updated.
    pub fn tick(&mut self, now: Instant) -> bool {
        self.store.tick_spotlights();

        if let Some(actions) = self.absorb_commands() {
            self.run_update(actions, now);
            return true;
        }

        let refresh = self.watch.tick(
            self.policy,
            &self.cwd,
            self.cwd_exists,
            self.stats.last_scan,
            now,
        );
        if refresh {
            self.run_update(ScanActions::FULL_REFRESH, now);
        }
        refresh
    }

    /// Enters `path`, recording it in history on success.
    pub fn navigate(&mut self, path: impl Into<PathBuf>) -> bool {
        let path = path.into();
        let ok = self.enter(path.clone());
        if ok {
            self.history = self.history.push(path);
        }
        ok
    }

    /// Enters the parent directory. Returns `false` at the root.
    pub fn ascend(&mut self) -> bool {
        match self.cwd.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => {
                let parent = parent.to_path_buf();
                self.navigate(parent)
            }
            _ => false,
        }
    }

    /// Moves one step back in history. The position only moves if the
    /// earlier directory can still be listed.
    pub fn history_back(&mut self) -> bool {
        match self.history.go_back() {
            Some((history, path)) => self.enter_from_history(history, path),
            None => false,
        }
    }

    pub fn history_forward(&mut self) -> bool {
        match self.history.go_forward() {
            Some((history, path)) => self.enter_from_history(history, path),
            None => false,
        }
    }

    pub fn state(&self) -> ViewState {
        ViewState {
            cwd: self.cwd.clone(),
            filter: self.filter.clone(),
            history: self.history.clone(),
        }
    }

    /// Applies saved state and refreshes. Returns the result of the scan.
    pub fn restore(&mut self, state: ViewState) -> bool {
        let max = self.history.max();
        self.history = History::from_parts(
            state.history.items().to_vec(),
            state.history.position(),
            max,
        );
        self.filter = state.filter;
        self.cwd = state.cwd;
        self.watch.reset();
        self.update_entries(ScanActions::FULL_REFRESH)
    }

    /// Pastes `payload` into the current directory.
    ///
    /// # Errors
    ///
    /// See [`FileOpPayload::paste_into`].
    pub fn paste(&self, payload: &mut FileOpPayload, executor: &dyn FileOpExecutor) -> CoreResult<()> {
        payload.paste_into(&self.cwd, executor)
    }

    /// Requests deletion of the selected entries.
    ///
    /// # Errors
    ///
    /// See [`ops::delete_selected`].
    pub fn delete_selected(&self, executor: &dyn FileOpExecutor) -> CoreResult<usize> {
        ops::delete_selected(&self.store, executor)
    }

    /// Compiles `pattern` with the configured space squishing and plans
    /// renaming the selected entries.
    ///
    /// # Errors
    ///
    /// [`crate::CoreError::Pattern`] if the pattern does not compile.
    pub fn plan_rename(&self, pattern: &str) -> CoreResult<RenamePlan> {
        let compiled = compile_pattern(pattern, self.rename.squish_adjacent_spaces)?;
        Ok(plan_bulk_rename(
            self.store.entries(),
            &compiled,
            &RenameOptions::from(&self.rename),
        ))
    }

    fn enter_from_history(&mut self, history: History, path: PathBuf) -> bool {
        let ok = self.enter(path);
        if ok {
            self.history = history;
        }
        ok
    }

    /// Scans `path` as the new current directory. On failure `cwd` goes back
    /// to the previous directory and the store is left empty.
    fn enter(&mut self, path: PathBuf) -> bool {
        tracing::debug!("view {}: entering {}", self.id, path.display());
        if path != self.cwd {
            self.store.deselect_all();
            if self.clear_filter_on_cwd_change {
                self.filter.text.clear();
            }
        }
        let previous = std::mem::replace(&mut self.cwd, path);
        self.watch.reset();
        let ok = self.update_entries(ScanActions::FULL_REFRESH);
        if !ok {
            self.cwd = previous;
        }
        ok
    }

    /// Drains the command queue. Queued selections join `select_next`; the
    /// union of refresh requests is returned.
    fn absorb_commands(&mut self) -> Option<ScanActions> {
        let drained = drain(&mut self.commands);
        self.select_next.extend(drained.select_next);
        if drained.uncut {
            self.store.uncut();
        }
        drained.refresh
    }

    fn run_update(&mut self, actions: ScanActions, now: Instant) -> bool {
        let mut ok = true;

        if actions.query_filesystem {
            let scanner = Scanner::new(self.lister.as_ref(), self.resolver.as_ref(), self.options);
            ok = scanner.scan(
                &mut self.store,
                &self.cwd,
                &mut self.select_next,
                &mut self.stats,
                now,
            );
            self.cwd_exists = ok;
            if ok {
                self.watch.mark_refreshed();
            } else {
                tracing::debug!("view {}: {} is unavailable", self.id, self.cwd.display());
            }
        }

        if actions.filter {
            let outcome = self.store.filter(&mut self.filter);
            if let Some(err) = &outcome.error {
                tracing::debug!("view {}: filter error: {err}", self.id);
            }
            self.filter_error = outcome.error;
        }

        if actions.sort {
            self.store.sort(&self.sort);
        }

        ok
    }
}
