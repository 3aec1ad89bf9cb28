//! Change notification for the directory a view is showing.
//!
//! A [`WatchHandle`] is a non-blocking subscription to changes in one
//! directory. [`ChangeWatch`] drives it once per update cycle and decides,
//! according to the [`RefreshPolicy`], whether the view should re-scan now,
//! later (debounced) or just be flagged as stale.

pub mod native;

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::error::CoreResult;

pub use native::NotifyWatchHandle;

/// Default quiet period between the last scan and an automatic refresh.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(250);

/// What happens when the watched directory changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RefreshPolicy {
    /// Never subscribe; refresh only on explicit request.
    Manual,
    /// Subscribe and flag the view as stale on change.
    Notify,
    /// Subscribe and re-scan (debounced) on change.
    #[default]
    Automatic,
}

/// A completed change notification.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeEvent {
    /// Paths reported by the platform, when it reports any.
    pub paths: Vec<PathBuf>,
}

/// An asynchronous, non-recursive subscription to changes (create, delete,
/// rename, size, write time) in one directory.
pub trait WatchHandle {
    /// Starts, or re-arms, the subscription on `dir`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::CoreError::Watch`] if the platform refuses the
    /// subscription.
    fn issue(&mut self, dir: &Path) -> CoreResult<()>;

    /// Returns a change if one completed since the last poll. Never blocks.
    fn poll(&mut self) -> Option<ChangeEvent>;

    /// Drops the subscription. Safe to call when nothing is issued.
    fn cancel(&mut self);
}

/// Observable state of a [`ChangeWatch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchState {
    Unwatched,
    WatchIssued,
    ChangePendingRefresh,
}

/// The per-view change-watch state machine.
///
/// Holds at most one in-flight subscription. Moving the view to another
/// directory cancels it, and the next cycle issues a fresh one.
pub struct ChangeWatch {
    handle: Box<dyn WatchHandle>,
    issued_target: Option<PathBuf>,
    pending_since: Option<Instant>,
    stale: bool,
    debounce: Duration,
}

impl std::fmt::Debug for ChangeWatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeWatch")
            .field("issued_target", &self.issued_target)
            .field("pending_since", &self.pending_since)
            .field("stale", &self.stale)
            .field("debounce", &self.debounce)
            .finish_non_exhaustive()
    }
}

impl ChangeWatch {
    pub fn new(handle: Box<dyn WatchHandle>, debounce: Duration) -> Self {
        Self {
            handle,
            issued_target: None,
            pending_since: None,
            stale: false,
            debounce,
        }
    }

    pub fn state(&self) -> WatchState {
        if self.pending_since.is_some() {
            WatchState::ChangePendingRefresh
        } else if self.issued_target.is_some() {
            WatchState::WatchIssued
        } else {
            WatchState::Unwatched
        }
    }

    /// The directory the current subscription was issued for.
    pub fn target(&self) -> Option<&Path> {
        self.issued_target.as_deref()
    }

    /// `true` once a change arrived under [`RefreshPolicy::Notify`] and the
    /// view has not been refreshed since.
    pub fn is_stale(&self) -> bool {
        self.stale
    }

    /// Called after every successful filesystem query.
    pub fn mark_refreshed(&mut self) {
        self.stale = false;
    }

    /// Cancels any subscription and forgets pending work.
    pub fn reset(&mut self) {
        if self.issued_target.take().is_some() {
            self.handle.cancel();
        }
        self.pending_since = None;
        self.stale = false;
    }

    /// Runs one cycle. Returns `true` when the caller should perform a full
    /// refresh now.
    ///
    /// `last_scan` is the time of the last completed filesystem query; a
    /// pending refresh fires only once `debounce` has elapsed since then, so
    /// a burst of change events collapses into one refresh.
    pub fn tick(
        &mut self,
        policy: RefreshPolicy,
        cwd: &Path,
        cwd_exists: bool,
        last_scan: Option<Instant>,
        now: Instant,
    ) -> bool {
        if policy == RefreshPolicy::Manual {
            if self.issued_target.is_some() || self.pending_since.is_some() {
                tracing::debug!("refresh policy is manual, dropping change watch");
                self.reset();
            }
            return false;
        }
        if !cwd_exists {
            return false;
        }

        if self.pending_since.is_some() {
            let quiet = last_scan.map_or(true, |t| now.saturating_duration_since(t) >= self.debounce);
            if quiet {
                self.pending_since = None;
                tracing::debug!("debounced refresh of {}", cwd.display());
                return true;
            }
        }

        match &self.issued_target {
            Some(target) if target != cwd => {
                tracing::debug!(
                    "watched {} but view moved to {}, cancelling",
                    target.display(),
                    cwd.display()
                );
                self.handle.cancel();
                self.issued_target = None;
            }
            Some(_) => {
                if let Some(event) = self.handle.poll() {
                    tracing::debug!(
                        "change in {} ({} paths reported)",
                        cwd.display(),
                        event.paths.len()
                    );
                    match policy {
                        RefreshPolicy::Automatic => {
                            self.issue(cwd);
                            if self.pending_since.is_none() {
                                self.pending_since = Some(now);
                            }
                        }
                        RefreshPolicy::Notify => {
                            self.stale = true;
                            self.issue(cwd);
                        }
                        RefreshPolicy::Manual => {}
                    }
                }
            }
            None => self.issue(cwd),
        }

        false
    }

    fn issue(&mut self, cwd: &Path) {
        match self.handle.issue(cwd) {
            Ok(()) => self.issued_target = Some(cwd.to_path_buf()),
            Err(err) => {
                tracing::warn!("could not watch {}: {err}", cwd.display());
                self.issued_target = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ManualWatch;

    const MS: Duration = Duration::from_millis(1);

    fn setup() -> (ChangeWatch, ManualWatch) {
        let handle = ManualWatch::new();
        (
            ChangeWatch::new(Box::new(handle.clone()), DEFAULT_DEBOUNCE),
            handle,
        )
    }

    #[test]
    fn first_cycle_issues_subscription() {
        let (mut watch, handle) = setup();
        let now = Instant::now();

        assert_eq!(watch.state(), WatchState::Unwatched);
        let refresh = watch.tick(RefreshPolicy::Automatic, Path::new("/a"), true, None, now);

        assert!(!refresh);
        assert_eq!(watch.state(), WatchState::WatchIssued);
        assert_eq!(watch.target(), Some(Path::new("/a")));
        assert_eq!(handle.issued(), vec![PathBuf::from("/a")]);
    }

    #[test]
    fn manual_policy_never_subscribes() {
        let (mut watch, handle) = setup();
        let now = Instant::now();
        for _ in 0..3 {
            assert!(!watch.tick(RefreshPolicy::Manual, Path::new("/a"), true, None, now));
        }
        assert_eq!(watch.state(), WatchState::Unwatched);
        assert!(handle.issued().is_empty());
    }

    #[test]
    fn switching_to_manual_cancels() {
        let (mut watch, handle) = setup();
        let now = Instant::now();
        watch.tick(RefreshPolicy::Automatic, Path::new("/a"), true, None, now);
        watch.tick(RefreshPolicy::Manual, Path::new("/a"), true, None, now);
        assert_eq!(watch.state(), WatchState::Unwatched);
        assert_eq!(handle.cancels(), 1);
    }

    #[test]
    fn missing_directory_is_not_watched() {
        let (mut watch, handle) = setup();
        watch.tick(RefreshPolicy::Automatic, Path::new("/gone"), false, None, Instant::now());
        assert!(handle.issued().is_empty());
    }

    #[test]
    fn no_change_stays_issued() {
        let (mut watch, handle) = setup();
        let now = Instant::now();
        watch.tick(RefreshPolicy::Automatic, Path::new("/a"), true, None, now);
        for _ in 0..5 {
            assert!(!watch.tick(RefreshPolicy::Automatic, Path::new("/a"), true, None, now));
        }
        assert_eq!(watch.state(), WatchState::WatchIssued);
        assert_eq!(handle.issued().len(), 1);
    }

    #[test]
    fn path_change_cancels_then_reissues() {
        let (mut watch, handle) = setup();
        let now = Instant::now();
        watch.tick(RefreshPolicy::Automatic, Path::new("/a"), true, None, now);

        watch.tick(RefreshPolicy::Automatic, Path::new("/b"), true, None, now);
        assert_eq!(watch.state(), WatchState::Unwatched);
        assert_eq!(handle.cancels(), 1);

        watch.tick(RefreshPolicy::Automatic, Path::new("/b"), true, None, now);
        assert_eq!(watch.target(), Some(Path::new("/b")));
        assert_eq!(
            handle.issued(),
            vec![PathBuf::from("/a"), PathBuf::from("/b")]
        );
    }

    #[test]
    fn automatic_change_is_debounced() {
        let (mut watch, handle) = setup();
        let start = Instant::now();
        let cwd = Path::new("/a");
        let last_scan = Some(start);

        watch.tick(RefreshPolicy::Automatic, cwd, true, last_scan, start);
        handle.signal();

        // Change observed: reissue and go pending.
        let t1 = start + 10 * MS;
        assert!(!watch.tick(RefreshPolicy::Automatic, cwd, true, last_scan, t1));
        assert_eq!(watch.state(), WatchState::ChangePendingRefresh);
        assert_eq!(handle.issued().len(), 2);

        // More changes inside the window do not stack.
        handle.signal();
        let t2 = start + 100 * MS;
        assert!(!watch.tick(RefreshPolicy::Automatic, cwd, true, last_scan, t2));
        assert_eq!(watch.state(), WatchState::ChangePendingRefresh);

        // Quiet period elapsed since the last scan.
        let t3 = start + 250 * MS;
        assert!(watch.tick(RefreshPolicy::Automatic, cwd, true, last_scan, t3));
        assert_eq!(watch.state(), WatchState::WatchIssued);

        // Nothing more pending.
        assert!(!watch.tick(RefreshPolicy::Automatic, cwd, true, Some(t3), t3 + 500 * MS));
    }

    #[test]
    fn pending_refresh_fires_immediately_without_previous_scan() {
        let (mut watch, handle) = setup();
        let now = Instant::now();
        let cwd = Path::new("/a");
        watch.tick(RefreshPolicy::Automatic, cwd, true, None, now);
        handle.signal();
        watch.tick(RefreshPolicy::Automatic, cwd, true, None, now);
        assert!(watch.tick(RefreshPolicy::Automatic, cwd, true, None, now));
    }

    #[test]
    fn notify_policy_flags_stale_without_refresh() {
        let (mut watch, handle) = setup();
        let now = Instant::now();
        let cwd = Path::new("/a");
        watch.tick(RefreshPolicy::Notify, cwd, true, None, now);
        handle.signal();

        assert!(!watch.tick(RefreshPolicy::Notify, cwd, true, None, now));
        assert!(watch.is_stale());
        assert_eq!(watch.state(), WatchState::WatchIssued);
        assert_eq!(handle.issued().len(), 2);

        for _ in 0..3 {
            assert!(!watch.tick(RefreshPolicy::Notify, cwd, true, None, now + 1000 * MS));
        }

        watch.mark_refreshed();
        assert!(!watch.is_stale());
    }

    #[test]
    fn failed_issue_retries_next_cycle() {
        let (mut watch, handle) = setup();
        let now = Instant::now();
        handle.fail_next_issue();

        watch.tick(RefreshPolicy::Automatic, Path::new("/a"), true, None, now);
        assert_eq!(watch.state(), WatchState::Unwatched);

        watch.tick(RefreshPolicy::Automatic, Path::new("/a"), true, None, now);
        assert_eq!(watch.state(), WatchState::WatchIssued);
    }

    #[test]
    fn reset_cancels_and_clears() {
        let (mut watch, handle) = setup();
        let now = Instant::now();
        watch.tick(RefreshPolicy::Automatic, Path::new("/a"), true, None, now);
        handle.signal();
        watch.tick(RefreshPolicy::Automatic, Path::new("/a"), true, Some(now), now);
        assert_eq!(watch.state(), WatchState::ChangePendingRefresh);

        watch.reset();

        assert_eq!(watch.state(), WatchState::Unwatched);
        assert_eq!(handle.cancels(), 1);
    }

    #[test]
    fn policy_deserializes_lowercase() {
        #[derive(Deserialize)]
        struct Wrapper {
            policy: RefreshPolicy,
        }
        let w: Wrapper = toml::from_str("policy = \"notify\"").unwrap();
        assert_eq!(w.policy, RefreshPolicy::Notify);
        assert_eq!(RefreshPolicy::default(), RefreshPolicy::Automatic);
    }
}
