//! dirview core library: UI-agnostic directory views and bulk renaming.
//!
//! `dirview-core` keeps a filtered, sorted, in-memory projection of one
//! directory in step with the real filesystem, carries multi-selection
//! across re-scans, decides when to re-scan from change notifications, and
//! compiles and runs a small pattern language for collision-checked bulk
//! renames. It never renders anything and never mutates the filesystem
//! itself: destructive work is planned here and handed to an external
//! executor.
//!
//! # Modules
//!
//! - [`view`]: [`DirectoryView`], the context object a frontend drives.
//! - [`fs`]: entries, the scanner, listing collaborators and file-op planning.
//! - [`nav`]: entry store, filtering, sorting and navigation history.
//! - [`watch`]: the change-watch state machine and its `notify` adapter.
//! - [`rename`]: pattern compiler, transformer, planner and collision check.
//! - [`persist`]: saving and restoring per-view state.
//! - [`config`]: TOML-based settings.
//! - [`event`]: commands posted to a view from other threads.
//! - [`error`]: unified error type ([`CoreError`]) and result alias ([`CoreResult`]).

pub mod config;
pub mod error;
pub mod event;
pub mod fs;
pub mod nav;
pub mod persist;
pub mod rename;
pub mod view;
pub mod watch;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::Config;
pub use error::{CoreError, CoreResult};
pub use event::{CommandSender, ViewCommand};
pub use fs::entry::{DirectoryEntry, EntryKind, EntryView};
pub use fs::lister::{DirectoryLister, RawEntry, ShortcutResolver, ShortcutTarget};
pub use fs::ops::{FileOpExecutor, FileOpKind, FileOpPayload, FileOpRequest, StartSignal};
pub use fs::scan::{ScanActions, ScanOptions, Scanner};
pub use nav::filter::{apply_filter, FilterConfig, FilterMode, Polarity};
pub use nav::history::History;
pub use nav::sort::{sort_entries, SortColumn, SortDirection, SortSpec};
pub use nav::store::EntryStore;
pub use persist::ViewState;
pub use rename::{
    compile_pattern, find_collisions, plan_bulk_rename, transform, Collision, CompiledPattern,
    RenameOp, RenamePlan,
};
pub use view::DirectoryView;
pub use watch::{ChangeEvent, RefreshPolicy, WatchHandle, WatchState};

/// Normalises a string to NFC (composed) form.
///
/// macOS stores filenames in NFD (decomposed), which makes accented and
/// Hangul names compare unequal to what users type. This re-composes them.
pub fn nfc_string(s: &str) -> String {
    use unicode_normalization::UnicodeNormalization;
    s.nfc().collect()
}
