//! Commands posted to a view from outside its update loop.
//!
//! Background work (file-operation completion callbacks in particular) must
//! not touch a view directly. Instead it sends [`ViewCommand`]s through a
//! cloned [`CommandSender`]; the view drains the queue without blocking at
//! the start of its next update cycle.

use std::path::PathBuf;

use tokio::sync::mpsc::{self, error::TryRecvError, UnboundedReceiver, UnboundedSender};

use crate::fs::scan::ScanActions;

/// A request for a view, processed on the view's own thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewCommand {
    /// Select these paths if they show up in the next filesystem scan.
    SelectPaths(Vec<PathBuf>),
    /// Run an update cycle with the given stages.
    Refresh(ScanActions),
    /// Clear every cut marker (a move finished or was abandoned).
    Uncut,
}

/// Sending half of a view's command queue. Cheap to clone; can be moved to
/// any thread.
pub type CommandSender = UnboundedSender<ViewCommand>;

/// Receiving half, owned by the view.
pub type CommandReceiver = UnboundedReceiver<ViewCommand>;

pub fn command_channel() -> (CommandSender, CommandReceiver) {
    mpsc::unbounded_channel()
}

/// Everything found in the queue by one [`drain`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DrainedCommands {
    pub select_next: Vec<PathBuf>,
    /// Union of every refresh request, if any arrived.
    pub refresh: Option<ScanActions>,
    pub uncut: bool,
}

/// Takes every pending command without blocking.
pub fn drain(rx: &mut CommandReceiver) -> DrainedCommands {
    let mut drained = DrainedCommands::default();
    loop {
        match rx.try_recv() {
            Ok(ViewCommand::SelectPaths(paths)) => drained.select_next.extend(paths),
            Ok(ViewCommand::Refresh(actions)) => {
                drained.refresh = Some(match drained.refresh {
                    Some(prev) => prev.union(actions),
                    None => actions,
                });
            }
            Ok(ViewCommand::Uncut) => drained.uncut = true,
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
        }
    }
    drained
}
