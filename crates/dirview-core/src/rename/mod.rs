//! Bulk rename: pattern compiler, transformer, planner and collision check.
//!
//! The usual flow is [`compile_pattern`] once, [`plan_bulk_rename`] over the
//! current entries, then [`RenamePlan::collisions`] before handing the
//! surviving renames to whatever performs them.

pub mod collision;
pub mod pattern;
pub mod plan;
pub mod transform;

pub use collision::{find_collisions, Collision, RenameOp};
pub use pattern::{compile_pattern, CompiledPattern, Op, PatternError};
pub use plan::{plan_bulk_rename, RenameFailure, RenameOptions, RenamePlan};
pub use transform::{transform, TransformContext, TransformError, DEFAULT_CAPACITY};
