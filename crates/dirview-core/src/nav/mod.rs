//! Navigation logic.
//!
//! The [`store::EntryStore`] composes [`filter`]ing and [`sort`]ing over the
//! entries of one directory; [`history::History`] tracks where a view has
//! been.

pub mod filter;
pub mod history;
pub mod sort;
pub mod store;
