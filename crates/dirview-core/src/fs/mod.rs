//! File system side of a directory view.
//!
//! [`entry`] holds the entry types, [`lister`] the enumeration and shortcut
//! collaborators (plus their `std::fs` adapters), [`scan`] the scanner that
//! rebuilds an entry store from them, and [`ops`] the planning of cut, copy,
//! paste and delete for an external executor.

pub mod entry;
pub mod lister;
pub mod ops;
pub mod scan;
