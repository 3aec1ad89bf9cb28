//! Configuration management.
//!
//! Scanning, refresh and bulk-rename preferences ([`settings::Config`]) are
//! stored as a TOML file and loaded when a view is created.

pub mod settings;

pub use settings::{Config, GeneralConfig, RefreshConfig, RenameConfig};
