//! View configuration loaded from a TOML file.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::fs::scan::ScanOptions;
use crate::nav::history::DEFAULT_MAX_HISTORY;
use crate::rename::{RenameOptions, DEFAULT_CAPACITY};
use crate::watch::RefreshPolicy;

/// Top-level configuration.
///
/// All fields have defaults, so an empty file (or no file at all, via
/// [`Config::default`]) is valid. Call [`Config::load`] to read from a TOML
/// path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub refresh: RefreshConfig,
    #[serde(default)]
    pub rename: RenameConfig,
}

impl Config {
    /// Loads configuration from a TOML file at `path`.
    ///
    /// # Errors
    ///
    /// - [`CoreError::NotFound`] if the file does not exist.
    /// - [`CoreError::PermissionDenied`] if the file is not readable.
    /// - [`CoreError::ConfigParse`] if the TOML is malformed.
    pub fn load(path: &Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| CoreError::from_io(e, path))?;
        toml::from_str(&content).map_err(|e| CoreError::ConfigParse(e.to_string()))
    }
}

/// Scanning and navigation preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneralConfig {
    #[serde(default = "default_true")]
    pub show_dotdot_dir: bool,
    /// Follow shortcut-like files to classify their targets.
    #[serde(default = "default_true")]
    pub resolve_shortcuts: bool,
    #[serde(default)]
    pub clear_filter_on_cwd_change: bool,
    #[serde(default = "default_max_history")]
    pub max_history: usize,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            show_dotdot_dir: true,
            resolve_shortcuts: true,
            clear_filter_on_cwd_change: false,
            max_history: DEFAULT_MAX_HISTORY,
        }
    }
}

impl GeneralConfig {
    pub fn scan_options(&self) -> ScanOptions {
        ScanOptions {
            show_dotdot_dir: self.show_dotdot_dir,
            resolve_shortcuts: self.resolve_shortcuts,
        }
    }
}

/// Change-watch behavior.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshConfig {
    #[serde(default)]
    pub policy: RefreshPolicy,
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            policy: RefreshPolicy::default(),
            debounce_ms: default_debounce_ms(),
        }
    }
}

impl RefreshConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

/// Bulk-rename defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenameConfig {
    #[serde(default)]
    pub squish_adjacent_spaces: bool,
    /// Longest generated name, in bytes.
    #[serde(default = "default_max_name_len")]
    pub max_name_len: usize,
    #[serde(default = "default_one")]
    pub counter_start: i64,
    #[serde(default = "default_one")]
    pub counter_step: i64,
}

impl Default for RenameConfig {
    fn default() -> Self {
        Self {
            squish_adjacent_spaces: false,
            max_name_len: DEFAULT_CAPACITY,
            counter_start: 1,
            counter_step: 1,
        }
    }
}

impl From<&RenameConfig> for RenameOptions {
    fn from(config: &RenameConfig) -> Self {
        Self {
            capacity: config.max_name_len,
            counter_start: config.counter_start,
            counter_step: config.counter_step,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_max_history() -> usize {
    DEFAULT_MAX_HISTORY
}

fn default_debounce_ms() -> u64 {
    250
}

fn default_max_name_len() -> usize {
    DEFAULT_CAPACITY
}

fn default_one() -> i64 {
    1
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn default_config_general() {
        let config = Config::default();

        assert!(config.general.show_dotdot_dir);
        assert!(config.general.resolve_shortcuts);
        assert!(!config.general.clear_filter_on_cwd_change);
        assert_eq!(config.general.max_history, 30);
    }

    #[test]
    fn default_config_refresh() {
        let config = Config::default();

        assert_eq!(config.refresh.policy, RefreshPolicy::Automatic);
        assert_eq!(config.refresh.debounce(), Duration::from_millis(250));
    }

    #[test]
    fn default_config_rename() {
        let config = Config::default();

        assert!(!config.rename.squish_adjacent_spaces);
        assert_eq!(config.rename.max_name_len, 255);
        assert_eq!(
            RenameOptions::from(&config.rename),
            RenameOptions::default()
        );
    }

    #[test]
    fn load_full_toml() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(
            &path,
            r#"
[general]
show_dotdot_dir = false
resolve_shortcuts = false
clear_filter_on_cwd_change = true
max_history = 5

[refresh]
policy = "notify"
debounce_ms = 500

[rename]
squish_adjacent_spaces = true
max_name_len = 100
counter_start = 0
counter_step = 10
"#,
        )
        .unwrap();

        let config = Config::load(&path).unwrap();

        assert!(!config.general.show_dotdot_dir);
        assert!(!config.general.resolve_shortcuts);
        assert!(config.general.clear_filter_on_cwd_change);
        assert_eq!(config.general.max_history, 5);
        assert_eq!(
            config.general.scan_options(),
            ScanOptions {
                show_dotdot_dir: false,
                resolve_shortcuts: false,
            }
        );

        assert_eq!(config.refresh.policy, RefreshPolicy::Notify);
        assert_eq!(config.refresh.debounce(), Duration::from_millis(500));

        assert!(config.rename.squish_adjacent_spaces);
        let options = RenameOptions::from(&config.rename);
        assert_eq!(options.capacity, 100);
        assert_eq!(options.counter_start, 0);
        assert_eq!(options.counter_step, 10);
    }

    #[test]
    fn load_partial_toml_uses_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(
            &path,
            r#"
[refresh]
policy = "manual"
"#,
        )
        .unwrap();

        let config = Config::load(&path).unwrap();

        assert_eq!(config.refresh.policy, RefreshPolicy::Manual);
        assert_eq!(config.refresh.debounce_ms, 250);
        assert!(config.general.show_dotdot_dir);
        assert_eq!(config.rename, RenameConfig::default());
    }

    #[test]
    fn load_empty_toml_uses_all_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(&path, "").unwrap();

        assert_eq!(Config::load(&path).unwrap(), Config::default());
    }

    #[test]
    fn load_nonexistent_returns_not_found() {
        let tmp = TempDir::new().unwrap();
        let result = Config::load(&tmp.path().join("nonexistent.toml"));
        assert!(matches!(result.unwrap_err(), CoreError::NotFound(_)));
    }

    #[test]
    fn load_invalid_toml_returns_config_parse() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(&path, "this is not valid [[[toml").unwrap();

        let result = Config::load(&path);
        assert!(matches!(result.unwrap_err(), CoreError::ConfigParse(_)));
    }

    #[test]
    fn unknown_policy_is_a_parse_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(&path, "[refresh]\npolicy = \"sometimes\"\n").unwrap();

        assert!(matches!(
            Config::load(&path).unwrap_err(),
            CoreError::ConfigParse(_)
        ));
    }

    #[test]
    fn config_round_trips_through_toml() {
        let mut config = Config::default();
        config.refresh.policy = RefreshPolicy::Notify;
        config.rename.counter_step = 3;

        let text = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();

        assert_eq!(parsed, config);
    }
}
