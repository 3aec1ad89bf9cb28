//! Text and kind filtering for directory entries.
//!
//! A filter pass recomputes `is_filtered_out` and the highlight span of every
//! entry from scratch; nothing is carried over from the previous pass.

use regex::{Regex, RegexBuilder};

use crate::fs::entry::{EntryKind, EntryView};

/// How the filter text is matched against entry names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterMode {
    /// Substring search.
    #[default]
    Contains,
    /// Full match of a regular expression against the whole name.
    Regex,
}

impl FilterMode {
    /// Stable numeric code used by the persisted view state.
    pub fn code(self) -> u8 {
        match self {
            FilterMode::Contains => 0,
            FilterMode::Regex => 1,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(FilterMode::Contains),
            1 => Some(FilterMode::Regex),
            _ => None,
        }
    }
}

/// Whether matching entries are kept or hidden.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Polarity {
    /// Keep entries that match, hide the rest.
    #[default]
    ShowMatching,
    /// Hide entries that match, keep the rest.
    HideMatching,
}

impl Polarity {
    pub fn shows_matching(self) -> bool {
        self == Polarity::ShowMatching
    }
}

/// Per-kind visibility switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KindVisibility {
    pub directories: bool,
    pub files: bool,
    pub symlink_directories: bool,
    pub symlink_files: bool,
    pub invalid_symlinks: bool,
}

impl Default for KindVisibility {
    fn default() -> Self {
        Self {
            directories: true,
            files: true,
            symlink_directories: true,
            symlink_files: true,
            invalid_symlinks: true,
        }
    }
}

impl KindVisibility {
    pub fn shows(&self, kind: EntryKind) -> bool {
        match kind {
            EntryKind::Directory => self.directories,
            EntryKind::File => self.files,
            EntryKind::SymlinkToDirectory => self.symlink_directories,
            EntryKind::SymlinkToFile => self.symlink_files,
            EntryKind::InvalidSymlink => self.invalid_symlinks,
        }
    }

    pub fn set(&mut self, kind: EntryKind, visible: bool) {
        let slot = match kind {
            EntryKind::Directory => &mut self.directories,
            EntryKind::File => &mut self.files,
            EntryKind::SymlinkToDirectory => &mut self.symlink_directories,
            EntryKind::SymlinkToFile => &mut self.symlink_files,
            EntryKind::InvalidSymlink => &mut self.invalid_symlinks,
        };
        *slot = visible;
    }
}

/// Compiled regex keyed on the source it was built from and its case
/// sensitivity. Only rebuilt when either changes.
#[derive(Debug, Clone, Default)]
struct RegexCache {
    key: Option<(String, bool)>,
    compiled: Option<Result<Regex, String>>,
}

impl RegexCache {
    fn get(&mut self, source: &str, case_sensitive: bool) -> Result<&Regex, String> {
        let fresh = matches!(&self.key, Some((s, cs)) if s == source && *cs == case_sensitive);
        if !fresh {
            let built = RegexBuilder::new(source)
                .case_insensitive(!case_sensitive)
                .build()
                .map_err(|e| e.to_string());
            self.key = Some((source.to_string(), case_sensitive));
            self.compiled = Some(built);
        }
        match &self.compiled {
            Some(Ok(re)) => Ok(re),
            Some(Err(msg)) => Err(msg.clone()),
            None => Err("regex not compiled".to_string()),
        }
    }
}

/// Everything a filter pass needs.
#[derive(Debug, Clone, Default)]
pub struct FilterConfig {
    pub text: String,
    pub mode: FilterMode,
    pub case_sensitive: bool,
    pub polarity: Polarity,
    pub visibility: KindVisibility,
    regex: RegexCache,
}

impl PartialEq for FilterConfig {
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text
            && self.mode == other.mode
            && self.case_sensitive == other.case_sensitive
            && self.polarity == other.polarity
            && self.visibility == other.visibility
    }
}

impl FilterConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restores every switch to its default and clears the text.
    pub fn reset(&mut self) {
        *self = Self {
            regex: std::mem::take(&mut self.regex),
            ..Self::default()
        };
    }
}

/// Result of one filter pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterOutcome {
    /// Number of entries hidden by this pass.
    pub filtered_out: usize,
    /// User-visible message when the regex failed to compile.
    pub error: Option<String>,
}

/// Recomputes `is_filtered_out` and the highlight of every entry.
///
/// Kind visibility is applied first; invisible kinds are hidden regardless of
/// the text. If the regex fails to compile, the text part of the filter is
/// skipped for the whole pass (entries are filtered by kind only) and the
/// compile error is reported in [`FilterOutcome::error`].
pub fn apply_filter(entries: &mut [EntryView], config: &mut FilterConfig) -> FilterOutcome {
    let mut outcome = FilterOutcome::default();

    let FilterConfig {
        text,
        mode,
        case_sensitive,
        polarity,
        visibility,
        regex,
    } = config;

    // Case-insensitive `contains` runs through an escaped, unanchored regex.
    let source = match (*mode, text.is_empty(), *case_sensitive) {
        (_, true, _) | (FilterMode::Contains, false, true) => None,
        (FilterMode::Contains, false, false) => Some(regex::escape(text)),
        (FilterMode::Regex, false, _) => Some(format!("^(?:{text})$")),
    };
    let regex = match source {
        Some(source) => match regex.get(&source, *case_sensitive) {
            Ok(re) => Some(re),
            Err(msg) => {
                tracing::debug!("filter regex {text:?} failed to compile: {msg}");
                outcome.error = Some(msg);
                None
            }
        },
        None => None,
    };

    for view in entries.iter_mut() {
        let kind_visible = visibility.shows(view.entry.kind());
        view.is_filtered_out = !kind_visible;
        view.clear_highlight();

        if !kind_visible || text.is_empty() {
            continue;
        }

        let name = view.entry.name();
        let hit = match (*mode, regex) {
            (FilterMode::Contains, None) => {
                name.find(text.as_str()).map(|start| (start, text.len()))
            }
            (FilterMode::Contains, Some(re)) => re.find(name).map(|m| (m.start(), m.len())),
            (FilterMode::Regex, Some(re)) => re.is_match(name).then_some((0, name.len())),
            (FilterMode::Regex, None) => continue,
        };

        view.is_filtered_out = polarity.shows_matching() != hit.is_some();

        if let (false, true, Some((start, len))) =
            (view.is_filtered_out, polarity.shows_matching(), hit)
        {
            view.highlight_start = start;
            view.highlight_len = len;
        }
    }

    outcome.filtered_out = entries.iter().filter(|v| v.is_filtered_out).count();
    outcome
}
