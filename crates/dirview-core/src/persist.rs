//! Saving and restoring per-view state.
//!
//! The format is line oriented. Free-form text is length prefixed so it may
//! contain spaces (or anything but invalid UTF-8):
//!
//! ```text
//! cwd 9 /home/bob
//! filter 4 .txt
//! filter_mode 0
//! filter_case_sensitive 0
//! filter_polarity 1
//! filter_show_directories 1
//! filter_show_symlink_directories 1
//! filter_show_files 1
//! filter_show_symlink_files 1
//! filter_show_invalid_symlinks 1
//! history_pos 1
//! history_len 2
//! 5 /home
//! 9 /home/bob
//! ```
//!
//! Flags are `0` or `1`. `filter_polarity` is `1` for "show matching".

use std::fmt::Write as _;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use crate::error::{CoreError, CoreResult};
use crate::nav::filter::{FilterConfig, FilterMode, Polarity};
use crate::nav::history::{History, DEFAULT_MAX_HISTORY};

/// Everything about a view that outlives the process.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewState {
    pub cwd: PathBuf,
    pub filter: FilterConfig,
    pub history: History,
}

impl ViewState {
    /// Renders the state in the persisted text format.
    ///
    /// # Errors
    ///
    /// [`CoreError::Persist`] if a path is not valid UTF-8.
    pub fn to_text(&self) -> CoreResult<String> {
        let mut out = String::new();
        let filter = &self.filter;
        let vis = &filter.visibility;

        push_text(&mut out, "cwd", path_str(&self.cwd)?);
        push_text(&mut out, "filter", &filter.text);
        push_number(&mut out, "filter_mode", u64::from(filter.mode.code()));
        push_flag(&mut out, "filter_case_sensitive", filter.case_sensitive);
        push_flag(&mut out, "filter_polarity", filter.polarity.shows_matching());
        push_flag(&mut out, "filter_show_directories", vis.directories);
        push_flag(&mut out, "filter_show_symlink_directories", vis.symlink_directories);
        push_flag(&mut out, "filter_show_files", vis.files);
        push_flag(&mut out, "filter_show_symlink_files", vis.symlink_files);
        push_flag(&mut out, "filter_show_invalid_symlinks", vis.invalid_symlinks);
        push_number(&mut out, "history_pos", self.history.position() as u64);
        push_number(&mut out, "history_len", self.history.items().len() as u64);
        for item in self.history.items() {
            let raw = path_str(item)?;
            let _ = writeln!(out, "{} {}", raw.len(), raw);
        }

        Ok(out)
    }

    /// Parses the persisted text format.
    ///
    /// # Errors
    ///
    /// [`CoreError::Persist`] naming the record that was expected.
    pub fn from_text(text: &str) -> CoreResult<Self> {
        let mut p = Parser { rest: text };

        let cwd = PathBuf::from(p.text("cwd")?);
        let mut filter = FilterConfig::new();
        filter.text = p.text("filter")?.to_string();
        let mode = p.number("filter_mode")?;
        filter.mode = u8::try_from(mode)
            .ok()
            .and_then(FilterMode::from_code)
            .ok_or_else(|| CoreError::Persist(format!("filter_mode: unknown mode {mode}")))?;
        filter.case_sensitive = p.flag("filter_case_sensitive")?;
        filter.polarity = if p.flag("filter_polarity")? {
            Polarity::ShowMatching
        } else {
            Polarity::HideMatching
        };
        filter.visibility.directories = p.flag("filter_show_directories")?;
        filter.visibility.symlink_directories = p.flag("filter_show_symlink_directories")?;
        filter.visibility.files = p.flag("filter_show_files")?;
        filter.visibility.symlink_files = p.flag("filter_show_symlink_files")?;
        filter.visibility.invalid_symlinks = p.flag("filter_show_invalid_symlinks")?;

        let pos = p.number("history_pos")? as usize;
        let len = p.number("history_len")? as usize;
        let mut items = Vec::with_capacity(len.min(1024));
        for i in 0..len {
            let raw = p
                .sized()
                .map_err(|e| CoreError::Persist(format!("history item {i}: {e}")))?;
            items.push(PathBuf::from(raw));
        }

        Ok(Self {
            cwd,
            filter,
            history: History::from_parts(items, pos, len.max(DEFAULT_MAX_HISTORY)),
        })
    }

    /// # Errors
    ///
    /// As [`ViewState::to_text`], plus [`CoreError::Io`] from `out`.
    pub fn write_to<W: Write>(&self, out: &mut W) -> CoreResult<()> {
        out.write_all(self.to_text()?.as_bytes())?;
        Ok(())
    }

    /// # Errors
    ///
    /// As [`ViewState::from_text`], plus [`CoreError::Io`] from `input`
    /// (including input that is not UTF-8).
    pub fn read_from<R: Read>(input: &mut R) -> CoreResult<Self> {
        let mut text = String::new();
        input.read_to_string(&mut text)?;
        Self::from_text(&text)
    }

    /// Writes the state to `path`, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// [`CoreError::Persist`] for unrepresentable paths, otherwise the I/O
    /// error mapped onto the most specific variant.
    pub fn save(&self, path: &Path) -> CoreResult<()> {
        let text = self.to_text()?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| CoreError::from_io(e, parent))?;
        }
        std::fs::write(path, text).map_err(|e| CoreError::from_io(e, path))?;
        tracing::debug!("saved view state to {}", path.display());
        Ok(())
    }

    /// # Errors
    ///
    /// [`CoreError::NotFound`] when there is no saved state, otherwise as
    /// [`ViewState::from_text`].
    pub fn load(path: &Path) -> CoreResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| CoreError::from_io(e, path))?;
        Self::from_text(&text).inspect_err(|e| {
            tracing::warn!("discarding view state {}: {e}", path.display());
        })
    }
}

fn path_str(path: &Path) -> CoreResult<&str> {
    path.to_str()
        .ok_or_else(|| CoreError::Persist(format!("path is not valid UTF-8: {}", path.display())))
}

fn push_text(out: &mut String, key: &str, value: &str) {
    let _ = writeln!(out, "{key} {} {value}", value.len());
}

fn push_number(out: &mut String, key: &str, value: u64) {
    let _ = writeln!(out, "{key} {value}");
}

fn push_flag(out: &mut String, key: &str, value: bool) {
    push_number(out, key, u64::from(value));
}

struct Parser<'a> {
    rest: &'a str,
}

impl<'a> Parser<'a> {
    fn key(&mut self, key: &str) -> CoreResult<()> {
        let missing = || CoreError::Persist(format!("expected `{key}`"));
        let rest = self.rest.strip_prefix(key).ok_or_else(missing)?;
        self.rest = rest.strip_prefix(' ').ok_or_else(missing)?;
        Ok(())
    }

    fn line(&mut self) -> Result<&'a str, String> {
        let (line, rest) = self
            .rest
            .split_once('\n')
            .ok_or_else(|| "unexpected end of input".to_string())?;
        self.rest = rest;
        Ok(line)
    }

    /// `<len> <raw>\n` where `raw` is exactly `len` bytes.
    fn sized(&mut self) -> Result<&'a str, String> {
        let (len, rest) = self
            .rest
            .split_once(' ')
            .ok_or_else(|| "missing length".to_string())?;
        let len: usize = len.parse().map_err(|_| format!("bad length {len:?}"))?;
        let raw = rest
            .get(..len)
            .ok_or_else(|| format!("length {len} runs past the end"))?;
        self.rest = rest[len..]
            .strip_prefix('\n')
            .ok_or_else(|| format!("length {len} does not end the line"))?;
        Ok(raw)
    }

    fn text(&mut self, key: &str) -> CoreResult<&'a str> {
        self.key(key)?;
        self.sized()
            .map_err(|e| CoreError::Persist(format!("{key}: {e}")))
    }

    fn number(&mut self, key: &str) -> CoreResult<u64> {
        self.key(key)?;
        let line = self
            .line()
            .map_err(|e| CoreError::Persist(format!("{key}: {e}")))?;
        line.trim_end_matches('\r')
            .parse()
            .map_err(|_| CoreError::Persist(format!("{key}: bad number {line:?}")))
    }

    fn flag(&mut self, key: &str) -> CoreResult<bool> {
        match self.number(key)? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(CoreError::Persist(format!("{key}: expected 0 or 1, got {other}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::entry::EntryKind;
    use tempfile::TempDir;

    fn sample() -> ViewState {
        let mut filter = FilterConfig::new();
        filter.text = "my report  v2".to_string();
        filter.mode = FilterMode::Regex;
        filter.case_sensitive = true;
        filter.polarity = Polarity::HideMatching;
        filter.visibility.set(EntryKind::InvalidSymlink, false);

        let history = History::default()
            .push(PathBuf::from("/home"))
            .push(PathBuf::from("/home/bob/My Documents"))
            .push(PathBuf::from("/tmp"));
        let (history, _) = history.go_back().unwrap();

        ViewState {
            cwd: PathBuf::from("/home/bob/My Documents"),
            filter,
            history,
        }
    }

    #[test]
    fn text_layout() {
        let text = ViewState {
            cwd: PathBuf::from("/home/bob"),
            filter: FilterConfig::new(),
            history: History::default()
                .push(PathBuf::from("/home"))
                .push(PathBuf::from("/home/bob")),
        }
        .to_text()
        .unwrap();

        assert_eq!(
            text,
            "cwd 9 /home/bob\n\
             filter 0 \n\
             filter_mode 0\n\
             filter_case_sensitive 0\n\
             filter_polarity 1\n\
             filter_show_directories 1\n\
             filter_show_symlink_directories 1\n\
             filter_show_files 1\n\
             filter_show_symlink_files 1\n\
             filter_show_invalid_symlinks 1\n\
             history_pos 1\n\
             history_len 2\n\
             5 /home\n\
             9 /home/bob\n"
        );
    }

    #[test]
    fn round_trip_preserves_spaces_and_flags() {
        let state = sample();
        let parsed = ViewState::from_text(&state.to_text().unwrap()).unwrap();

        assert_eq!(parsed, state);
        assert_eq!(parsed.filter.text, "my report  v2");
        assert_eq!(parsed.history.position(), 1);
        assert!(!parsed.filter.visibility.invalid_symlinks);
    }

    #[test]
    fn length_prefix_allows_newlines_in_text() {
        let mut state = sample();
        state.filter.text = "a\nb".to_string();
        let parsed = ViewState::from_text(&state.to_text().unwrap()).unwrap();
        assert_eq!(parsed.filter.text, "a\nb");
    }

    #[test]
    fn length_counts_bytes() {
        let mut state = sample();
        state.filter.text = "日本".to_string();
        let text = state.to_text().unwrap();
        assert!(text.contains("filter 6 日本\n"));
        assert_eq!(ViewState::from_text(&text).unwrap().filter.text, "日本");
    }

    #[test]
    fn missing_key_is_named() {
        let text = sample().to_text().unwrap().replace("filter_polarity", "polarity");
        let err = ViewState::from_text(&text).unwrap_err();
        assert!(matches!(err, CoreError::Persist(ref m) if m.contains("filter_polarity")));
    }

    #[test]
    fn wrong_length_is_rejected() {
        let text = sample()
            .to_text()
            .unwrap()
            .replace("cwd 22 ", "cwd 21 ");
        let err = ViewState::from_text(&text).unwrap_err();
        assert!(matches!(err, CoreError::Persist(ref m) if m.starts_with("cwd")));
    }

    #[test]
    fn bad_flag_is_rejected() {
        let text = sample()
            .to_text()
            .unwrap()
            .replace("filter_show_files 1", "filter_show_files 2");
        assert!(matches!(
            ViewState::from_text(&text).unwrap_err(),
            CoreError::Persist(_)
        ));
    }

    #[test]
    fn truncated_history_is_rejected() {
        let text = sample().to_text().unwrap();
        let truncated = &text[..text.len() - 5];
        let err = ViewState::from_text(truncated).unwrap_err();
        assert!(matches!(err, CoreError::Persist(ref m) if m.contains("history item 2")));
    }

    #[test]
    fn unknown_filter_mode() {
        let text = sample()
            .to_text()
            .unwrap()
            .replace("filter_mode 1", "filter_mode 9");
        assert!(matches!(
            ViewState::from_text(&text).unwrap_err(),
            CoreError::Persist(_)
        ));
    }

    #[test]
    fn save_and_load() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("state").join("view_0.txt");
        let state = sample();

        state.save(&path).unwrap();

        assert_eq!(ViewState::load(&path).unwrap(), state);
    }

    #[test]
    fn load_missing_file_is_not_found() {
        let tmp = TempDir::new().unwrap();
        assert!(matches!(
            ViewState::load(&tmp.path().join("nope.txt")).unwrap_err(),
            CoreError::NotFound(_)
        ));
    }

    #[test]
    fn writer_and_reader() {
        let state = sample();
        let mut buf = Vec::new();
        state.write_to(&mut buf).unwrap();
        let parsed = ViewState::read_from(&mut buf.as_slice()).unwrap();
        assert_eq!(parsed, state);
    }
}
