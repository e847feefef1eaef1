//! Following the game's log files
//!
//! A [`LogWatcher`] polls each enabled [`LogWatchEntry`] and reports only
//! the lines appended since the previous poll. The first poll that finds a
//! file records its line count as the baseline and reports nothing. A file
//! that shrinks resets the baseline to its new length; a file that
//! disappears is treated as new when it comes back.
//!
//! # Examples
//!
//! ```no_run
//! use std::thread;
//! use whiskerwood_mods::logwatch::LogWatcher;
//! use whiskerwood_mods::Config;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::load()?;
//! let mut watcher = LogWatcher::from_config(&config.logwatch, "C:/Users/me/AppData/Local/Whiskerwood/Saved/Logs");
//!
//! loop {
//!     for batch in watcher.scan_once() {
//!         for line in &batch.lines {
//!             println!("[{}] {}", batch.display_name, line);
//!         }
//!     }
//!     thread::sleep(watcher.interval());
//! }
//! # }
//! ```

use crate::config::{expand_path, LogWatchConfig, LogWatchEntry};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// File name of the game's main log inside the logs directory
pub const GAME_LOG_FILE: &str = "Whiskerwood.log";

/// New lines seen in one watched file during one poll
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogBatch {
    pub id: String,
    pub display_name: String,
    pub path: PathBuf,
    pub lines: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default)]
struct WatchState {
    last_line_count: usize,
    had_file: bool,
}

/// Polls configured log files for appended lines.
#[derive(Debug, Clone)]
pub struct LogWatcher {
    entries: Vec<LogWatchEntry>,
    logs_dir: PathBuf,
    interval: Duration,
    states: HashMap<String, WatchState>,
}

impl LogWatcher {
    /// Watch `entries`; relative entry paths are taken from `logs_dir`.
    pub fn new(entries: Vec<LogWatchEntry>, logs_dir: impl Into<PathBuf>) -> Self {
        let mut watcher = Self {
            entries,
            logs_dir: logs_dir.into(),
            interval: Duration::from_millis(1000),
            states: HashMap::new(),
        };
        watcher.refresh();
        watcher
    }

    /// Build from the `[logwatch]` section. With no watches configured,
    /// the game's main log is watched under the id `game`.
    pub fn from_config(config: &LogWatchConfig, logs_dir: impl Into<PathBuf>) -> Self {
        let entries = if config.watches.is_empty() {
            vec![default_game_watch()]
        } else {
            config.watches.clone()
        };

        let mut watcher = Self::new(entries, logs_dir);
        watcher.interval = Duration::from_millis(config.interval_ms.max(1));
        watcher
    }

    pub fn entries(&self) -> &[LogWatchEntry] {
        &self.entries
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Full path of a watched file
    pub fn resolve_path(&self, entry: &LogWatchEntry) -> PathBuf {
        let path = expand_path(&entry.path);
        if path.is_relative() {
            self.logs_dir.join(path)
        } else {
            path
        }
    }

    /// Forget every baseline; the next poll re-establishes them.
    pub fn refresh(&mut self) {
        self.states = self
            .entries
            .iter()
            .filter(|e| !e.id.is_empty())
            .map(|e| (e.id.clone(), WatchState::default()))
            .collect();
    }

    /// Turn a watch on or off. Returns false for an unknown id or when the
    /// watch already had that state; baselines are reset on a change.
    pub fn set_config_enabled(&mut self, id: &str, enabled: bool) -> bool {
        let Some(entry) = self.entries.iter_mut().find(|e| e.id == id) else {
            return false;
        };
        if entry.enabled == enabled {
            return false;
        }

        entry.enabled = enabled;
        tracing::info!(id, enabled, "log watch state changed");
        self.refresh();
        true
    }

    /// Poll every enabled watch once and return the lines appended since
    /// the last poll, in entry order.
    pub fn scan_once(&mut self) -> Vec<LogBatch> {
        let mut batches = Vec::new();

        for entry in &self.entries {
            if !entry.enabled || entry.id.is_empty() || entry.path.is_empty() {
                continue;
            }

            let path = self.resolve_path(entry);
            let state = self.states.entry(entry.id.clone()).or_default();

            if !path.is_file() {
                *state = WatchState::default();
                continue;
            }

            let lines = match read_lines(&path) {
                Ok(lines) => lines,
                Err(e) => {
                    tracing::debug!(path = %path.display(), error = %e, "could not read log file");
                    continue;
                }
            };
            let count = lines.len();

            if !state.had_file {
                tracing::debug!(id = %entry.id, lines = count, "log baseline established");
                state.had_file = true;
                state.last_line_count = count;
                continue;
            }

            if count <= state.last_line_count {
                if count < state.last_line_count {
                    tracing::debug!(id = %entry.id, lines = count, "log file shrank, resetting baseline");
                }
                state.last_line_count = count;
                continue;
            }

            let new_lines = lines[state.last_line_count..].to_vec();
            state.last_line_count = count;

            batches.push(LogBatch {
                id: entry.id.clone(),
                display_name: if entry.display_name.is_empty() {
                    entry.id.clone()
                } else {
                    entry.display_name.clone()
                },
                path,
                lines: new_lines,
            });
        }

        batches
    }
}

fn default_game_watch() -> LogWatchEntry {
    LogWatchEntry {
        id: "game".to_string(),
        display_name: "Whiskerwood".to_string(),
        path: GAME_LOG_FILE.to_string(),
        enabled: true,
    }
}

/// Non-empty lines of a log file. Invalid UTF-8 is replaced, not rejected.
fn read_lines(path: &Path) -> std::io::Result<Vec<String>> {
    let bytes = fs::read(path)?;
    Ok(String::from_utf8_lossy(&bytes)
        .lines()
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}
