use crate::types::Action;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// ISO-8601 rendering used everywhere a timestamp is shown.
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

// ---------------------------------------------------------------------------
// MigrationLogEntry
// ---------------------------------------------------------------------------

/// One recorded action. Entries are created by [`MigrationRun::record`] and
/// never change afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationLogEntry {
    timestamp: DateTime<Utc>,
    action: Action,
    details: String,
}

impl MigrationLogEntry {
    pub fn timestamp(&self) -> &DateTime<Utc> {
        &self.timestamp
    }

    pub fn action(&self) -> Action {
        self.action
    }

    pub fn details(&self) -> &str {
        &self.details
    }

    /// Bullet line used in the written report.
    pub fn report_line(&self) -> String {
        format!(
            "- **{}**: {} - {}",
            format_timestamp(&self.timestamp),
            self.action,
            self.details
        )
    }
}

/// Console form: `[<timestamp>] <ACTION>: <details>`.
impl fmt::Display for MigrationLogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            format_timestamp(&self.timestamp),
            self.action,
            self.details
        )
    }
}

// ---------------------------------------------------------------------------
// MigrationRun
// ---------------------------------------------------------------------------

/// Append-only log of a single promotion run, in execution order.
#[derive(Debug, Clone, Serialize)]
pub struct MigrationRun {
    source_root: PathBuf,
    target_root: PathBuf,
    entries: Vec<MigrationLogEntry>,
}

impl MigrationRun {
    pub fn new(source_root: impl Into<PathBuf>, target_root: impl Into<PathBuf>) -> Self {
        Self {
            source_root: source_root.into(),
            target_root: target_root.into(),
            entries: Vec::new(),
        }
    }

    pub fn source_root(&self) -> &Path {
        &self.source_root
    }

    pub fn target_root(&self) -> &Path {
        &self.target_root
    }

    pub fn record(&mut self, action: Action, details: impl Into<String>) -> &MigrationLogEntry {
        self.entries.push(MigrationLogEntry {
            timestamp: Utc::now(),
            action,
            details: details.into(),
        });
        &self.entries[self.entries.len() - 1]
    }

    pub fn entries(&self) -> &[MigrationLogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn count(&self, action: Action) -> usize {
        self.entries.iter().filter(|e| e.action == action).count()
    }

    pub fn last(&self) -> Option<&MigrationLogEntry> {
        self.entries.last()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
