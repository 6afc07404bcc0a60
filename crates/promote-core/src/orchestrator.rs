//! End-to-end promotion of a staging tree into a production tree.
//!
//! A run walks `validate → migrate each subsystem in order → report`. The
//! first error ends the run. Nothing is rolled back: subsystems promoted
//! before the failure stay promoted, later ones are left untouched.

use crate::config::PromotionConfig;
use crate::error::{PromoteError, Result};
use crate::fs::{self, CopyStats};
use crate::lock::TargetLock;
use crate::log::{MigrationLogEntry, MigrationRun};
use crate::paths;
use crate::report;
use crate::types::Action;
use chrono::Utc;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

// ---------------------------------------------------------------------------
// Stage
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "stage", content = "subsystem", rename_all = "snake_case")]
pub enum Stage {
    Start,
    Validating,
    Migrating(String),
    Reporting,
    Done,
    Failed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Start => f.write_str("start"),
            Stage::Validating => f.write_str("validating"),
            Stage::Migrating(name) => write!(f, "migrating({name})"),
            Stage::Reporting => f.write_str("reporting"),
            Stage::Done => f.write_str("done"),
            Stage::Failed => f.write_str("failed"),
        }
    }
}

// ---------------------------------------------------------------------------
// MigrationSummary
// ---------------------------------------------------------------------------

/// Outcome of a successful run.
#[derive(Debug, Clone, Serialize)]
pub struct MigrationSummary {
    pub source_root: PathBuf,
    pub target_root: PathBuf,
    pub report_path: PathBuf,
    pub actions: Vec<MigrationLogEntry>,
}

// ---------------------------------------------------------------------------
// Migrator
// ---------------------------------------------------------------------------

type Observer<'a> = Box<dyn FnMut(&MigrationLogEntry) + 'a>;

/// Promotes the configured subsystems from `source_root` to `target_root`.
///
/// **Destructive:** every promoted subsystem directory under the target root
/// is deleted in full and replaced by a fresh copy of the source. Files that
/// exist only in the target are lost. The report file is overwritten.
pub struct Migrator<'a> {
    config: PromotionConfig,
    run: MigrationRun,
    stage: Stage,
    observer: Option<Observer<'a>>,
}

impl<'a> Migrator<'a> {
    pub fn new(source_root: impl Into<PathBuf>, target_root: impl Into<PathBuf>) -> Self {
        Self::with_config(source_root, target_root, PromotionConfig::default())
    }

    pub fn with_config(
        source_root: impl Into<PathBuf>,
        target_root: impl Into<PathBuf>,
        config: PromotionConfig,
    ) -> Self {
        Self {
            config,
            run: MigrationRun::new(source_root, target_root),
            stage: Stage::Start,
            observer: None,
        }
    }

    /// Call `f` synchronously for every action as soon as it is recorded.
    pub fn on_action(mut self, f: impl FnMut(&MigrationLogEntry) + 'a) -> Self {
        self.observer = Some(Box::new(f));
        self
    }

    pub fn config(&self) -> &PromotionConfig {
        &self.config
    }

    pub fn run(&self) -> &MigrationRun {
        &self.run
    }

    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    fn log(&mut self, action: Action, details: impl Into<String>) {
        let entry = self.run.record(action, details);
        tracing::info!(action = %entry.action(), "{}", entry.details());
        if let Some(observer) = self.observer.as_mut() {
            observer(entry);
        }
    }

    // -----------------------------------------------------------------------
    // Steps
    // -----------------------------------------------------------------------

    /// Check every precondition of a run and create the target root if needed.
    ///
    /// On success all marker files are present and the target root exists.
    /// No subsystem directory is touched.
    pub fn validate_environment(&mut self) -> Result<()> {
        self.log(Action::Validation, "Starting environment validation");

        self.config.ensure_valid()?;

        let source = self.run.source_root().to_path_buf();
        let target = self.run.target_root().to_path_buf();

        if !source.is_dir() {
            return Err(PromoteError::SourceNotFound(source));
        }

        if paths::roots_overlap(&source, &target) {
            return Err(PromoteError::RootsOverlap {
                source_root: source,
                target_root: target,
            });
        }

        if !target.exists() {
            self.log(
                Action::Create,
                format!("Creating target directory {}", target.display()),
            );
            fs::ensure_dir(&target)?;
        } else if !target.is_dir() {
            return Err(PromoteError::TargetNotDirectory(target));
        }

        if let Some(missing) = self
            .config
            .required_files
            .iter()
            .find(|file| !source.join(file.as_str()).exists())
        {
            return Err(PromoteError::RequiredArtifactMissing(missing.clone()));
        }

        self.log(
            Action::Validation,
            "Environment validation completed successfully",
        );
        Ok(())
    }

    /// Replace `target_root/<name>` with a copy of `source_root/<name>`.
    ///
    /// The existing target directory is removed recursively before copying;
    /// this is a full replace, never a merge. The removal happens before the
    /// source is checked, so a missing source still costs the old target.
    pub fn migrate_subsystem(&mut self, name: &str) -> Result<CopyStats> {
        let subsystem = self
            .config
            .subsystem(name)
            .cloned()
            .ok_or_else(|| PromoteError::InvalidConfig(format!("unknown subsystem '{name}'")))?;
        let label = subsystem.label().to_string();

        self.log(Action::Migration, format!("Starting {label} migration"));

        let src = paths::subsystem_source(self.run.source_root(), &subsystem.name);
        let dst = paths::subsystem_target(self.run.target_root(), &subsystem.name);

        if fs::remove_tree(&dst)? {
            tracing::debug!(path = %dst.display(), "removed previous target");
        }

        if !src.is_dir() {
            return Err(PromoteError::SourceSubsystemMissing {
                name: subsystem.name,
                path: src,
            });
        }
        let stats = fs::copy_tree(&src, &dst)?;
        tracing::debug!(
            subsystem = %subsystem.name,
            files = stats.files,
            dirs = stats.dirs,
            bytes = stats.bytes,
            "copied subsystem"
        );

        self.log(Action::Migration, format!("{label} migrated successfully"));
        Ok(stats)
    }

    /// Write the report for everything logged so far and return its path.
    ///
    /// The REPORT action is recorded after the document is rendered, so the
    /// written file never lists its own creation.
    pub fn create_migration_report(&mut self) -> Result<PathBuf> {
        let path = paths::report_path(self.run.target_root(), &self.config.report_file);
        let content = report::render_report(&self.run, &Utc::now());
        fs::atomic_write(&path, content.as_bytes())?;

        self.log(
            Action::Report,
            format!("Migration report created at {}", path.display()),
        );
        Ok(path)
    }

    // -----------------------------------------------------------------------
    // Driver
    // -----------------------------------------------------------------------

    /// Run every step in order, stopping at the first error.
    ///
    /// On failure the target may be left with some subsystems promoted and
    /// the rest untouched; the log recorded so far stays available via
    /// [`Migrator::run`].
    pub fn migrate(&mut self) -> Result<MigrationSummary> {
        let result = self.drive();
        if let Err(e) = &result {
            tracing::debug!(stage = %self.stage, error = %e, "promotion failed");
            self.stage = Stage::Failed;
        }
        result
    }

    fn drive(&mut self) -> Result<MigrationSummary> {
        tracing::info!(
            source = %self.run.source_root().display(),
            target = %self.run.target_root().display(),
            "starting promotion"
        );

        self.stage = Stage::Validating;
        self.validate_environment()?;

        let _lock = TargetLock::acquire(self.run.target_root())?;

        let names: Vec<String> = self
            .config
            .subsystems
            .iter()
            .map(|s| s.name.clone())
            .collect();
        for name in names {
            self.stage = Stage::Migrating(name.clone());
            self.migrate_subsystem(&name)?;
        }

        self.stage = Stage::Reporting;
        let report_path = self.create_migration_report()?;
        self.stage = Stage::Done;

        Ok(MigrationSummary {
            source_root: self.run.source_root().to_path_buf(),
            target_root: self.run.target_root().to_path_buf(),
            report_path,
            actions: self.run.entries().to_vec(),
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
