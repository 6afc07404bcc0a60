use crate::error::{PromoteError, Result};
use regex::Regex;
use std::ffi::OsString;
use std::path::{Component, Path, PathBuf};
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// File name constants
// ---------------------------------------------------------------------------

pub const DEFAULT_REPORT_FILE: &str = "migration_report.md";
pub const LOCK_FILE: &str = ".promote.lock";
pub const CONFIG_FILE: &str = "promote.yaml";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn subsystem_source(source_root: &Path, name: &str) -> PathBuf {
    source_root.join(name)
}

pub fn subsystem_target(target_root: &Path, name: &str) -> PathBuf {
    target_root.join(name)
}

pub fn report_path(target_root: &Path, report_file: &str) -> PathBuf {
    target_root.join(report_file)
}

pub fn lock_path(target_root: &Path) -> PathBuf {
    target_root.join(LOCK_FILE)
}

pub fn config_path(source_root: &Path) -> PathBuf {
    source_root.join(CONFIG_FILE)
}

// ---------------------------------------------------------------------------
// Name validation
// ---------------------------------------------------------------------------

static NAME_RE: OnceLock<Regex> = OnceLock::new();

fn name_re() -> &'static Regex {
    NAME_RE.get_or_init(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._-]*$").unwrap())
}

/// A subsystem name must be a single plain directory name.
pub fn validate_subsystem_name(name: &str) -> Result<()> {
    if name.is_empty() || name.len() > 64 || !name_re().is_match(name) {
        return Err(PromoteError::InvalidConfig(format!(
            "invalid subsystem name '{name}': must be a single directory name"
        )));
    }
    Ok(())
}

/// Marker paths are relative to the source root and may not climb out of it.
pub fn validate_relative_file(path: &str) -> Result<()> {
    let p = Path::new(path);
    let plain = !path.is_empty() && p.components().all(|c| matches!(c, Component::Normal(_)));
    if !plain {
        return Err(PromoteError::InvalidConfig(format!(
            "invalid required file '{path}': must be a relative path inside the source root"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Root resolution
// ---------------------------------------------------------------------------

/// Absolute form of `path` with `.`/`..` folded and the longest existing
/// ancestor canonicalized, so symlinked and not-yet-created roots compare
/// correctly.
pub fn resolve(path: &Path) -> PathBuf {
    let abs = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    let lexical = normalize(&abs);

    let mut existing = lexical.as_path();
    let mut tail: Vec<OsString> = Vec::new();
    loop {
        if let Ok(canon) = existing.canonicalize() {
            let mut out = canon;
            for part in tail.iter().rev() {
                out.push(part);
            }
            return out;
        }
        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) => {
                tail.push(name.to_os_string());
                existing = parent;
            }
            _ => return lexical,
        }
    }
}

fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// True when the two roots are the same directory or one contains the other.
pub fn roots_overlap(source_root: &Path, target_root: &Path) -> bool {
    let source = resolve(source_root);
    let target = resolve(target_root);
    source.starts_with(&target) || target.starts_with(&source)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
