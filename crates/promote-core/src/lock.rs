use crate::error::{PromoteError, Result};
use crate::paths;
use chrono::Utc;
use std::fs::{File, TryLockError};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Exclusive claim on a target root for the duration of a run.
///
/// Backed by an OS advisory lock on `.promote.lock`, so the kernel releases
/// it when the holding process dies. A lock file left behind by a killed run
/// carries no lock and does not block the next run. The file is removed when
/// the guard drops.
#[derive(Debug)]
pub struct TargetLock {
    path: PathBuf,
    // Held for the lifetime of the guard; closing it releases the lock.
    file: File,
}

impl TargetLock {
    pub fn acquire(target_root: &Path) -> Result<Self> {
        let path = paths::lock_path(target_root);
        // A previous holder may unlink the file between our open and lock;
        // retry against the fresh file in that case.
        for _ in 0..3 {
            let file = std::fs::OpenOptions::new()
                .read(true)
                .write(true)
                .create(true)
                .truncate(false)
                .open(&path)
                .map_err(|e| PromoteError::io("create lock", &path, e))?;

            match file.try_lock() {
                Ok(()) => {}
                Err(TryLockError::WouldBlock) => return Err(PromoteError::TargetLocked(path)),
                Err(TryLockError::Error(e)) => return Err(PromoteError::io("lock", path, e)),
            }

            if !still_linked(&file, &path) {
                continue;
            }

            let mut lock = Self { path, file };
            lock.stamp()?;
            tracing::debug!(lock = %lock.path.display(), "acquired target lock");
            return Ok(lock);
        }
        Err(PromoteError::TargetLocked(path))
    }

    fn stamp(&mut self) -> Result<()> {
        self.file
            .set_len(0)
            .and_then(|()| {
                writeln!(
                    self.file,
                    "pid: {}\nacquired_at: {}",
                    std::process::id(),
                    Utc::now().to_rfc3339()
                )
            })
            .map_err(|e| PromoteError::io("write lock", &self.path, e))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(unix)]
fn still_linked(file: &File, path: &Path) -> bool {
    use std::os::unix::fs::MetadataExt;
    match (file.metadata(), std::fs::metadata(path)) {
        (Ok(held), Ok(current)) => held.dev() == current.dev() && held.ino() == current.ino(),
        _ => false,
    }
}

#[cfg(not(unix))]
fn still_linked(_file: &File, path: &Path) -> bool {
    path.exists()
}

impl Drop for TargetLock {
    fn drop(&mut self) {
        // Unlink while still holding the lock; `file` closes right after.
        if let Err(e) = std::fs::remove_file(&self.path) {
            tracing::warn!(lock = %self.path.display(), error = %e, "failed to remove target lock");
        } else {
            tracing::debug!(lock = %self.path.display(), "released target lock");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn second_acquire_fails_while_held() {
        let dir = TempDir::new().unwrap();
        let lock = TargetLock::acquire(dir.path()).unwrap();
        assert!(lock.path().exists());

        let err = TargetLock::acquire(dir.path()).unwrap_err();
        assert!(matches!(err, PromoteError::TargetLocked(_)));
        assert!(lock.path().exists());
    }

    #[test]
    fn drop_releases_lock() {
        let dir = TempDir::new().unwrap();
        {
            let _lock = TargetLock::acquire(dir.path()).unwrap();
        }
        assert!(!paths::lock_path(dir.path()).exists());
        TargetLock::acquire(dir.path()).unwrap();
    }

    #[test]
    fn leftover_file_from_killed_run_does_not_block() {
        let dir = TempDir::new().unwrap();
        let path = paths::lock_path(dir.path());
        std::fs::write(&path, "pid: 4242\nacquired_at: 2026-01-01T00:00:00+00:00\n").unwrap();

        let lock = TargetLock::acquire(dir.path()).unwrap();
        let stamp = std::fs::read_to_string(lock.path()).unwrap();
        assert!(stamp.starts_with(&format!("pid: {}\n", std::process::id())));

        drop(lock);
        assert!(!path.exists());
    }

    #[test]
    fn missing_target_is_io_failure() {
        let dir = TempDir::new().unwrap();
        let err = TargetLock::acquire(&dir.path().join("absent")).unwrap_err();
        assert!(matches!(err, PromoteError::IoFailure { .. }));
    }
}
