use crate::error::{PromoteError, Result};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use walkdir::WalkDir;

/// Atomically write `data` to `path` using a tempfile in the same directory.
/// An existing file is replaced, never appended to.
pub fn atomic_write(path: &Path, data: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    let dir = path.parent().unwrap_or(Path::new("."));
    let mut tmp =
        NamedTempFile::new_in(dir).map_err(|e| PromoteError::io("create tempfile in", dir, e))?;
    tmp.write_all(data)
        .map_err(|e| PromoteError::io("write", tmp.path(), e))?;
    tmp.persist(path)
        .map_err(|e| PromoteError::io("write", path, e.error))?;
    Ok(())
}

/// Create a directory and all parents, idempotent.
pub fn ensure_dir(path: &Path) -> Result<()> {
    std::fs::create_dir_all(path).map_err(|e| PromoteError::io("create directory", path, e))
}

/// Recursively delete `path`. Returns false when there was nothing to remove.
///
/// This is destructive: the whole tree is gone, with no backup.
pub fn remove_tree(path: &Path) -> Result<bool> {
    let meta = match std::fs::symlink_metadata(path) {
        Ok(meta) => meta,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(PromoteError::io("inspect", path, e)),
    };
    if meta.is_dir() {
        std::fs::remove_dir_all(path).map_err(|e| PromoteError::io("remove", path, e))?;
    } else {
        std::fs::remove_file(path).map_err(|e| PromoteError::io("remove", path, e))?;
    }
    Ok(true)
}

/// Counts gathered while copying a tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CopyStats {
    pub dirs: usize,
    pub files: usize,
    pub bytes: u64,
}

/// Recursively copy the directory `src` to `dst`, which must not exist yet.
///
/// Directory structure is recreated verbatim and regular files are copied
/// byte-for-byte. Symlinks are followed, so the linked content lands in `dst`.
pub fn copy_tree(src: &Path, dst: &Path) -> Result<CopyStats> {
    if dst.exists() {
        return Err(PromoteError::io(
            "copy into",
            dst,
            std::io::Error::new(
                std::io::ErrorKind::AlreadyExists,
                "destination already exists",
            ),
        ));
    }

    let mut stats = CopyStats::default();
    for entry in WalkDir::new(src).follow_links(true) {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(src).to_path_buf();
            PromoteError::io("walk", path, e.into())
        })?;
        let rel = entry
            .path()
            .strip_prefix(src)
            .map_err(|_| {
                PromoteError::io(
                    "walk",
                    entry.path(),
                    std::io::Error::other("entry outside source tree"),
                )
            })?;
        let dest = dst.join(rel);

        if entry.file_type().is_dir() {
            ensure_dir(&dest)?;
            stats.dirs += 1;
        } else {
            let bytes = std::fs::copy(entry.path(), &dest)
                .map_err(|e| PromoteError::io("copy", entry.path(), e))?;
            stats.files += 1;
            stats.bytes += bytes;
        }
    }
    Ok(stats)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
