use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PromoteError {
    #[error("source directory {} not found", .0.display())]
    SourceNotFound(PathBuf),

    #[error("required file {0} not found")]
    RequiredArtifactMissing(String),

    #[error("source for subsystem '{name}' not found at {}", .path.display())]
    SourceSubsystemMissing { name: String, path: PathBuf },

    #[error("failed to {op} {}", .path.display())]
    IoFailure {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("target {} exists but is not a directory", .0.display())]
    TargetNotDirectory(PathBuf),

    #[error(
        "source {} and target {} overlap: refusing to promote a tree into itself",
        .source_root.display(),
        .target_root.display()
    )]
    RootsOverlap {
        source_root: PathBuf,
        target_root: PathBuf,
    },

    #[error("target is locked by another promotion run: {} (remove it if no run is active)", .0.display())]
    TargetLocked(PathBuf),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("invalid action: {0}")]
    InvalidAction(String),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

impl PromoteError {
    pub fn io(op: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PromoteError::IoFailure {
            op,
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, PromoteError>;
