use anyhow::Context;
use promote_core::{paths, PromotionConfig};
use std::fmt;
use std::path::{Path, PathBuf};

/// Where the promotion config for a run comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    Explicit(PathBuf),
    Discovered(PathBuf),
    Defaults,
}

/// Resolve the promotion config.
///
/// Priority:
/// 1. `--config` flag / `PROMOTE_CONFIG` env var (passed in as `explicit`)
/// 2. `promote.yaml` at the root of the source tree
/// 3. The built-in dbt / airflow / snowflake layout
pub fn resolve_config(explicit: Option<&Path>, source_root: &Path) -> ConfigSource {
    if let Some(p) = explicit {
        return ConfigSource::Explicit(p.to_path_buf());
    }

    let candidate = paths::config_path(source_root);
    if candidate.is_file() {
        return ConfigSource::Discovered(candidate);
    }

    ConfigSource::Defaults
}

impl ConfigSource {
    pub fn load(&self) -> anyhow::Result<PromotionConfig> {
        match self {
            ConfigSource::Explicit(path) | ConfigSource::Discovered(path) => {
                PromotionConfig::load(path)
                    .with_context(|| format!("failed to load config {}", path.display()))
            }
            ConfigSource::Defaults => Ok(PromotionConfig::default()),
        }
    }
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigSource::Explicit(p) => write!(f, "{} (explicit)", p.display()),
            ConfigSource::Discovered(p) => write!(f, "{} (discovered)", p.display()),
            ConfigSource::Defaults => f.write_str("built-in defaults"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn explicit_config_wins() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("promote.yaml"), "version: 1\n").unwrap();
        let explicit = dir.path().join("other.yaml");

        assert_eq!(
            resolve_config(Some(&explicit), dir.path()),
            ConfigSource::Explicit(explicit)
        );
    }

    #[test]
    fn discovers_config_in_source_root() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("promote.yaml"), "version: 1\n").unwrap();

        let source = resolve_config(None, dir.path());
        assert_eq!(
            source,
            ConfigSource::Discovered(dir.path().join("promote.yaml"))
        );
        assert_eq!(source.load().unwrap(), PromotionConfig::default());
    }

    #[test]
    fn falls_back_to_defaults() {
        let dir = TempDir::new().unwrap();
        assert_eq!(resolve_config(None, dir.path()), ConfigSource::Defaults);
    }

    #[test]
    fn missing_explicit_config_is_an_error() {
        let dir = TempDir::new().unwrap();
        let source = resolve_config(Some(&dir.path().join("absent.yaml")), dir.path());
        let err = source.load().unwrap_err();
        assert!(format!("{err:#}").contains("failed to load config"));
    }
}
