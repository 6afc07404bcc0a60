use crate::error::{PromoteError, Result};
use crate::paths;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// Subsystem
// ---------------------------------------------------------------------------

/// A project subdirectory promoted as one unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subsystem {
    /// Directory name under both the source and target roots.
    pub name: String,
    /// Human label used in log messages, e.g. "DBT models".
    #[serde(default)]
    pub label: Option<String>,
}

impl Subsystem {
    pub fn new(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: Some(label.into()),
        }
    }

    pub fn label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.name)
    }
}

fn default_subsystems() -> Vec<Subsystem> {
    vec![
        Subsystem::new("dbt", "DBT models"),
        Subsystem::new("airflow", "Airflow DAGs"),
        Subsystem::new("snowflake", "Snowflake configs"),
    ]
}

fn default_required_files() -> Vec<String> {
    vec![
        "dbt/dbt_project.yml".to_string(),
        "airflow/requirements.txt".to_string(),
        "docker-compose.yml".to_string(),
    ]
}

fn default_report_file() -> String {
    paths::DEFAULT_REPORT_FILE.to_string()
}

fn default_version() -> u32 {
    1
}

// ---------------------------------------------------------------------------
// PromotionConfig
// ---------------------------------------------------------------------------

/// Which subsystems are promoted, in what order, and which marker files must
/// be present in the source tree first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromotionConfig {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default = "default_subsystems")]
    pub subsystems: Vec<Subsystem>,
    #[serde(default = "default_required_files")]
    pub required_files: Vec<String>,
    #[serde(default = "default_report_file")]
    pub report_file: String,
}

impl Default for PromotionConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            subsystems: default_subsystems(),
            required_files: default_required_files(),
            report_file: default_report_file(),
        }
    }
}

impl PromotionConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let data =
            std::fs::read_to_string(path).map_err(|e| PromoteError::io("read config", path, e))?;
        let cfg: PromotionConfig = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let data = serde_yaml::to_string(self)?;
        crate::fs::atomic_write(path, data.as_bytes())
    }

    pub fn subsystem(&self, name: &str) -> Option<&Subsystem> {
        self.subsystems.iter().find(|s| s.name == name)
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();
        let error = |message: String| ConfigWarning {
            level: WarnLevel::Error,
            message,
        };

        // 1. Subsystem names are plain directory names and unique
        let mut seen = HashSet::new();
        for subsystem in &self.subsystems {
            if let Err(e) = paths::validate_subsystem_name(&subsystem.name) {
                warnings.push(error(e.to_string()));
            } else if !seen.insert(subsystem.name.as_str()) {
                warnings.push(error(format!(
                    "subsystem '{}' is listed more than once",
                    subsystem.name
                )));
            }
        }

        // 2. Marker files stay inside the source root
        for file in &self.required_files {
            if let Err(e) = paths::validate_relative_file(file) {
                warnings.push(error(e.to_string()));
            }
        }

        // 3. The report must not land on top of a subsystem directory
        if paths::validate_subsystem_name(&self.report_file).is_err() {
            warnings.push(error(format!(
                "report_file '{}' must be a plain file name",
                self.report_file
            )));
        } else if self.subsystem(&self.report_file).is_some() {
            warnings.push(error(format!(
                "report_file '{}' collides with a subsystem directory",
                self.report_file
            )));
        }

        if self.subsystems.is_empty() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "no subsystems configured: a run will only validate and report"
                    .to_string(),
            });
        }
        if self.required_files.is_empty() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "no required_files configured: source tree is not checked for markers"
                    .to_string(),
            });
        }

        warnings
    }

    /// Fails with `InvalidConfig` listing every error-level warning.
    pub fn ensure_valid(&self) -> Result<()> {
        let errors: Vec<String> = self
            .validate()
            .into_iter()
            .filter(|w| w.level == WarnLevel::Error)
            .map(|w| w.message)
            .collect();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(PromoteError::InvalidConfig(errors.join("; ")))
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
