use crate::output::{print_json, print_success};
use crate::resolve::resolve_config;
use promote_core::log::MigrationLogEntry;
use promote_core::Migrator;
use serde::Serialize;
use std::path::Path;

#[derive(Serialize)]
struct RunOutput<'a> {
    status: &'static str,
    source: &'a Path,
    target: &'a Path,
    #[serde(skip_serializing_if = "Option::is_none")]
    report: Option<&'a Path>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    actions: &'a [MigrationLogEntry],
}

pub fn run(source: &Path, target: &Path, config: Option<&Path>, json: bool) -> anyhow::Result<()> {
    let config_source = resolve_config(config, source);
    tracing::debug!(config = %config_source, "resolved promotion config");
    let config = match config_source.load() {
        Ok(config) => config,
        Err(e) => {
            if json {
                print_json(&RunOutput {
                    status: "failed",
                    source,
                    target,
                    report: None,
                    error: Some(format!("{e:#}")),
                    actions: &[],
                })?;
            }
            return Err(e);
        }
    };

    let mut migrator = Migrator::with_config(source, target, config);
    if !json {
        migrator = migrator.on_action(|entry| println!("{entry}"));
    }

    let result = migrator.migrate().map_err(anyhow::Error::from);

    if json {
        let output = match &result {
            Ok(summary) => RunOutput {
                status: "success",
                source,
                target,
                report: Some(summary.report_path.as_path()),
                error: None,
                actions: &summary.actions,
            },
            Err(e) => RunOutput {
                status: "failed",
                source,
                target,
                report: None,
                error: Some(format!("{e:#}")),
                actions: migrator.run().entries(),
            },
        };
        print_json(&output)?;
    } else if let Ok(summary) = &result {
        print_success(summary);
    }

    result.map(|_| ())
}
