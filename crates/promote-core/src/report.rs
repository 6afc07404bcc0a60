use crate::log::{format_timestamp, MigrationRun};
use chrono::{DateTime, Utc};

/// Render the markdown report for `run`.
///
/// Only entries already recorded appear; the REPORT entry announcing the
/// written file is appended by the caller afterwards and is never part of
/// the document.
pub fn render_report(run: &MigrationRun, generated_at: &DateTime<Utc>) -> String {
    let mut out = format!(
        "# Migration Report\n\
         Generated: {}\n\
         \n\
         ## Migration Summary\n\
         - Source: {}\n\
         - Target: {}\n\
         - Total Actions: {}\n\
         \n\
         ## Migration Log\n",
        format_timestamp(generated_at),
        run.source_root().display(),
        run.target_root().display(),
        run.len()
    );
    for entry in run.entries() {
        out.push_str(&entry.report_line());
        out.push('\n');
    }
    out
}

/// Log bullets of a rendered report, in document order.
pub fn log_lines(report: &str) -> Vec<&str> {
    report
        .lines()
        .skip_while(|l| *l != "## Migration Log")
        .skip(1)
        .filter(|l| l.starts_with("- **"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Action;

    #[test]
    fn renders_summary_and_every_entry() {
        let mut run = MigrationRun::new("/staging", "/prod");
        run.record(Action::Validation, "Starting environment validation");
        run.record(Action::Validation, "Environment validation completed successfully");
        run.record(Action::Migration, "Starting DBT models migration");

        let report = render_report(&run, &Utc::now());

        assert!(report.starts_with("# Migration Report\nGenerated: "));
        assert!(report.contains("- Source: /staging\n"));
        assert!(report.contains("- Target: /prod\n"));
        assert!(report.contains("- Total Actions: 3\n\n## Migration Log\n- **"));
        assert!(report.contains("Generated: "));
        assert!(report.ends_with("Starting DBT models migration\n"));

        let lines = log_lines(&report);
        assert_eq!(lines.len(), 3);
        assert!(lines[0].ends_with("VALIDATION - Starting environment validation"));
        assert!(lines[2].ends_with("MIGRATION - Starting DBT models migration"));
    }

    #[test]
    fn empty_run_has_no_bullets() {
        let run = MigrationRun::new("/a", "/b");
        let report = render_report(&run, &Utc::now());
        assert!(report.contains("- Total Actions: 0"));
        assert!(log_lines(&report).is_empty());
    }
}
