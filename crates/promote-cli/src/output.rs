use promote_core::MigrationSummary;
use serde::Serialize;

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{}", json);
    Ok(())
}

pub fn print_success(summary: &MigrationSummary) {
    println!("\n✅ Migration completed successfully!");
    println!("📊 Check {} for details", summary.report_path.display());
}

pub fn print_failure(err: &anyhow::Error) {
    println!("\n❌ Migration failed: {err:#}");
}
