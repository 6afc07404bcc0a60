mod cmd;
mod output;
mod resolve;

use clap::error::ErrorKind;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "promote",
    about = "Promote a staged data-pipeline project (dbt, Airflow, Snowflake) into production",
    version
)]
struct Cli {
    /// Staging tree to promote from
    source: PathBuf,

    /// Production tree to promote into (created if missing)
    target: PathBuf,

    /// Promotion config (default: <SOURCE>/promote.yaml, else the built-in layout)
    #[arg(long, env = "PROMOTE_CONFIG")]
    config: Option<PathBuf>,

    /// Output the run as JSON instead of the action echo
    #[arg(long, short = 'j')]
    json: bool,

    /// Debug logging on stderr
    #[arg(long, short = 'v')]
    verbose: bool,
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => e.exit(),
            _ => {
                // Wrong argument count and friends: usage, then status 1.
                eprint!("{e}");
                std::process::exit(1);
            }
        },
    };

    let default_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let result = cmd::migrate::run(&cli.source, &cli.target, cli.config.as_deref(), cli.json);

    if let Err(e) = result {
        if cli.json {
            eprintln!("error: {e:#}");
        } else {
            output::print_failure(&e);
        }
        std::process::exit(1);
    }
}
