use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod error;
mod matcher;
mod path;
mod runner;

use cli::RootArgs;

fn main() -> Result<()> {
    let args = RootArgs::parse();
    init_logging(args.verbose);

    let report = runner::run_checks(&args.schema, &args.target)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for result in &report.results {
            if let Some(message) = &result.error {
                println!("{}: {message}", result.schema);
            }
        }
    }

    tracing::info!(
        total = report.total,
        passed = report.passed,
        failed = report.failed,
        "run complete"
    );
    if !report.all_passed() {
        std::process::exit(1);
    }
    Ok(())
}

/// Default to warnings only; `--verbose` or `RUST_LOG` opens the filter up.
fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
