//! CLI argument parsing for the checker.
use clap::Parser;
use std::path::PathBuf;

/// Root CLI entrypoint.
///
/// The surface is intentionally thin: a schema (one check file, or a
/// directory of check files), one target document, and output switches.
/// All matching policy lives in the matcher and runner modules.
#[derive(Parser, Debug)]
#[command(
    name = "sbom-check",
    version,
    about = "Check a target JSON document against one or more schema files",
    after_help = "Schema string leaves may carry directives:\n  \"=name\"   capture the target value under name\n  \"==name\"  assert the target value equals the captured name\n\nExamples:\n  sbom-check check.json sbom.spdx.json\n  sbom-check checks/ sbom.spdx.json --json"
)]
pub struct RootArgs {
    /// Schema check file, or a directory of *.json check files
    #[arg(value_name = "SCHEMA")]
    pub schema: PathBuf,

    /// Target JSON document to check
    #[arg(value_name = "TARGET")]
    pub target: PathBuf,

    /// Emit a machine-readable JSON report instead of plain text
    #[arg(long)]
    pub json: bool,

    /// Emit a verbose transcript of the run
    #[arg(long)]
    pub verbose: bool,
}
