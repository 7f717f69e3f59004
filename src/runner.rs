//! Two-pass check driver and multi-file aggregation.
//!
//! A single check is two sequential matcher passes over the same schema and
//! target sharing one variable table: Assign populates captures, Verify
//! enforces back-references. A run matches one target against either a
//! single check file or every `*.json` check file in a directory, collecting
//! all failures rather than stopping at the first file.
use crate::error::MatchError;
use crate::matcher::{check, Mode, VarTable};
use crate::path::ValuePath;
use anyhow::{anyhow, Context, Result};
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// Outcome of matching one target against a set of check files.
#[derive(Debug, Serialize)]
pub struct CheckReport {
    pub target: String,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub results: Vec<CheckResult>,
}

impl CheckReport {
    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }
}

/// Outcome of one schema file's two-pass check.
#[derive(Debug, Serialize)]
pub struct CheckResult {
    pub schema: String,
    pub passed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Run both matcher passes over one schema/target pair.
///
/// The variable table is fresh per call, so independent pairs never share
/// captures. The Assign pass applies the same structural rules as Verify
/// (mismatches can surface on either), it just skips back-reference checks.
pub fn verify(schema: &Value, target: &Value) -> Result<(), MatchError> {
    let mut vars = VarTable::new();
    check(schema, target, &mut vars, Mode::Assign, &ValuePath::root())?;
    check(schema, target, &mut vars, Mode::Verify, &ValuePath::root())
}

/// Match `target_path` against `schema_arg`, which is either one check file
/// or a directory of `*.json` check files.
///
/// Unreadable or unparseable inputs abort the whole run; structural
/// mismatches are collected into the report instead.
pub fn run_checks(schema_arg: &Path, target_path: &Path) -> Result<CheckReport> {
    let target = load_json(target_path)?;

    let check_files = if schema_arg.is_dir() {
        collect_check_files(schema_arg)?
    } else {
        vec![schema_arg.to_path_buf()]
    };

    let mut results = Vec::with_capacity(check_files.len());
    for path in &check_files {
        let schema = load_json(path)?;
        let outcome = verify(&schema, &target);
        tracing::debug!(
            schema = %path.display(),
            passed = outcome.is_ok(),
            "check complete"
        );
        results.push(CheckResult {
            schema: path.display().to_string(),
            passed: outcome.is_ok(),
            error: outcome.err().map(|err| err.to_string()),
        });
    }

    let passed = results.iter().filter(|result| result.passed).count();
    Ok(CheckReport {
        target: target_path.display().to_string(),
        total: results.len(),
        passed,
        failed: results.len() - passed,
        results,
    })
}

fn load_json(path: &Path) -> Result<Value> {
    let data = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    serde_json::from_str(&data).with_context(|| format!("parse {}", path.display()))
}

/// Sorted `*.json` files directly under `dir`.
fn collect_check_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("read directory {}", dir.display()))? {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
            files.push(path);
        }
    }
    if files.is_empty() {
        return Err(anyhow!("no *.json check files in {}", dir.display()));
    }
    files.sort();
    Ok(files)
}
