//! `ffbaudit estates` / `ffbaudit fetch` — estate registry and isql.
//!
//! Fetching shells out to Firebird's `isql` with credentials from the
//! registry; the raw table output lands in a file the `run` command can
//! ingest with `format = "isql"`. Passwords never appear in output.

use std::path::{Path, PathBuf};
use std::process::Command;

use ffbaudit_config::{Estate, EstateRegistry};

use crate::exit_codes::EXIT_FETCH;
use crate::CliError;

fn fetch_err(msg: impl Into<String>) -> CliError {
    CliError {
        code: EXIT_FETCH,
        message: msg.into(),
        hint: None,
    }
}

fn load_registry() -> Result<EstateRegistry, CliError> {
    EstateRegistry::load().map_err(|e| CliError::config(e.to_string()))
}

pub fn cmd_estates(json: bool) -> Result<(), CliError> {
    let registry = load_registry()?;

    if json {
        let listing: Vec<serde_json::Value> = registry
            .estates
            .iter()
            .map(|(name, estate)| {
                serde_json::json!({
                    "name": name,
                    "database": estate.database,
                    "user": estate.user,
                    "charset": estate.charset,
                })
            })
            .collect();
        let json_str = serde_json::to_string_pretty(&listing)
            .map_err(|e| CliError::runtime(e.to_string()))?;
        println!("{json_str}");
        return Ok(());
    }

    if registry.is_empty() {
        eprintln!("no estates configured");
        eprintln!("note: add them to {}", EstateRegistry::config_path().display());
        return Ok(());
    }

    for (name, estate) in &registry.estates {
        println!(
            "{name}\t{}\t{} ({})",
            estate.database, estate.user, estate.charset
        );
    }
    Ok(())
}

pub fn cmd_fetch(
    estate_name: &str,
    sql: PathBuf,
    out: Option<PathBuf>,
    isql: Option<PathBuf>,
) -> Result<(), CliError> {
    let registry = load_registry()?;
    let estate = registry.get(estate_name).ok_or_else(|| {
        CliError::args(format!("unknown estate '{estate_name}'"))
            .with_hint("ffbaudit estates lists configured names")
    })?;

    let isql_bin = resolve_isql(isql)?;
    let output = run_isql(&isql_bin, estate, &sql)?;

    match out {
        Some(path) => {
            std::fs::write(&path, &output)
                .map_err(|e| CliError::runtime(format!("cannot write {}: {e}", path.display())))?;
            eprintln!("wrote {}", path.display());
        }
        None => print!("{output}"),
    }
    Ok(())
}

/// Resolve the isql binary: explicit flag (or $FFBAUDIT_ISQL via clap),
/// then PATH.
fn resolve_isql(flag: Option<PathBuf>) -> Result<PathBuf, CliError> {
    if let Some(path) = flag {
        if path.exists() {
            return Ok(path);
        }
        return Err(fetch_err(format!("isql not found at {}", path.display())));
    }
    which::which("isql").map_err(|_| CliError {
        code: EXIT_FETCH,
        message: "isql not found on PATH".to_string(),
        hint: Some("install firebird3.0-utils, or pass --isql / set FFBAUDIT_ISQL".to_string()),
    })
}

fn run_isql(isql_bin: &Path, estate: &Estate, sql: &Path) -> Result<String, CliError> {
    let sql_str = sql
        .to_str()
        .ok_or_else(|| CliError::args(format!("invalid script path: {}", sql.display())))?;

    let output = Command::new(isql_bin)
        .args([
            "-user",
            &estate.user,
            "-password",
            &estate.password,
            "-charset",
            &estate.charset,
            "-i",
            sql_str,
            &estate.database,
        ])
        .output()
        .map_err(|e| fetch_err(format!("failed to run isql: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(fetch_err(format!(
            "isql failed (exit {}): {}",
            output.status.code().unwrap_or(-1),
            stderr.trim(),
        )));
    }

    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}
