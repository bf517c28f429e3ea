// ffbaudit CLI - FFB scan verification audits from the shell

mod exit_codes;
mod export;
mod fetch;
mod run;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use exit_codes::{EXIT_INVALID_CONFIG, EXIT_RUNTIME, EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "ffbaudit")]
#[command(about = "FFB harvest scan verification and reconciliation")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run an audit from a TOML config file
    #[command(after_help = "\
Examples:
  ffbaudit run july.audit.toml
  ffbaudit run july.audit.toml --json
  ffbaudit run july.audit.toml --output result.json
  ffbaudit run july.audit.toml --csv out/")]
    Run {
        /// Path to the .audit.toml config file
        config: PathBuf,

        /// Output JSON to stdout instead of human summary
        #[arg(long)]
        json: bool,

        /// Write JSON output to file
        #[arg(long)]
        output: Option<PathBuf>,

        /// Write divisions.csv and employees.csv into this directory
        #[arg(long, value_name = "DIR")]
        csv: Option<PathBuf>,

        /// Suppress stderr notes (skipped-row counts etc.)
        #[arg(long, short = 'q')]
        quiet: bool,
    },

    /// Validate an audit config without running
    #[command(after_help = "\
Examples:
  ffbaudit validate july.audit.toml")]
    Validate {
        /// Path to the .audit.toml config file
        config: PathBuf,
    },

    /// List estates from the connection registry
    Estates {
        /// Output JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Run a SQL script against an estate database via isql
    #[command(after_help = "\
Examples:
  ffbaudit fetch sungai-lala --sql extract.sql --out july.txt
  ffbaudit fetch sungai-lala --sql extract.sql --isql /opt/firebird/bin/isql

The isql binary is resolved from --isql, then $FFBAUDIT_ISQL, then PATH.")]
    Fetch {
        /// Estate name as configured in estates.toml
        estate: String,

        /// SQL script to execute
        #[arg(long)]
        sql: PathBuf,

        /// Write isql output to file (omit for stdout)
        #[arg(long)]
        out: Option<PathBuf>,

        /// Path to the isql binary
        #[arg(long, env = "FFBAUDIT_ISQL")]
        isql: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        None => {
            eprintln!("Usage: ffbaudit <command> [options]");
            eprintln!("       ffbaudit --help for more information");
            Ok(())
        }
        Some(Commands::Run {
            config,
            json,
            output,
            csv,
            quiet,
        }) => run::cmd_run(config, json, output, csv, quiet),
        Some(Commands::Validate { config }) => run::cmd_validate(config),
        Some(Commands::Estates { json }) => fetch::cmd_estates(json),
        Some(Commands::Fetch {
            estate,
            sql,
            out,
            isql,
        }) => fetch::cmd_fetch(&estate, sql, out, isql),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError {
            code,
            message,
            hint,
        }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn args(msg: impl Into<String>) -> Self {
        Self {
            code: EXIT_USAGE,
            message: msg.into(),
            hint: None,
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self {
            code: EXIT_INVALID_CONFIG,
            message: msg.into(),
            hint: None,
        }
    }

    pub fn runtime(msg: impl Into<String>) -> Self {
        Self {
            code: EXIT_RUNTIME,
            message: msg.into(),
            hint: None,
        }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}
