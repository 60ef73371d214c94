//! CLI argument parsing using clap derive API
//!
//! This module defines the command-line interface structure using clap's
//! derive macros. It is purely declarative with no side effects or I/O.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Provost -- provenance-based license scan orchestration.
///
/// Use `provost <COMMAND> --help` for subcommand details.
#[derive(Parser, Debug)]
#[command(name = "provost", version, about, long_about = None)]
pub struct Cli {
    /// Path to the provost.toml configuration file.
    #[arg(short, long, default_value = "provost.toml")]
    pub config: PathBuf,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Log format (pretty, json).
    #[arg(long, global = true, default_value = "pretty")]
    pub log_format: LogFormat,

    /// Output format.
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Supported log formats.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogFormat {
    /// Human-readable log lines.
    Pretty,
    /// Structured JSON log lines.
    Json,
}

/// Supported output formats.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// Machine-readable JSON.
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scan the packages listed in an analyzer result file.
    Scan(ScanArgs),

    /// Manage configuration.
    Config(ConfigArgs),
}

// ---- scan ----

/// Run a provenance-based scan over a package list.
#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Path to the analyzer result file (JSON with a "packages" array).
    #[arg(short, long)]
    pub input: PathBuf,

    /// Write the scan record to this file instead of stdout.
    #[arg(short = 'o', long)]
    pub output_file: Option<PathBuf>,

    /// Emit one flattened result per package and scanner, with
    /// sub-repository paths re-prefixed, instead of the raw record.
    #[arg(long)]
    pub merged: bool,
}

// ---- config ----

/// Manage provost configuration.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Validate the configuration file and report errors.
    Validate,
    /// Show the effective configuration (file + env overrides + defaults).
    Show {
        /// Show only a specific section (general, downloader, storage,
        /// archiver, scanner).
        #[arg(long)]
        section: Option<String>,
    },
}
