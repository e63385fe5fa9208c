//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "vwm",
    version,
    about = "Validator withdrawals monitor - per-epoch payout totals for validators",
    long_about = "Fetch and total the withdrawals paid to a set of validators, epoch by epoch.\n\n\
                  Results are cached on disk: historical epochs are fetched once, failed\n\
                  lookups are retried on the next run."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Configuration file (default: platform config directory).
    #[arg(long = "config", value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Cache directory (overrides the config file).
    #[arg(long = "cache-dir", value_name = "DIR", global = true)]
    pub cache_dir: Option<PathBuf>,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format.
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Total withdrawals for validators from a start epoch to the current one.
    Report(ReportArgs),

    /// Print the latest epoch known to the service.
    CurrentEpoch,
}

#[derive(Args)]
pub struct ReportArgs {
    /// Validator identifiers.
    #[arg(value_name = "VALIDATOR")]
    pub validators: Vec<String>,

    /// File with one validator per line; blank lines are ignored.
    #[arg(long = "validators-file", value_name = "PATH")]
    pub validators_file: Option<PathBuf>,

    /// First epoch to include (raised to the earliest epoch with data).
    #[arg(long = "start-epoch", value_name = "N", allow_negative_numbers = true)]
    pub start_epoch: Option<i64>,

    /// Print the report as JSON instead of tables.
    #[arg(long = "json")]
    pub json: bool,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
