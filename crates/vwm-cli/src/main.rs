//! Validator withdrawals monitor CLI.

use std::io::{self, IsTerminal};

use anyhow::Result;
use clap::{ColorChoice, Parser};
use tracing::level_filters::LevelFilter;

use vwm_cli::logging::{LogConfig, LogFormat, init_logging};
use vwm_cli::render::{print_report, print_unavailable};
use vwm_model::ReportOutcome;

mod cli;
mod commands;

use crate::cli::{Cli, Command, LogFormatArg, LogLevelArg, ReportArgs};
use crate::commands::{load_config, run_current_epoch, run_report};

/// Exit code when the service could not be reached at all.
const EXIT_UNAVAILABLE: i32 = 2;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }

    let exit_code = match run(&cli).await {
        Ok(code) => code,
        Err(error) => {
            eprintln!("error: {error:#}");
            1
        }
    };
    std::process::exit(exit_code);
}

async fn run(cli: &Cli) -> Result<i32> {
    let config = load_config(cli)?;
    match &cli.command {
        Command::Report(args) => {
            let outcome = run_report(args, &config).await?;
            emit_report(args, &outcome)
        }
        Command::CurrentEpoch => {
            let epoch = run_current_epoch(&config).await?;
            println!("{epoch}");
            Ok(0)
        }
    }
}

fn emit_report(args: &ReportArgs, outcome: &ReportOutcome) -> Result<i32> {
    if args.json {
        println!("{}", serde_json::to_string_pretty(outcome)?);
    }
    match outcome {
        ReportOutcome::Ready(report) => {
            if !args.json {
                print_report(report);
            }
            Ok(0)
        }
        ReportOutcome::Unavailable(unavailable) => {
            print_unavailable(unavailable);
            Ok(EXIT_UNAVAILABLE)
        }
    }
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        ..LogConfig::default()
    };
    config.use_env_filter = !(cli.verbosity.is_present() || cli.log_level.is_some());
    if let Some(level) = cli.log_level {
        config.level_filter = match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        };
    }
    config.format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    config.log_file = cli.log_file.clone();
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}
