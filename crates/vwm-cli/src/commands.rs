use anyhow::{Context, Result};

use vwm_cli::input::collect_validators;
use vwm_core::{MonitorConfig, WithdrawalService};
use vwm_model::{Epoch, ReportOutcome};
use vwm_source::HttpDataSource;

use crate::cli::{Cli, ReportArgs};

/// Config from `--config` (errors are fatal) or the default location
/// (errors degrade to defaults), with `--cache-dir` applied on top.
pub fn load_config(cli: &Cli) -> Result<MonitorConfig> {
    let mut config = match &cli.config {
        Some(path) => MonitorConfig::load(path)
            .with_context(|| format!("load config {}", path.display()))?,
        None => MonitorConfig::load_default(),
    };
    if let Some(dir) = &cli.cache_dir {
        config.cache.dir = Some(dir.clone());
    }
    Ok(config)
}

pub async fn run_report(args: &ReportArgs, config: &MonitorConfig) -> Result<ReportOutcome> {
    let validators = collect_validators(&args.validators, args.validators_file.as_deref())?;
    let service = build_service(config)?;
    Ok(service
        .compute_withdrawal_report(&validators, args.start_epoch)
        .await)
}

pub async fn run_current_epoch(config: &MonitorConfig) -> Result<Epoch> {
    let service = build_service(config)?;
    service
        .current_epoch()
        .await
        .context("fetch current epoch")
}

fn build_service(config: &MonitorConfig) -> Result<WithdrawalService<HttpDataSource>> {
    WithdrawalService::<HttpDataSource>::from_config(config).context("create HTTP client")
}
