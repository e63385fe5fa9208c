//! Withdrawal monitoring pipeline.
//!
//! [`WithdrawalService::compute_withdrawal_report`] resolves the epoch range,
//! fetches every validator x epoch pair cache-first through the
//! [`BoundedFetcher`], and folds the results into a report with the
//! [`Aggregator`].
//!
//! # Architecture
//!
//! - `config.rs` - [`MonitorConfig`] loaded from TOML
//! - `resolver.rs` - start defaulting and floor clamping
//! - `limiter.rs` - minimum spacing between submissions
//! - `fetcher.rs` - semaphore-bounded fetch with result caching
//! - `aggregate.rs` - totals, failures and the unavailable report
//! - `service.rs` - the entry point plus identity, current epoch and valuation

pub mod aggregate;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod limiter;
pub mod resolver;
pub mod service;

pub use aggregate::Aggregator;
pub use config::{CacheSettings, EpochSettings, FetchSettings, MonitorConfig};
pub use error::{ConfigError, CoreError, Result};
pub use fetcher::{BoundedFetcher, FetchRun, FetchStats};
pub use limiter::RateLimiter;
pub use resolver::EpochRangeResolver;
pub use service::WithdrawalService;
