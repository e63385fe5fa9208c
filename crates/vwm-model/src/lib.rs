//! Domain types for validator withdrawal monitoring.
//!
//! These types are shared by the cache, the remote data source and the
//! fetch pipeline:
//!
//! - [`EntityId`] and [`Identity`] - opaque validator tokens
//! - [`Amount`] - non-negative payout in native token units
//! - [`Outcome`] and [`FetchResult`] - per-(validator, epoch) fetch results
//! - [`EpochRange`] - inclusive epoch interval, possibly empty
//! - [`AggregateReport`] and [`UnavailableReport`] - what callers receive

mod amount;
mod entity;
mod outcome;
mod range;
mod report;

pub use amount::{Amount, AmountError, CREDITS_PER_DASH};
pub use entity::{EntityId, Epoch, Identity};
pub use outcome::{ErrorClass, ErrorTally, FetchResult, Origin, Outcome};
pub use range::EpochRange;
pub use report::{AggregateReport, FailedPair, ReportOutcome, UnavailableReport, Valuation};
