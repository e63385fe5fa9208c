//! Remote data sources for validator withdrawal monitoring.
//!
//! [`RemoteDataSource`] is the seam the fetch pipeline depends on. Every
//! call resolves to a known value or to a [`SourceError`] whose
//! [`class`](SourceError::class) tells a timeout from an unreachable
//! service. Malformed answers are classified as connection errors so they
//! are never cached as data.
//!
//! [`HttpDataSource`] implements it against the platform explorer API:
//!
//! - `GET <base>/validator/<id>` - identity (`identity` field)
//! - `GET <base>/validator/<id>/withdrawals?epoch=<n>` - payouts (`resultSet[].amount`, credits)
//! - `GET <base>/status` - current epoch (`epoch.number`)
//!
//! and [`ExchangeRateSource`] against a plain-text DASH/USD ticker.

pub mod config;
pub mod error;
pub mod http;
pub mod traits;
pub mod wire;

pub use config::SourceSettings;
pub use error::{Result, SourceError};
pub use http::HttpDataSource;
pub use traits::{ExchangeRateSource, RemoteDataSource};
