//! Durable cache for validator withdrawal data.
//!
//! Historical facts (a payout for a closed epoch, a validator's identity) are
//! stored once and never overwritten. Refreshable facts (the current epoch,
//! exchange rates) are stored with an explicit expiry checked on read.
//!
//! # On-disk layout
//!
//! ```text
//! <root>/
//!   records/
//!     withdrawal-<sha256>.json   one file per (validator, epoch)
//!     identity-<sha256>.json     one file per validator
//!   refreshable/
//!     current_epoch.json         value + expires_at
//!     rate-dash-usd.json
//! ```
//!
//! Writes are atomic (temp file + rename). Missing or corrupt files are
//! skipped with a warning and the affected keys simply miss.
//!
//! # Architecture
//!
//! - `key.rs` - cache keys, entries and deterministic file naming
//! - `store.rs` - the concurrent [`CacheStore`]
//! - `refresh.rs` - time-boxed records
//! - `io.rs` - atomic writes and record loading
//! - `error.rs` - error types with user-friendly messages

mod error;
mod io;
mod key;
mod refresh;
mod store;

pub use error::{CacheError, Result};
pub use key::{CacheEntry, CacheKey};
pub use refresh::RefreshKey;
pub use store::{CacheStore, PutOutcome};
