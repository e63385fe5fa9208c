//! The withdrawal report entry point.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::Duration;

use vwm_cache::{CacheEntry, CacheKey, CacheStore, RefreshKey};
use vwm_model::{
    Amount, EntityId, Epoch, EpochRange, ErrorTally, Identity, ReportOutcome, UnavailableReport,
    Valuation,
};
use vwm_source::{ExchangeRateSource, HttpDataSource, RemoteDataSource, SourceError};

use crate::aggregate::Aggregator;
use crate::config::MonitorConfig;
use crate::fetcher::BoundedFetcher;
use crate::resolver::EpochRangeResolver;

const NATIVE_TOKEN: &str = "DASH";
const FIAT_CURRENCY: &str = "USD";

/// Computes withdrawal reports against one data source and one cache.
///
/// Cheap to share behind an `Arc`; concurrent reports on the same service
/// share its concurrency cap.
pub struct WithdrawalService<S> {
    source: Arc<S>,
    cache: Arc<CacheStore>,
    fetcher: BoundedFetcher<S>,
    resolver: EpochRangeResolver,
    current_epoch_ttl: Duration,
    exchange_rate_ttl: Duration,
    absent_identity_ttl: Duration,
}

impl<S> WithdrawalService<S>
where
    S: RemoteDataSource + ExchangeRateSource,
{
    pub fn new(source: Arc<S>, cache: Arc<CacheStore>, config: &MonitorConfig) -> Self {
        let fetcher = BoundedFetcher::new(Arc::clone(&source), Arc::clone(&cache), &config.fetch);
        Self {
            source,
            cache,
            fetcher,
            resolver: EpochRangeResolver::from(&config.epochs),
            current_epoch_ttl: config.cache.current_epoch_ttl(),
            exchange_rate_ttl: config.cache.exchange_rate_ttl(),
            absent_identity_ttl: config.cache.absent_identity_ttl(),
        }
    }

    #[must_use]
    pub fn cache(&self) -> &CacheStore {
        &self.cache
    }

    #[must_use]
    pub fn resolver(&self) -> EpochRangeResolver {
        self.resolver
    }

    /// Compute withdrawals for `validators` from `start_epoch` through the
    /// current epoch.
    ///
    /// Never fails outright: when nothing at all could be fetched the result
    /// is [`ReportOutcome::Unavailable`], otherwise a report whose
    /// `failures` lists any pairs that errored.
    pub async fn compute_withdrawal_report(
        &self,
        validators: &[EntityId],
        start_epoch: Option<i64>,
    ) -> ReportOutcome {
        let start = self.resolver.start_epoch(start_epoch);

        let current = match self.current_epoch().await {
            Ok(epoch) => epoch,
            Err(err) => {
                tracing::warn!(error = %err, "Current epoch unavailable");
                let mut errors = ErrorTally::default();
                errors.record(err.class());
                return ReportOutcome::Unavailable(UnavailableReport {
                    errors,
                    epoch_range: EpochRange::single(start),
                    attempted: 1,
                });
            }
        };

        let range = self.resolver.resolve(start_epoch, current);
        tracing::info!(
            validators = validators.len(),
            start = range.start(),
            end = range.end(),
            "Computing withdrawal report"
        );

        let run = self.fetcher.fetch(validators, range).await;
        if run.all_failed() {
            let unavailable = Aggregator::unavailable(&run.stats, start);
            tracing::warn!(
                attempted = unavailable.attempted,
                "No withdrawal data could be fetched"
            );
            return ReportOutcome::Unavailable(unavailable);
        }

        let mut report = Aggregator::aggregate(&run.results, validators, range, current);
        report.identities = self.resolve_identities(validators).await;
        report.valuation = self.valuation(report.grand_total).await;
        ReportOutcome::Ready(report)
    }

    /// Latest epoch: fresh cache, else the service, else the last known value.
    pub async fn current_epoch(&self) -> Result<Epoch, SourceError> {
        let key = RefreshKey::CurrentEpoch;
        if let Some(epoch) = self.cache.get_fresh::<Epoch>(&key) {
            tracing::debug!(epoch, "Current epoch from cache");
            return Ok(epoch);
        }

        match self.fetcher.throttled(self.source.fetch_current_epoch()).await {
            Ok(epoch) => {
                if let Err(e) = self.cache.put_refreshable(key, &epoch, self.current_epoch_ttl) {
                    tracing::warn!(error = %e, "{}", e.user_message());
                }
                tracing::debug!(epoch, "Current epoch from service");
                Ok(epoch)
            }
            Err(err) => match self.cache.get_stale::<Epoch>(&key) {
                Some(epoch) => {
                    tracing::warn!(error = %err, epoch, "Using last known current epoch");
                    Ok(epoch)
                }
                None => Err(err),
            },
        }
    }

    /// Identities of `validators`, cache first.
    ///
    /// A lookup failure leaves the validator out and is retried next time.
    /// A cached "none registered" answer is asked again once it is older
    /// than the configured absent-identity TTL.
    pub async fn resolve_identities(&self, validators: &[EntityId]) -> BTreeMap<EntityId, Identity> {
        let mut identities = BTreeMap::new();
        let unique: BTreeSet<&EntityId> = validators.iter().collect();

        for entity in unique {
            let key = CacheKey::identity(entity.clone());
            match self.cache.get_current(&key, self.absent_identity_ttl) {
                Some(CacheEntry::Identity(identity)) => {
                    identities.insert(entity.clone(), identity);
                    continue;
                }
                Some(_) => continue,
                None => {}
            }

            match self.fetcher.throttled(self.source.fetch_identity(entity)).await {
                Ok(found) => {
                    let entry = match &found {
                        Some(identity) => CacheEntry::Identity(identity.clone()),
                        None => CacheEntry::Absent,
                    };
                    if let Err(e) = self.cache.put(key, entry) {
                        tracing::warn!(%entity, error = %e, "{}", e.user_message());
                    }
                    if let Some(identity) = found {
                        identities.insert(entity.clone(), identity);
                    }
                }
                Err(err) => {
                    tracing::warn!(
                        %entity,
                        error = %err,
                        retryable = err.is_retryable(),
                        "Identity lookup failed"
                    );
                }
            }
        }

        identities
    }

    /// Price of one DASH in USD: fresh cache, else the ticker, else stale.
    pub async fn usd_rate(&self) -> Option<f64> {
        let key = RefreshKey::exchange_rate(NATIVE_TOKEN, FIAT_CURRENCY);
        if let Some(rate) = self.cache.get_fresh::<f64>(&key) {
            return Some(rate);
        }

        match self.source.fetch_usd_rate().await {
            Ok(rate) => {
                if let Err(e) = self.cache.put_refreshable(key, &rate, self.exchange_rate_ttl) {
                    tracing::warn!(error = %e, "{}", e.user_message());
                }
                Some(rate)
            }
            Err(err) => {
                let stale = self.cache.get_stale::<f64>(&key);
                tracing::warn!(error = %err, stale = stale.is_some(), "Exchange rate unavailable");
                stale
            }
        }
    }

    async fn valuation(&self, grand_total: Amount) -> Option<Valuation> {
        let rate = self.usd_rate().await?;
        Some(Valuation::new(FIAT_CURRENCY, rate, grand_total))
    }
}

impl WithdrawalService<HttpDataSource> {
    /// Service over HTTP, caching under the configured directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the `[source]` settings cannot produce a client.
    pub fn from_config(config: &MonitorConfig) -> crate::Result<Self> {
        let source = HttpDataSource::new(&config.source)?;
        let cache_dir = config.cache.resolved_dir();
        tracing::debug!("Using cache at {}", cache_dir.display());
        let cache = CacheStore::open(cache_dir);
        Ok(Self::new(Arc::new(source), Arc::new(cache), config))
    }
}
