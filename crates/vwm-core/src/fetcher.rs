//! Bounded-concurrency fetch of validator x epoch pairs.

use std::collections::{BTreeSet, HashMap, VecDeque};
use std::future::Future;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::Instrument;

use vwm_cache::{CacheEntry, CacheKey, CacheStore, PutOutcome};
use vwm_model::{Amount, EntityId, Epoch, EpochRange, ErrorTally, FetchResult, Outcome};
use vwm_source::{RemoteDataSource, SourceError};

use crate::config::FetchSettings;
use crate::limiter::RateLimiter;

/// Counters for one fetch run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchStats {
    /// Distinct (validator, epoch) pairs requested.
    pub pairs: usize,
    pub cache_hits: usize,
    pub remote_calls: usize,
    pub remote_successes: usize,
    pub errors: ErrorTally,
}

/// Everything a fetch run produced, one result per distinct pair.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchRun {
    /// Sorted by validator, then epoch.
    pub results: Vec<FetchResult>,
    pub stats: FetchStats,
}

impl FetchRun {
    /// Pairs resolved to an amount, from cache or live.
    #[must_use]
    pub fn successes(&self) -> usize {
        self.results
            .iter()
            .filter(|result| result.outcome.is_success())
            .count()
    }

    /// Something was attempted and nothing at all succeeded.
    #[must_use]
    pub fn all_failed(&self) -> bool {
        !self.stats.errors.is_empty() && self.successes() == 0
    }
}

/// Fetches withdrawals cache-first, sending misses to the remote source with
/// at most `cap` calls open at once and submissions spaced by the limiter.
///
/// The cap is shared by every run on the same fetcher, so concurrent
/// callers cannot multiply the load on the service.
pub struct BoundedFetcher<S> {
    source: Arc<S>,
    cache: Arc<CacheStore>,
    permits: Arc<Semaphore>,
    limiter: Arc<RateLimiter>,
    cap: usize,
}

impl<S: RemoteDataSource> BoundedFetcher<S> {
    pub fn new(source: Arc<S>, cache: Arc<CacheStore>, settings: &FetchSettings) -> Self {
        let cap = settings.cap();
        Self {
            source,
            cache,
            permits: Arc::new(Semaphore::new(cap)),
            limiter: Arc::new(RateLimiter::new(settings.min_submit_interval())),
            cap,
        }
    }

    #[must_use]
    pub fn cap(&self) -> usize {
        self.cap
    }

    /// Run any other remote call under the same cap and spacing.
    pub async fn throttled<F: Future>(&self, call: F) -> F::Output {
        let _permit = self.permits.acquire().await.ok();
        self.limiter.acquire().await;
        call.await
    }

    /// Resolve every pair of `validators` x `range`.
    ///
    /// Successful live results are written to the cache; failures are
    /// tallied and returned but never cached.
    pub async fn fetch(&self, validators: &[EntityId], range: EpochRange) -> FetchRun {
        let pairs: BTreeSet<(EntityId, Epoch)> = validators
            .iter()
            .flat_map(|entity| range.iter().map(move |epoch| (entity.clone(), epoch)))
            .collect();

        let span = tracing::info_span!("fetch_withdrawals", pairs = pairs.len(), cap = self.cap);
        self.fetch_pairs(pairs).instrument(span).await
    }

    async fn fetch_pairs(&self, pairs: BTreeSet<(EntityId, Epoch)>) -> FetchRun {
        let mut stats = FetchStats {
            pairs: pairs.len(),
            ..FetchStats::default()
        };
        let mut results = Vec::with_capacity(pairs.len());
        let mut queue = VecDeque::new();

        for (entity, epoch) in pairs {
            let cached = self
                .cache
                .get(&CacheKey::withdrawal(entity.clone(), epoch))
                .and_then(|entry| entry.amount());
            match cached {
                Some(amount) => {
                    tracing::debug!(%entity, epoch, %amount, "cache hit");
                    stats.cache_hits += 1;
                    results.push(FetchResult::cached(entity, epoch, amount));
                }
                None => queue.push_back((entity, epoch)),
            }
        }

        tracing::debug!(
            "{} cache hits, {} pairs queued for the remote source",
            stats.cache_hits,
            queue.len()
        );

        let mut tasks = JoinSet::new();
        let mut in_flight = HashMap::new();

        loop {
            while tasks.len() < self.cap {
                let Some((entity, epoch)) = queue.pop_front() else {
                    break;
                };
                let handle = tasks.spawn(call_withdrawal(
                    Arc::clone(&self.source),
                    Arc::clone(&self.permits),
                    Arc::clone(&self.limiter),
                    entity.clone(),
                    epoch,
                ));
                in_flight.insert(handle.id(), (entity, epoch));
                stats.remote_calls += 1;
            }

            let Some(joined) = tasks.join_next_with_id().await else {
                break;
            };
            let (id, result) = match joined {
                Ok((id, result)) => (id, result),
                Err(err) => (
                    err.id(),
                    Err(SourceError::Connection(format!("fetch task failed: {err}"))),
                ),
            };
            if let Some((entity, epoch)) = in_flight.remove(&id) {
                results.push(self.record(entity, epoch, result, &mut stats));
            }
        }

        results.sort_by(|a, b| (&a.entity, a.epoch).cmp(&(&b.entity, b.epoch)));

        tracing::info!(
            cache_hits = stats.cache_hits,
            remote_calls = stats.remote_calls,
            remote_successes = stats.remote_successes,
            failed = stats.errors.total(),
            "fetch run complete"
        );

        FetchRun { results, stats }
    }

    fn record(
        &self,
        entity: EntityId,
        epoch: Epoch,
        result: Result<Amount, SourceError>,
        stats: &mut FetchStats,
    ) -> FetchResult {
        match result {
            Ok(amount) => {
                stats.remote_successes += 1;
                let key = CacheKey::withdrawal(entity.clone(), epoch);
                let amount = match self.cache.put(key.clone(), CacheEntry::Amount(amount)) {
                    Ok(PutOutcome::Stored) => amount,
                    // Another run committed first; report what the cache holds.
                    Ok(PutOutcome::Kept) => self
                        .cache
                        .get(&key)
                        .and_then(|entry| entry.amount())
                        .unwrap_or(amount),
                    Err(e) => {
                        tracing::warn!(%entity, epoch, error = %e, "{}", e.user_message());
                        amount
                    }
                };
                tracing::debug!(%entity, epoch, %amount, "fetched");
                FetchResult::remote(entity, epoch, Outcome::Amount(amount))
            }
            Err(err) => {
                let class = err.class();
                stats.errors.record(class);
                tracing::warn!(
                    %entity,
                    epoch,
                    error = %err,
                    retryable = err.is_retryable(),
                    "withdrawal fetch failed"
                );
                FetchResult::remote(entity, epoch, Outcome::Failed(class))
            }
        }
    }
}

async fn call_withdrawal<S: RemoteDataSource>(
    source: Arc<S>,
    permits: Arc<Semaphore>,
    limiter: Arc<RateLimiter>,
    entity: EntityId,
    epoch: Epoch,
) -> Result<Amount, SourceError> {
    let _permit = permits.acquire_owned().await.ok();
    limiter.acquire().await;
    source.fetch_withdrawal(&entity, epoch).await
}
