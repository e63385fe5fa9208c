//! Scripted in-memory data source shared by the integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use vwm_core::MonitorConfig;
use vwm_model::{Amount, EntityId, Epoch, ErrorClass, Identity};
use vwm_source::{ExchangeRateSource, RemoteDataSource, SourceError};

type Scripted<T> = Result<T, ErrorClass>;

/// Answers from a script and counts every call.
///
/// Unscripted withdrawal pairs answer zero, unscripted identities answer
/// "none".
pub struct ScriptedSource {
    withdrawals: Mutex<HashMap<(EntityId, Epoch), Scripted<f64>>>,
    identities: Mutex<HashMap<EntityId, Scripted<Option<String>>>>,
    current_epoch: Mutex<Scripted<Epoch>>,
    usd_rate: Mutex<Scripted<f64>>,
    delay: Duration,

    pair_calls: Mutex<HashMap<(EntityId, Epoch), usize>>,
    withdrawal_calls: AtomicUsize,
    identity_calls: AtomicUsize,
    epoch_calls: AtomicUsize,
    rate_calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedSource {
    pub fn new(current_epoch: Epoch) -> Self {
        Self {
            withdrawals: Mutex::new(HashMap::new()),
            identities: Mutex::new(HashMap::new()),
            current_epoch: Mutex::new(Ok(current_epoch)),
            usd_rate: Mutex::new(Ok(25.0)),
            delay: Duration::ZERO,
            pair_calls: Mutex::new(HashMap::new()),
            withdrawal_calls: AtomicUsize::new(0),
            identity_calls: AtomicUsize::new(0),
            epoch_calls: AtomicUsize::new(0),
            rate_calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    /// Every withdrawal call takes at least `delay`.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn withdrawal(self, entity: &str, epoch: Epoch, result: Scripted<f64>) -> Self {
        self.set_withdrawal(entity, epoch, result);
        self
    }

    pub fn set_withdrawal(&self, entity: &str, epoch: Epoch, result: Scripted<f64>) {
        self.withdrawals
            .lock()
            .unwrap()
            .insert((EntityId::new(entity), epoch), result);
    }

    pub fn identity(self, entity: &str, result: Scripted<Option<&str>>) -> Self {
        self.set_identity(entity, result);
        self
    }

    pub fn set_identity(&self, entity: &str, result: Scripted<Option<&str>>) {
        self.identities.lock().unwrap().insert(
            EntityId::new(entity),
            result.map(|found| found.map(String::from)),
        );
    }

    pub fn set_current_epoch(&self, result: Scripted<Epoch>) {
        *self.current_epoch.lock().unwrap() = result;
    }

    pub fn set_usd_rate(&self, result: Scripted<f64>) {
        *self.usd_rate.lock().unwrap() = result;
    }

    pub fn withdrawal_calls(&self) -> usize {
        self.withdrawal_calls.load(Ordering::SeqCst)
    }

    pub fn calls_for(&self, entity: &str, epoch: Epoch) -> usize {
        self.pair_calls
            .lock()
            .unwrap()
            .get(&(EntityId::new(entity), epoch))
            .copied()
            .unwrap_or(0)
    }

    pub fn identity_calls(&self) -> usize {
        self.identity_calls.load(Ordering::SeqCst)
    }

    pub fn epoch_calls(&self) -> usize {
        self.epoch_calls.load(Ordering::SeqCst)
    }

    pub fn rate_calls(&self) -> usize {
        self.rate_calls.load(Ordering::SeqCst)
    }

    pub fn total_calls(&self) -> usize {
        self.withdrawal_calls() + self.identity_calls() + self.epoch_calls() + self.rate_calls()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

fn to_error(class: ErrorClass) -> SourceError {
    match class {
        ErrorClass::TimeoutError => SourceError::Timeout,
        ErrorClass::ConnectionError => SourceError::Connection("scripted refusal".to_string()),
    }
}

impl RemoteDataSource for ScriptedSource {
    async fn fetch_identity(&self, entity: &EntityId) -> vwm_source::Result<Option<Identity>> {
        self.identity_calls.fetch_add(1, Ordering::SeqCst);
        let scripted = self
            .identities
            .lock()
            .unwrap()
            .get(entity)
            .cloned()
            .unwrap_or(Ok(None));
        scripted
            .map(|found| found.map(Identity::new))
            .map_err(to_error)
    }

    async fn fetch_withdrawal(&self, entity: &EntityId, epoch: Epoch) -> vwm_source::Result<Amount> {
        self.withdrawal_calls.fetch_add(1, Ordering::SeqCst);
        *self
            .pair_calls
            .lock()
            .unwrap()
            .entry((entity.clone(), epoch))
            .or_insert(0) += 1;

        let open = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(open, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let scripted = self
            .withdrawals
            .lock()
            .unwrap()
            .get(&(entity.clone(), epoch))
            .copied()
            .unwrap_or(Ok(0.0));
        scripted
            .map(|value| Amount::new(value).unwrap())
            .map_err(to_error)
    }

    async fn fetch_current_epoch(&self) -> vwm_source::Result<Epoch> {
        self.epoch_calls.fetch_add(1, Ordering::SeqCst);
        let scripted = *self.current_epoch.lock().unwrap();
        scripted.map_err(to_error)
    }
}

impl ExchangeRateSource for ScriptedSource {
    async fn fetch_usd_rate(&self) -> vwm_source::Result<f64> {
        self.rate_calls.fetch_add(1, Ordering::SeqCst);
        let scripted = *self.usd_rate.lock().unwrap();
        scripted.map_err(to_error)
    }
}

/// Defaults with no submission spacing, so tests run fast.
pub fn fast_config(max_concurrency: usize) -> MonitorConfig {
    let mut config = MonitorConfig::default();
    config.fetch.max_concurrency = max_concurrency;
    config.fetch.min_submit_interval_ms = 0;
    config
}

pub fn ids(names: &[&str]) -> Vec<EntityId> {
    names.iter().copied().map(EntityId::new).collect()
}

pub fn dash(value: f64) -> Amount {
    Amount::new(value).unwrap()
}
