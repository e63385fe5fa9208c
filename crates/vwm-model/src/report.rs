//! Report shapes returned to callers.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::amount::Amount;
use crate::entity::{EntityId, Epoch, Identity};
use crate::outcome::{ErrorClass, ErrorTally};
use crate::range::EpochRange;

/// A pair that could not be resolved in this run.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FailedPair {
    pub entity: EntityId,
    pub epoch: Epoch,
    pub error: ErrorClass,
}

/// Fiat value of the grand total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Valuation {
    /// Quote currency code, e.g. `USD`.
    pub currency: String,
    /// Price of one native token in the quote currency.
    pub rate: f64,
    pub grand_total_fiat: f64,
}

impl Valuation {
    pub fn new(currency: impl Into<String>, rate: f64, grand_total: Amount) -> Self {
        Self {
            currency: currency.into(),
            rate,
            grand_total_fiat: grand_total.value() * rate,
        }
    }
}

/// Aggregated withdrawals for a set of validators over an epoch range.
///
/// `grand_total` always equals the sum of `validator_totals`, and every
/// requested validator is a key of `validator_totals`, with zero when nothing
/// was fetched for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateReport {
    pub validator_totals: BTreeMap<EntityId, Amount>,
    pub grand_total: Amount,
    /// Successful outcomes per validator and epoch.
    pub withdrawals: BTreeMap<EntityId, BTreeMap<Epoch, Amount>>,
    /// Pairs that errored; excluded from every total.
    pub failures: Vec<FailedPair>,
    pub errors: ErrorTally,
    /// The resolved `[start, current]` range.
    pub epoch_range: EpochRange,
    /// Smallest range covering every epoch with at least one success.
    pub populated: Option<EpochRange>,
    pub current_epoch: Epoch,
    pub identities: BTreeMap<EntityId, Identity>,
    pub valuation: Option<Valuation>,
}

impl AggregateReport {
    #[must_use]
    pub fn is_partial(&self) -> bool {
        !self.failures.is_empty()
    }

    #[must_use]
    pub fn total_for(&self, entity: &EntityId) -> Option<Amount> {
        self.validator_totals.get(entity).copied()
    }

    #[must_use]
    pub fn amount_at(&self, entity: &EntityId, epoch: Epoch) -> Option<Amount> {
        self.withdrawals
            .get(entity)
            .and_then(|epochs| epochs.get(&epoch))
            .copied()
    }
}

/// Returned instead of a report when every attempted call failed.
///
/// Scoped to a single epoch so nothing downstream mistakes it for an
/// authoritative "zero everywhere" answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnavailableReport {
    pub errors: ErrorTally,
    pub epoch_range: EpochRange,
    /// Number of remote calls that were attempted.
    pub attempted: usize,
}

impl UnavailableReport {
    /// Human-actionable guidance for the dominant error class.
    #[must_use]
    pub fn guidance(&self) -> &'static str {
        match self.errors.dominant() {
            Some(ErrorClass::TimeoutError) => {
                "Could not reach the data service: the request timed out. Please try again later."
            }
            Some(ErrorClass::ConnectionError) | None => {
                "Could not connect to the data service. Please check your internet connection and try again later."
            }
        }
    }
}

/// Outcome of one report computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ReportOutcome {
    Ready(AggregateReport),
    Unavailable(UnavailableReport),
}

impl ReportOutcome {
    #[must_use]
    pub fn report(&self) -> Option<&AggregateReport> {
        match self {
            Self::Ready(report) => Some(report),
            Self::Unavailable(_) => None,
        }
    }

    #[must_use]
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}
