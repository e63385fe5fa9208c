//! Folding fetch results into a report.

use std::collections::{BTreeMap, HashSet};

use vwm_model::{
    AggregateReport, Amount, EntityId, Epoch, EpochRange, ErrorTally, FailedPair, FetchResult,
    Outcome, UnavailableReport,
};

use crate::fetcher::FetchStats;

/// Pure aggregation over fetch results.
pub struct Aggregator;

impl Aggregator {
    /// Build the report for `validators` over `range`.
    ///
    /// Every requested validator gets a total, zero if nothing succeeded for
    /// it. Failed pairs are listed but contribute nothing. Results for other
    /// validators or outside `range` are ignored, as are repeats of a pair
    /// already seen.
    #[must_use]
    pub fn aggregate(
        results: &[FetchResult],
        validators: &[EntityId],
        range: EpochRange,
        current_epoch: Epoch,
    ) -> AggregateReport {
        let mut validator_totals: BTreeMap<EntityId, Amount> = validators
            .iter()
            .map(|entity| (entity.clone(), Amount::ZERO))
            .collect();
        let mut withdrawals: BTreeMap<EntityId, BTreeMap<Epoch, Amount>> = BTreeMap::new();
        let mut failures = Vec::new();
        let mut errors = ErrorTally::default();
        let mut seen = HashSet::new();

        for result in results {
            let Some(total) = validator_totals.get_mut(&result.entity) else {
                continue;
            };
            if !range.contains(result.epoch) || !seen.insert((&result.entity, result.epoch)) {
                continue;
            }
            match result.outcome {
                Outcome::Amount(amount) => {
                    *total += amount;
                    withdrawals
                        .entry(result.entity.clone())
                        .or_default()
                        .insert(result.epoch, amount);
                }
                Outcome::Failed(error) => {
                    errors.record(error);
                    failures.push(FailedPair {
                        entity: result.entity.clone(),
                        epoch: result.epoch,
                        error,
                    });
                }
            }
        }

        failures.sort();
        let grand_total = validator_totals.values().sum();
        let populated = populated_range(&withdrawals);

        AggregateReport {
            validator_totals,
            grand_total,
            withdrawals,
            failures,
            errors,
            epoch_range: range,
            populated,
            current_epoch,
            identities: BTreeMap::new(),
            valuation: None,
        }
    }

    /// Report for a run where nothing succeeded, pinned to `start`.
    #[must_use]
    pub fn unavailable(stats: &FetchStats, start: Epoch) -> UnavailableReport {
        UnavailableReport {
            errors: stats.errors,
            epoch_range: EpochRange::single(start),
            attempted: stats.remote_calls,
        }
    }
}

fn populated_range(withdrawals: &BTreeMap<EntityId, BTreeMap<Epoch, Amount>>) -> Option<EpochRange> {
    let mut epochs = withdrawals.values().flat_map(BTreeMap::keys).copied();
    let first = epochs.next()?;
    let (min, max) = epochs.fold((first, first), |(min, max), epoch| {
        (min.min(epoch), max.max(epoch))
    });
    Some(EpochRange::new(min, max))
}
