//! Per-pair fetch outcomes and error classification.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::amount::Amount;
use crate::entity::{EntityId, Epoch};

/// Transport-level failure class.
///
/// Distinct from a zero payout: an error means nothing is known about the
/// pair, so it is never cached and is retried on the next run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorClass {
    /// Service unreachable, refused, or answered with something unusable.
    ConnectionError,
    /// The call exceeded its time budget.
    TimeoutError,
}

impl ErrorClass {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::ConnectionError => "connection error",
            Self::TimeoutError => "timeout",
        }
    }
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Result of resolving one (validator, epoch) pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum Outcome {
    Amount(Amount),
    Failed(ErrorClass),
}

impl Outcome {
    #[must_use]
    pub fn amount(self) -> Option<Amount> {
        match self {
            Self::Amount(amount) => Some(amount),
            Self::Failed(_) => None,
        }
    }

    #[must_use]
    pub fn is_success(self) -> bool {
        matches!(self, Self::Amount(_))
    }
}

/// Where a result came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    Cache,
    Remote,
}

/// One resolved (validator, epoch) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchResult {
    pub entity: EntityId,
    pub epoch: Epoch,
    pub outcome: Outcome,
    pub origin: Origin,
}

impl FetchResult {
    pub fn cached(entity: EntityId, epoch: Epoch, amount: Amount) -> Self {
        Self {
            entity,
            epoch,
            outcome: Outcome::Amount(amount),
            origin: Origin::Cache,
        }
    }

    pub fn remote(entity: EntityId, epoch: Epoch, outcome: Outcome) -> Self {
        Self {
            entity,
            epoch,
            outcome,
            origin: Origin::Remote,
        }
    }
}

/// Count of failed calls per error class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorTally {
    pub connection: usize,
    pub timeout: usize,
}

impl ErrorTally {
    pub fn record(&mut self, class: ErrorClass) {
        match class {
            ErrorClass::ConnectionError => self.connection += 1,
            ErrorClass::TimeoutError => self.timeout += 1,
        }
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.connection + self.timeout
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Connection errors take precedence: they call for a connectivity check
    /// rather than a plain retry.
    #[must_use]
    pub fn dominant(&self) -> Option<ErrorClass> {
        if self.connection > 0 {
            Some(ErrorClass::ConnectionError)
        } else if self.timeout > 0 {
            Some(ErrorClass::TimeoutError)
        } else {
            None
        }
    }
}
