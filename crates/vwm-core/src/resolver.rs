//! Epoch range resolution.

use vwm_model::{Epoch, EpochRange};

use crate::config::EpochSettings;

/// Turns a caller-supplied start and a discovered current epoch into the
/// inclusive range to query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EpochRangeResolver {
    floor: Epoch,
    default_start: Epoch,
}

impl EpochRangeResolver {
    #[must_use]
    pub const fn new(floor: Epoch, default_start: Epoch) -> Self {
        Self {
            floor,
            default_start,
        }
    }

    #[must_use]
    pub const fn floor(&self) -> Epoch {
        self.floor
    }

    /// Start epoch after defaulting and clamping.
    ///
    /// A missing or non-positive request falls back to the default start;
    /// anything below the floor is raised to it.
    #[must_use]
    pub fn start_epoch(&self, requested: Option<i64>) -> Epoch {
        let start = requested
            .filter(|start| *start >= 1)
            .and_then(|start| Epoch::try_from(start).ok())
            .unwrap_or(self.default_start);
        start.max(self.floor)
    }

    /// `[max(floor, start), current]`, empty when the start is past `current`.
    #[must_use]
    pub fn resolve(&self, requested: Option<i64>, current: Epoch) -> EpochRange {
        EpochRange::new(self.start_epoch(requested), current)
    }
}

impl From<&EpochSettings> for EpochRangeResolver {
    fn from(settings: &EpochSettings) -> Self {
        Self::new(settings.floor, settings.default_start)
    }
}
