//! Inclusive epoch intervals.

use serde::{Deserialize, Serialize};

use crate::entity::Epoch;

/// Inclusive epoch interval `[start, end]`.
///
/// Empty when `start > end`; an empty range is valid and simply yields no
/// epochs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EpochRange {
    start: Epoch,
    end: Epoch,
}

impl EpochRange {
    #[must_use]
    pub const fn new(start: Epoch, end: Epoch) -> Self {
        Self { start, end }
    }

    /// Degenerate range covering exactly one epoch.
    #[must_use]
    pub const fn single(epoch: Epoch) -> Self {
        Self::new(epoch, epoch)
    }

    #[must_use]
    pub const fn start(&self) -> Epoch {
        self.start
    }

    #[must_use]
    pub const fn end(&self) -> Epoch {
        self.end
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.start > self.end
    }

    #[must_use]
    pub fn len(&self) -> usize {
        if self.is_empty() {
            0
        } else {
            usize::try_from(self.end - self.start).map_or(usize::MAX, |n| n.saturating_add(1))
        }
    }

    #[must_use]
    pub const fn contains(&self, epoch: Epoch) -> bool {
        epoch >= self.start && epoch <= self.end
    }

    pub fn iter(&self) -> impl Iterator<Item = Epoch> + use<> {
        self.start..=self.end
    }
}

impl IntoIterator for EpochRange {
    type Item = Epoch;
    type IntoIter = std::ops::RangeInclusive<Epoch>;

    fn into_iter(self) -> Self::IntoIter {
        self.start..=self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_inclusive_len() {
        let range = EpochRange::new(6, 10);
        assert_eq!(range.len(), 5);
        assert_eq!(range.iter().collect::<Vec<_>>(), vec![6, 7, 8, 9, 10]);
        assert!(range.contains(6));
        assert!(range.contains(10));
        assert!(!range.contains(11));
    }

    #[test]
    fn test_empty_range() {
        let range = EpochRange::new(12, 10);
        assert!(range.is_empty());
        assert_eq!(range.len(), 0);
        assert_eq!(range.iter().count(), 0);
        assert!(!range.contains(11));
    }

    #[test]
    fn test_single() {
        let range = EpochRange::single(6);
        assert_eq!(range.len(), 1);
        assert_eq!(range.start(), range.end());
    }

    proptest! {
        #[test]
        fn prop_len_matches_contained_epochs(start in 0u64..200, end in 0u64..200) {
            let range = EpochRange::new(start, end);
            let epochs: Vec<Epoch> = range.iter().collect();

            prop_assert_eq!(range.len(), epochs.len());
            prop_assert_eq!(range.is_empty(), epochs.is_empty());
            prop_assert!(epochs.iter().all(|epoch| range.contains(*epoch)));
            for epoch in 0u64..210 {
                prop_assert_eq!(range.contains(epoch), epochs.contains(&epoch));
            }
        }
    }
}
