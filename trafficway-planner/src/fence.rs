//! Sequence-number fencing for overlapping asynchronous requests.

use std::cell::Cell;

/// Issues strictly increasing sequence numbers and recognises the latest.
///
/// A response may update visible state only when [`SequenceFence::is_current`]
/// holds for the number it was issued with. Issuing a new number voids every
/// earlier one, whether or not its request is still in flight.
///
/// # Examples
///
/// ```
/// use trafficway_planner::SequenceFence;
///
/// let fence = SequenceFence::default();
/// let first = fence.issue();
/// let second = fence.issue();
/// assert!(!fence.is_current(first));
/// assert!(fence.is_current(second));
/// ```
#[derive(Debug, Default)]
pub struct SequenceFence {
    latest: Cell<u64>,
}

impl SequenceFence {
    /// Issue the next sequence number, voiding all earlier ones.
    pub fn issue(&self) -> u64 {
        let next = self.latest.get().saturating_add(1);
        self.latest.set(next);
        next
    }

    /// Whether `sequence_number` is the most recently issued one.
    #[must_use]
    pub fn is_current(&self, sequence_number: u64) -> bool {
        sequence_number != 0 && self.latest.get() == sequence_number
    }

    /// Most recently issued sequence number; zero before the first issue.
    #[must_use]
    pub fn latest(&self) -> u64 {
        self.latest.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    #[rstest]
    fn nothing_is_current_before_first_issue() {
        let fence = SequenceFence::default();
        assert!(!fence.is_current(0));
        assert_eq!(fence.latest(), 0);
    }

    proptest! {
        #[test]
        fn only_the_last_issued_number_is_current(issues in 1usize..50) {
            let fence = SequenceFence::default();
            let issued: Vec<u64> = (0..issues).map(|_| fence.issue()).collect();
            let current: Vec<&u64> = issued.iter().filter(|n| fence.is_current(**n)).collect();
            prop_assert_eq!(current, vec![issued.last().unwrap_or(&0)]);
            prop_assert!(issued.windows(2).all(|pair| pair.first() < pair.last()));
        }
    }
}
