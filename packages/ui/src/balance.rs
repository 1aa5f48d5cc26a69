//! Contribution cycle arithmetic for the balance card.

/// How far a member is through their contribution schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CycleProgress {
    /// Full cycles paid.
    pub cycles: u64,
    /// Progress through the current cycle, 0..=100.
    pub percent: u8,
}

/// `contributions / amount` full cycles, plus the remainder as a percentage of one cycle.
/// A zero `contribution_amount` gives `(0, 0)`.
pub fn cycle_progress(contributions: u64, contribution_amount: u64) -> CycleProgress {
    if contribution_amount == 0 {
        return CycleProgress::default();
    }
    let cycles = contributions / contribution_amount;
    let remainder = contributions % contribution_amount;
    let percent = (u128::from(remainder) * 100 / u128::from(contribution_amount)).min(100);
    CycleProgress {
        cycles,
        percent: percent as u8,
    }
}

/// Amount still owed to close the current cycle.
pub fn remaining_in_cycle(contributions: u64, contribution_amount: u64) -> u64 {
    if contribution_amount == 0 {
        return 0;
    }
    match contributions % contribution_amount {
        0 => contribution_amount,
        paid => contribution_amount - paid,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_progress() {
        assert_eq!(
            cycle_progress(12_500, 5_000),
            CycleProgress {
                cycles: 2,
                percent: 50
            }
        );
        assert_eq!(
            cycle_progress(15_000, 5_000),
            CycleProgress {
                cycles: 3,
                percent: 0
            }
        );
        assert_eq!(
            cycle_progress(999, 1_000),
            CycleProgress {
                cycles: 0,
                percent: 99
            }
        );
    }

    #[test]
    fn test_zero_amount() {
        assert_eq!(cycle_progress(12_500, 0), CycleProgress::default());
        assert_eq!(remaining_in_cycle(12_500, 0), 0);
    }

    #[test]
    fn test_remaining_in_cycle() {
        assert_eq!(remaining_in_cycle(12_500, 5_000), 2_500);
        assert_eq!(remaining_in_cycle(10_000, 5_000), 5_000);
    }
}
