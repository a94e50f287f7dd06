//! Per-category cycle statistics with restart detection.
//!
//! Each category keeps running 64-bit sums, so the averages never overflow
//! no matter how long the loop runs. Alongside the raw average, samples that
//! look like the timed operation internally retried ("restarts") are summed
//! separately, giving a restart-excluded figure for bimodal operations such
//! as rejection-sampling signers.
//!
//! # Restart Rule
//!
//! A sample is a restart when it is strictly greater than 1.5x the
//! previous raw sample of the same category (`ref + (ref >> 1)`, floor
//! semantics). The reference always moves to the latest sample, restart or
//! not. The comparison is done in `u64` so references close to `u32::MAX`
//! cannot overflow.

/// Whether a category has seen any counted sample yet.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatState {
    Idle,
    Accumulating,
}

/// How one sample was classified.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SampleClass {
    Clean,
    Restart,
}

/// Running statistics for one category.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CategoryStat {
    total_sum: u64,
    count: u32,
    reference: Option<u32>,
    restart_sum: u64,
    restart_count: u32,
}

/// Derived report figures for one category. Never stored.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Summary {
    /// Samples counted.
    pub count: u32,
    /// Rounded mean over every sample.
    pub raw_average: u64,
    /// Rounded restart-excluded figure, on the same per-sample scale.
    pub clean_average: u64,
    /// Samples classified as restarts.
    pub restarts: u32,
}

/// Check the restart rule for `cycles` against `reference`.
#[inline]
pub const fn is_restart(
    reference: u32,
    cycles: u32,
) -> bool {
    let r = reference as u64;
    cycles as u64 > r + (r >> 1)
}

impl CategoryStat {
    /// Create an empty category.
    pub const fn new() -> Self {
        Self {
            total_sum: 0,
            count: 0,
            reference: None,
            restart_sum: 0,
            restart_count: 0,
        }
    }

    /// Current state of the category.
    #[inline]
    pub const fn state(&self) -> StatState {
        if self.count == 0 { StatState::Idle } else { StatState::Accumulating }
    }

    /// Set the restart baseline without counting a sample.
    #[inline]
    pub fn prime(
        &mut self,
        cycles: u32,
    ) {
        self.reference = Some(cycles);
    }

    /// Add one sample.
    ///
    /// With `detect_restarts` off, every sample is clean but the reference
    /// still tracks the latest value.
    pub fn record(
        &mut self,
        cycles: u32,
        detect_restarts: bool,
    ) -> SampleClass {
        self.total_sum = self.total_sum.saturating_add(u64::from(cycles));
        self.count = self.count.saturating_add(1);

        let class = match self.reference {
            Some(r) if detect_restarts && is_restart(r, cycles) => {
                self.restart_sum = self.restart_sum.saturating_add(u64::from(cycles));
                self.restart_count = self.restart_count.saturating_add(1);
                SampleClass::Restart
            }
            _ => SampleClass::Clean,
        };

        self.reference = Some(cycles);
        class
    }

    /// Sum of every sample.
    #[inline]
    pub const fn total_sum(&self) -> u64 { self.total_sum }

    /// Number of samples.
    #[inline]
    pub const fn count(&self) -> u32 { self.count }

    /// Most recent raw sample (or primed baseline).
    #[inline]
    pub const fn reference(&self) -> Option<u32> { self.reference }

    /// Sum of the samples classified as restarts.
    #[inline]
    pub const fn restart_sum(&self) -> u64 { self.restart_sum }

    /// Number of samples classified as restarts.
    #[inline]
    pub const fn restart_count(&self) -> u32 { self.restart_count }

    /// Rounded mean, `(sum + n/2) / n`. `None` before the first sample.
    pub fn raw_average(&self) -> Option<u64> {
        let n = u64::from(self.count);
        if n == 0 {
            return None;
        }
        Some((self.total_sum + (n >> 1)) / n)
    }

    /// Restart-excluded figure.
    ///
    /// Divides by the full sample count so it reads on the same
    /// per-iteration scale as [`raw_average`](Self::raw_average); rounding
    /// uses half the clean count. Zero when every sample was a restart.
    pub fn clean_average(&self) -> Option<u64> {
        let n = u64::from(self.count);
        if n == 0 {
            return None;
        }
        let restarts = u64::from(self.restart_count);
        if restarts == n {
            return Some(0);
        }
        let clean_sum = self.total_sum - self.restart_sum;
        Some((clean_sum + ((n - restarts) >> 1)) / n)
    }

    /// All report figures at once. `None` before the first sample.
    pub fn summary(&self) -> Option<Summary> {
        Some(Summary {
            count: self.count,
            raw_average: self.raw_average()?,
            clean_average: self.clean_average()?,
            restarts: self.restart_count,
        })
    }
}

/// Statistics for `C` categories of one measured phase.
#[derive(Clone, Debug)]
pub struct Statistics<const C: usize> {
    categories: [CategoryStat; C],
    detect_restarts: bool,
}

impl<const C: usize> Statistics<C> {
    /// Create empty statistics.
    pub const fn new(detect_restarts: bool) -> Self {
        Self {
            categories: [CategoryStat::new(); C],
            detect_restarts,
        }
    }

    /// Whether samples are checked against the restart rule.
    #[inline]
    pub const fn detects_restarts(&self) -> bool { self.detect_restarts }

    /// Add one sample to `category`. `None` if the category does not exist.
    pub fn record(
        &mut self,
        category: usize,
        cycles: u32,
    ) -> Option<SampleClass> {
        let detect = self.detect_restarts;
        self.categories.get_mut(category).map(|stat| stat.record(cycles, detect))
    }

    /// Seed the restart baseline of `category`.
    pub fn prime(
        &mut self,
        category: usize,
        cycles: u32,
    ) {
        if let Some(stat) = self.categories.get_mut(category) {
            stat.prime(cycles);
        }
    }

    /// Raw state of one category.
    #[inline]
    pub fn category(
        &self,
        category: usize,
    ) -> Option<&CategoryStat> {
        self.categories.get(category)
    }

    /// Report figures for one category.
    pub fn summary(
        &self,
        category: usize,
    ) -> Option<Summary> {
        self.category(category).and_then(CategoryStat::summary)
    }

    /// Iterate over all categories in index order.
    pub fn iter(&self) -> impl Iterator<Item = &CategoryStat> { self.categories.iter() }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_new_is_idle() {
        let stat = CategoryStat::new();
        assert_eq!(stat.state(), StatState::Idle);
        assert_eq!(stat.raw_average(), None);
        assert_eq!(stat.clean_average(), None);
        assert!(stat.summary().is_none());
    }

    #[test]
    fn test_raw_average_rounds_half_up() {
        let mut stat = CategoryStat::new();
        for s in [10, 12, 11] {
            stat.record(s, true);
        }
        assert_eq!(stat.total_sum(), 33);
        assert_eq!(stat.count(), 3);
        assert_eq!(stat.raw_average(), Some(11));
        assert_eq!(stat.state(), StatState::Accumulating);

        // (3 + 1) / 2 = 2
        let mut stat = CategoryStat::new();
        stat.record(1, false);
        stat.record(2, false);
        assert_eq!(stat.raw_average(), Some(2));
    }

    #[test]
    fn test_restart_boundary() {
        assert!(is_restart(100, 160));
        assert!(is_restart(100, 151));
        assert!(!is_restart(100, 150));
        assert!(!is_restart(100, 20));
        // 3 + 1 = 4
        assert!(!is_restart(3, 4));
        assert!(is_restart(3, 5));
    }

    #[test]
    fn test_restart_rule_no_overflow_near_max() {
        assert!(!is_restart(u32::MAX, u32::MAX));
        assert!(!is_restart(u32::MAX - 1, u32::MAX));
        assert!(is_restart(0x8000_0000, u32::MAX));
        // ref + ref/2 = 2^32 here, which would wrap to 0 in u32
        assert!(!is_restart(0xAAAA_AAAB, u32::MAX));
    }

    #[test]
    fn test_first_sample_is_never_restart() {
        let mut stat = CategoryStat::new();
        assert_eq!(stat.record(1_000_000, true), SampleClass::Clean);
        assert_eq!(stat.reference(), Some(1_000_000));
    }

    #[test]
    fn test_reference_tracks_latest_sample() {
        let mut stat = CategoryStat::new();
        stat.prime(100);
        assert_eq!(stat.record(160, true), SampleClass::Restart);
        // Baseline is now 160: 200 <= 240 is clean
        assert_eq!(stat.record(200, true), SampleClass::Clean);
        assert_eq!(stat.reference(), Some(200));
        assert_eq!(stat.restart_count(), 1);
        assert_eq!(stat.restart_sum(), 160);
    }

    #[test]
    fn test_prime_does_not_count() {
        let mut stat = CategoryStat::new();
        stat.prime(50);
        assert_eq!(stat.count(), 0);
        assert_eq!(stat.state(), StatState::Idle);
        assert_eq!(stat.record(76, true), SampleClass::Restart);
    }

    #[test]
    fn test_detection_disabled() {
        let mut stat = CategoryStat::new();
        stat.record(100, false);
        assert_eq!(stat.record(1000, false), SampleClass::Clean);
        assert_eq!(stat.restart_count(), 0);
        assert_eq!(stat.reference(), Some(1000));
        assert_eq!(stat.clean_average(), stat.raw_average());
    }

    #[test]
    fn test_clean_average_uses_full_count() {
        let mut stat = CategoryStat::new();
        for s in [100, 100, 300, 100] {
            stat.record(s, true);
        }
        assert_eq!(stat.restart_count(), 1);
        // raw = (600 + 2) / 4 = 150
        assert_eq!(stat.raw_average(), Some(150));
        // clean = (300 + 3/2) / 4 = 75
        assert_eq!(stat.clean_average(), Some(75));
    }

    #[test]
    fn test_clean_average_all_restarts() {
        let mut stat = CategoryStat::new();
        stat.prime(10);
        stat.record(100, true);
        stat.record(1000, true);
        assert_eq!(stat.restart_count(), 2);
        assert_eq!(stat.clean_average(), Some(0));
        let summary = stat.summary().unwrap();
        assert_eq!(summary.restarts, 2);
        assert_eq!(summary.count, 2);
        assert_eq!(summary.raw_average, 550);
    }

    #[test]
    fn test_statistics_categories_are_independent() {
        let mut stats: Statistics<3> = Statistics::new(true);
        stats.record(0, 100);
        stats.record(1, 1000);
        stats.record(0, 200);
        assert_eq!(stats.category(0).unwrap().count(), 2);
        assert_eq!(stats.category(1).unwrap().count(), 1);
        assert_eq!(stats.category(2).unwrap().state(), StatState::Idle);
        assert_eq!(stats.summary(0).unwrap().restarts, 1);
        assert!(stats.summary(2).is_none());
        assert_eq!(stats.record(3, 1), None);
        assert_eq!(stats.iter().count(), 3);
    }

    proptest! {
        #[test]
        fn prop_constant_samples_average_to_value(v in any::<u32>(), k in 1usize..200) {
            let mut stat = CategoryStat::new();
            for _ in 0..k {
                prop_assert_eq!(stat.record(v, true), SampleClass::Clean);
            }
            prop_assert_eq!(stat.raw_average(), Some(u64::from(v)));
        }

        #[test]
        fn prop_invariants_hold(samples in proptest::collection::vec(any::<u32>(), 1..100)) {
            let mut stat = CategoryStat::new();
            let mut prev: Option<u32> = None;
            for &s in &samples {
                let class = stat.record(s, true);
                let expected = match prev {
                    Some(p) if u64::from(s) * 2 > u64::from(p) * 2 + u64::from(p & !1) => SampleClass::Restart,
                    _ => SampleClass::Clean,
                };
                prop_assert_eq!(class, expected);
                prev = Some(s);
            }
            prop_assert!(stat.restart_sum() <= stat.total_sum());
            prop_assert!(stat.restart_count() <= stat.count());
            prop_assert!(stat.clean_average().unwrap() <= stat.raw_average().unwrap());
        }
    }
}
