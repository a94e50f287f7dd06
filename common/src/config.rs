//! Benchmark driver configuration.
//!
//! The long-run loop reports on every iteration at first, so the early
//! figures are visible quickly, then settles into a sparse cadence.

// =============================================================================
// Reporting Cadence
// =============================================================================

/// Iterations (1-based) that always produce a full report.
pub const EARLY_REPORTS: u32 = 10;

/// After the early phase, report on every multiple of this.
pub const REPORT_INTERVAL: u32 = 100;

/// Marker emitted for iterations without a report.
pub const PROGRESS_MARKER: &str = ".";

// =============================================================================
// Calibration
// =============================================================================

/// Back-to-back timer reads used to estimate measurement overhead.
pub const CALIBRATION_ROUNDS: u32 = 16;

/// Runtime knobs of the benchmark driver.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DriverConfig {
    /// Iterations 1..=early_reports always report.
    pub early_reports: u32,
    /// Later iterations report when divisible by this (0 disables).
    pub report_interval: u32,
    /// Ticks subtracted from every raw sample (timer read overhead).
    pub overhead: u32,
}

impl DriverConfig {
    /// Default cadence, no overhead correction.
    pub const fn new() -> Self {
        Self {
            early_reports: EARLY_REPORTS,
            report_interval: REPORT_INTERVAL,
            overhead: 0,
        }
    }

    /// Same cadence with a measured overhead correction.
    pub const fn with_overhead(
        self,
        overhead: u32,
    ) -> Self {
        Self { overhead, ..self }
    }

    /// Whether iteration `n` (1-based) produces a full report.
    pub const fn is_report_iteration(
        &self,
        n: u32,
    ) -> bool {
        n <= self.early_reports || (self.report_interval != 0 && n % self.report_interval == 0)
    }
}

impl Default for DriverConfig {
    fn default() -> Self { Self::new() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_cadence() {
        let cfg = DriverConfig::default();
        for n in 1..=10 {
            assert!(cfg.is_report_iteration(n));
        }
        assert!(!cfg.is_report_iteration(11));
        assert!(!cfg.is_report_iteration(99));
        assert!(cfg.is_report_iteration(100));
        assert!(!cfg.is_report_iteration(150));
        assert!(cfg.is_report_iteration(300));
    }

    #[test]
    fn test_zero_interval_only_early() {
        let cfg = DriverConfig {
            early_reports: 2,
            report_interval: 0,
            overhead: 0,
        };
        assert!(cfg.is_report_iteration(2));
        assert!(!cfg.is_report_iteration(3));
        assert!(!cfg.is_report_iteration(100));
    }

    #[test]
    fn test_with_overhead_keeps_cadence() {
        let cfg = DriverConfig::new().with_overhead(4);
        assert_eq!(cfg.overhead, 4);
        assert_eq!(cfg.early_reports, EARLY_REPORTS);
        assert_eq!(cfg.report_interval, REPORT_INTERVAL);
    }
}
