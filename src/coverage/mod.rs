//! Coverage module
//!
//! Provides:
//! - JaCoCo XML loading into an element tree
//! - Report-wide LINE counter aggregation
//! - Per-source-file line breakdown

mod jacoco;
mod xml;

pub use jacoco::*;
pub use xml::*;

use serde::{Deserialize, Serialize};

/// Lines missed vs covered, as recorded on a JaCoCo `counter` element
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counter {
    pub missed: u64,
    pub covered: u64,
}

impl Counter {
    pub fn new(missed: u64, covered: u64) -> Self {
        Self { missed, covered }
    }

    /// Widened so two `u64` counts can never overflow
    pub fn total(&self) -> u128 {
        u128::from(self.missed) + u128::from(self.covered)
    }

    /// Covered share in percent, rounded to 2 decimals (0.0 when empty)
    pub fn percentage(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        round2((self.covered as f64 / total as f64) * 100.0)
    }
}

/// Report-wide line metrics
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub lines_to_cover: u128,
    pub uncovered_lines: u64,
    pub coverage: f64,
}

impl From<Counter> for ReportSummary {
    fn from(counter: Counter) -> Self {
        Self {
            lines_to_cover: counter.total(),
            uncovered_lines: counter.missed,
            coverage: counter.percentage(),
        }
    }
}

/// Line coverage for a single `sourcefile` element
#[derive(Debug, Clone, PartialEq)]
pub struct FileCoverageRow {
    pub name: String,
    pub total_lines: u128,
    pub missed: u64,
    pub covered: u64,
    pub coverage_pct: f64,
}

impl FileCoverageRow {
    pub fn new(name: impl Into<String>, counter: Counter) -> Self {
        Self {
            name: name.into(),
            total_lines: counter.total(),
            missed: counter.missed,
            covered: counter.covered,
            coverage_pct: counter.percentage(),
        }
    }
}

/// Round to 2 decimals from the exact binary value, ties to even.
pub fn round2(value: f64) -> f64 {
    // A hundredths midpoint is always an odd number of eighths.
    let eighths = value * 8.0;
    if eighths.fract() == 0.0 && eighths.rem_euclid(2.0) == 1.0 {
        let doubled_hundredths = eighths * 25.0;
        let lower = (doubled_hundredths - 1.0) / 2.0;
        let even = if lower.rem_euclid(2.0) == 0.0 { lower } else { lower + 1.0 };
        return even / 100.0;
    }
    format!("{:.2}", value).parse().unwrap_or(value)
}

/// Render a float the way coverage tooling prints it: `70.0`, `33.33`, `0.0`
pub fn format_float(value: f64) -> String {
    format!("{:?}", value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_percentage() {
        assert_eq!(Counter::new(3, 7).percentage(), 70.0);
        assert_eq!(Counter::new(2, 1).percentage(), 33.33);
        assert_eq!(Counter::new(1, 2).percentage(), 66.67);
    }

    #[test]
    fn test_empty_counter_is_zero_percent() {
        let counter = Counter::new(0, 0);
        assert_eq!(counter.total(), 0);
        assert_eq!(counter.percentage(), 0.0);
        assert!(!counter.percentage().is_nan());
    }

    #[test]
    fn test_total_of_max_counts() {
        let summary = ReportSummary::from(Counter::new(u64::MAX, 1));
        assert_eq!(summary.lines_to_cover, u128::from(u64::MAX) + 1);
        assert_eq!(summary.uncovered_lines, u64::MAX);
        assert!(summary.lines_to_cover > u128::from(summary.uncovered_lines));
        assert_eq!(summary.coverage, 0.0);
    }

    #[test]
    fn test_summary_from_counter() {
        let summary = ReportSummary::from(Counter::new(3, 7));
        assert_eq!(summary.lines_to_cover, 10);
        assert_eq!(summary.uncovered_lines, 3);
        assert_eq!(summary.coverage, 70.0);
    }

    #[test]
    fn test_round2_uses_exact_binary_value() {
        // 2.675 is stored slightly below the midpoint
        assert_eq!(round2(2.675), 2.67);
        assert_eq!(round2(12.3456), 12.35);
    }

    #[test]
    fn test_round2_ties_to_even() {
        assert_eq!(round2(0.125), 0.12);
        assert_eq!(round2(0.375), 0.38);
        assert_eq!(round2(99.875), 99.88);
        // 1 covered out of 800 lines
        assert_eq!(Counter::new(799, 1).percentage(), 0.12);
    }

    #[test]
    fn test_format_float() {
        assert_eq!(format_float(70.0), "70.0");
        assert_eq!(format_float(33.33), "33.33");
        assert_eq!(format_float(0.0), "0.0");
        assert_eq!(format_float(100.0), "100.0");
    }
}
