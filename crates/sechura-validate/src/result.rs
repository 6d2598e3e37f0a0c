//! Validation artifacts and multi-day summaries.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use sechura_types::MissingPeriod;

/// Outcome of validating one (symbol, date) pair.
///
/// Read-only artifact: completeness and integrity issues are recorded here
/// as data, never raised, so one bad day cannot abort its siblings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    /// Symbol that was validated.
    pub symbol: String,
    /// Trading date that was validated.
    pub date: NaiveDate,
    /// True when nothing is missing and no integrity errors were found.
    pub is_valid: bool,
    /// Candles a complete session should contain.
    pub expected_count: u32,
    /// Candles actually present inside the session window.
    pub actual_count: u32,
    /// Maximal runs of consecutive missing minutes.
    pub missing_periods: Vec<MissingPeriod>,
    /// Fatal per-candle findings (OHLC violations, storage failures).
    pub integrity_errors: Vec<String>,
    /// Non-fatal findings (zero volume).
    pub integrity_warnings: Vec<String>,
}

impl ValidationResult {
    /// Result for a date the market is closed: trivially valid, nothing
    /// expected.
    #[must_use]
    pub const fn non_trading(symbol: String, date: NaiveDate) -> Self {
        Self {
            symbol,
            date,
            is_valid: true,
            expected_count: 0,
            actual_count: 0,
            missing_periods: Vec::new(),
            integrity_errors: Vec::new(),
            integrity_warnings: Vec::new(),
        }
    }

    /// Total missing 1-minute candles across all periods.
    #[must_use]
    pub fn missing_candle_count(&self) -> usize {
        self.missing_periods
            .iter()
            .map(MissingPeriod::expected_candles)
            .sum()
    }
}

/// Aggregate view over many validation results.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct CompletenessSummary {
    /// Days examined, non-trading days included.
    pub total_days: usize,
    /// Trading days examined.
    pub trading_days: usize,
    /// Trading days that validated clean.
    pub valid_days: usize,
    /// Distinct missing periods across all days.
    pub missing_periods: usize,
    /// Missing 1-minute candles across all days.
    pub missing_candles: usize,
    /// Integrity errors across all days.
    pub integrity_errors: usize,
    /// Integrity warnings across all days.
    pub integrity_warnings: usize,
    /// Trading days with at least one missing period.
    pub days_with_gaps: usize,
    /// Lowest per-day candle coverage, `None` without trading days.
    pub worst_day_ratio: Option<f64>,
    /// Highest per-day candle coverage, `None` without trading days.
    pub best_day_ratio: Option<f64>,
}

impl CompletenessSummary {
    /// Builds a summary over `results`.
    #[must_use]
    pub fn from_results(results: &[ValidationResult]) -> Self {
        let mut summary = Self {
            total_days: results.len(),
            ..Self::default()
        };
        for result in results {
            if result.expected_count > 0 {
                summary.trading_days += 1;
                if result.is_valid {
                    summary.valid_days += 1;
                }
                if !result.missing_periods.is_empty() {
                    summary.days_with_gaps += 1;
                }
                let coverage =
                    f64::from(result.actual_count) / f64::from(result.expected_count);
                summary.worst_day_ratio =
                    Some(summary.worst_day_ratio.map_or(coverage, |r| r.min(coverage)));
                summary.best_day_ratio =
                    Some(summary.best_day_ratio.map_or(coverage, |r| r.max(coverage)));
            }
            summary.missing_periods += result.missing_periods.len();
            summary.missing_candles += result.missing_candle_count();
            summary.integrity_errors += result.integrity_errors.len();
            summary.integrity_warnings += result.integrity_warnings.len();
        }
        summary
    }

    /// Fraction of trading days that validated clean, 1.0 when there were
    /// none.
    #[must_use]
    pub fn valid_ratio(&self) -> f64 {
        if self.trading_days == 0 {
            1.0
        } else {
            self.valid_days as f64 / self.trading_days as f64
        }
    }
}
