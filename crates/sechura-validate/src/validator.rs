//! Per-day completeness validation against the trading calendar.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, error};

use sechura_calendar::TradingCalendar;
use sechura_fetch::CandleStore;
use sechura_types::{Candle, DateRange, MissingPeriod, Timeframe};

use crate::result::{CompletenessSummary, ValidationResult};

/// Validates stored 1-minute candles against the calendar-expected grid.
pub struct Validator {
    calendar: TradingCalendar,
    store: Arc<dyn CandleStore>,
}

impl std::fmt::Debug for Validator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Validator")
            .field("calendar", &self.calendar)
            .finish_non_exhaustive()
    }
}

impl Validator {
    /// Creates a validator reading from `store` and consulting `calendar`.
    #[must_use]
    pub fn new(calendar: TradingCalendar, store: Arc<dyn CandleStore>) -> Self {
        Self { calendar, store }
    }

    /// Validates one (symbol, date) pair.
    ///
    /// Non-trading dates return a trivially valid result. A storage failure
    /// is recorded as an integrity error on the result instead of being
    /// raised, so sibling days keep processing.
    pub async fn validate_day(&self, symbol: &str, date: NaiveDate) -> ValidationResult {
        let expected = self.calendar.expected_candle_count(date, Timeframe::Minute1);
        if expected == 0 {
            return ValidationResult::non_trading(symbol.to_string(), date);
        }
        let (open, close) = self
            .calendar
            .session_window(date)
            .expect("trading day has a session window");

        let series = match self
            .store
            .load(symbol, Timeframe::Minute1, DateRange::single_day(date))
            .await
        {
            Ok(series) => series,
            Err(err) => {
                error!(symbol, %date, %err, "candle load failed during validation");
                return ValidationResult {
                    symbol: symbol.to_string(),
                    date,
                    is_valid: false,
                    expected_count: expected,
                    actual_count: 0,
                    missing_periods: Vec::new(),
                    integrity_errors: vec![format!("storage: {err}")],
                    integrity_warnings: Vec::new(),
                };
            }
        };

        let session = series.slice(open, close);
        let missing_periods = detect_missing_periods(open, close, session.candles());

        let mut integrity_errors = Vec::new();
        let mut integrity_warnings = Vec::new();
        for candle in session.candles() {
            check_integrity(candle, &mut integrity_errors, &mut integrity_warnings);
        }

        let actual_count = session.len() as u32;
        let is_valid = missing_periods.is_empty() && integrity_errors.is_empty();
        debug!(
            symbol,
            %date,
            expected,
            actual = actual_count,
            missing = missing_periods.len(),
            is_valid,
            "validated day"
        );

        ValidationResult {
            symbol: symbol.to_string(),
            date,
            is_valid,
            expected_count: expected,
            actual_count,
            missing_periods,
            integrity_errors,
            integrity_warnings,
        }
    }

    /// Validates every trading day of `range` in order.
    pub async fn validate_range(&self, symbol: &str, range: &DateRange) -> Vec<ValidationResult> {
        let mut results = Vec::new();
        for date in self.calendar.trading_days(range) {
            results.push(self.validate_day(symbol, date).await);
        }
        results
    }

    /// Validates `range` and folds the results into a summary.
    pub async fn completeness_summary(
        &self,
        symbol: &str,
        range: &DateRange,
    ) -> CompletenessSummary {
        let results = self.validate_range(symbol, range).await;
        CompletenessSummary::from_results(&results)
    }
}

/// Diffs the expected minute grid `[open, close)` against `candles` and
/// groups consecutive missing minutes into maximal periods.
fn detect_missing_periods(
    open: DateTime<Utc>,
    close: DateTime<Utc>,
    candles: &[Candle],
) -> Vec<MissingPeriod> {
    let present: HashSet<DateTime<Utc>> = candles.iter().map(|c| c.timestamp).collect();
    let grid = MissingPeriod::new(open, close);

    let mut periods = Vec::new();
    let mut run_start: Option<DateTime<Utc>> = None;
    let mut run_end = open;
    for minute in grid.minutes() {
        if present.contains(&minute) {
            if let Some(start) = run_start.take() {
                periods.push(MissingPeriod::new(start, run_end));
            }
        } else {
            if run_start.is_none() {
                run_start = Some(minute);
            }
            run_end = minute + chrono::TimeDelta::minutes(1);
        }
    }
    if let Some(start) = run_start {
        periods.push(MissingPeriod::new(start, run_end));
    }
    periods
}

/// Per-candle sanity findings. Construction already enforces the OHLC
/// invariants, but stored data may predate that gate or come from a foreign
/// writer, so the validator re-checks values it reads.
fn check_integrity(candle: &Candle, errors: &mut Vec<String>, warnings: &mut Vec<String>) {
    let ts = candle.timestamp;
    if candle.high < candle.low {
        errors.push(format!("{ts}: high ({}) < low ({})", candle.high, candle.low));
    }
    if candle.high < candle.open || candle.high < candle.close {
        errors.push(format!("{ts}: high below open or close"));
    }
    if candle.low > candle.open || candle.low > candle.close {
        errors.push(format!("{ts}: low above open or close"));
    }
    if candle.open <= Decimal::ZERO
        || candle.high <= Decimal::ZERO
        || candle.low <= Decimal::ZERO
        || candle.close <= Decimal::ZERO
    {
        errors.push(format!("{ts}: non-positive price"));
    }
    if candle.volume < Decimal::ZERO {
        errors.push(format!("{ts}: negative volume ({})", candle.volume));
    } else if candle.volume == Decimal::ZERO {
        warnings.push(format!("{ts}: zero volume"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{TimeDelta, TimeZone};
    use rust_decimal_macros::dec;
    use sechura_fetch::StorageError;
    use sechura_types::CandleSeries;
    use std::collections::HashMap;
    use std::sync::Mutex;

    fn d(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn minute_candle(ts: DateTime<Utc>, volume: Decimal) -> Candle {
        Candle::new(ts, dec!(100), dec!(101), dec!(99), dec!(100), volume).unwrap()
    }

    /// Consecutive 1-minute candles from `start`.
    fn run(start: DateTime<Utc>, count: usize) -> Vec<Candle> {
        (0..count)
            .map(|i| minute_candle(start + TimeDelta::minutes(i as i64), dec!(100)))
            .collect()
    }

    #[derive(Default)]
    struct MemoryStore {
        series: Mutex<HashMap<(String, Timeframe), Vec<Candle>>>,
        fail: bool,
    }

    impl MemoryStore {
        fn with(symbol: &str, candles: Vec<Candle>) -> Arc<Self> {
            let store = Self::default();
            store
                .series
                .lock()
                .unwrap()
                .insert((symbol.to_string(), Timeframe::Minute1), candles);
            Arc::new(store)
        }
    }

    #[async_trait]
    impl CandleStore for MemoryStore {
        async fn load(
            &self,
            symbol: &str,
            timeframe: Timeframe,
            range: DateRange,
        ) -> Result<CandleSeries, StorageError> {
            if self.fail {
                return Err(StorageError("backend offline".to_string()));
            }
            let candles = self
                .series
                .lock()
                .unwrap()
                .get(&(symbol.to_string(), timeframe))
                .map(|c| {
                    c.iter()
                        .filter(|candle| range.contains(candle.timestamp.date_naive()))
                        .copied()
                        .collect()
                })
                .unwrap_or_default();
            Ok(CandleSeries::new(symbol, timeframe, candles))
        }

        async fn store(&self, series: &CandleSeries) -> Result<(), StorageError> {
            self.series
                .lock()
                .unwrap()
                .entry((series.symbol.clone(), series.timeframe))
                .or_default()
                .extend(series.candles().iter().copied());
            Ok(())
        }

        async fn count_in_range(
            &self,
            symbol: &str,
            timeframe: Timeframe,
            range: DateRange,
        ) -> Result<usize, StorageError> {
            Ok(self.load(symbol, timeframe, range).await?.len())
        }

        async fn last_update(
            &self,
            symbol: &str,
            timeframe: Timeframe,
        ) -> Result<Option<DateTime<Utc>>, StorageError> {
            Ok(self
                .series
                .lock()
                .unwrap()
                .get(&(symbol.to_string(), timeframe))
                .and_then(|c| c.iter().map(|candle| candle.timestamp).max()))
        }
    }

    fn session_open() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 15, 13, 30, 0).unwrap()
    }

    #[tokio::test]
    async fn test_complete_day_is_valid() {
        let store = MemoryStore::with("AAPL", run(session_open(), 390));
        let validator = Validator::new(TradingCalendar::default(), store);

        let result = validator.validate_day("AAPL", d(2025, 1, 15)).await;
        assert!(result.is_valid);
        assert_eq!(result.expected_count, 390);
        assert_eq!(result.actual_count, 390);
        assert!(result.missing_periods.is_empty());
    }

    #[tokio::test]
    async fn test_truncated_day_yields_trailing_gap() {
        // 270 of 390 minutes present: data stops at 18:00.
        let store = MemoryStore::with("AAPL", run(session_open(), 270));
        let validator = Validator::new(TradingCalendar::default(), store);

        let result = validator.validate_day("AAPL", d(2025, 1, 15)).await;
        assert!(!result.is_valid);
        assert_eq!(result.actual_count, 270);
        assert_eq!(result.missing_periods.len(), 1);
        let gap = result.missing_periods[0];
        assert_eq!(gap.start, Utc.with_ymd_and_hms(2025, 1, 15, 18, 0, 0).unwrap());
        assert_eq!(gap.end, Utc.with_ymd_and_hms(2025, 1, 15, 20, 0, 0).unwrap());
        assert_eq!(result.missing_candle_count(), 120);
    }

    #[tokio::test]
    async fn test_interior_gaps_group_into_maximal_runs() {
        // Two holes: 14:00-14:10 and 15:00-15:01.
        let mut candles = run(session_open(), 30);
        candles.extend(run(
            Utc.with_ymd_and_hms(2025, 1, 15, 14, 10, 0).unwrap(),
            50,
        ));
        candles.extend(run(
            Utc.with_ymd_and_hms(2025, 1, 15, 15, 1, 0).unwrap(),
            299,
        ));
        let store = MemoryStore::with("AAPL", candles);
        let validator = Validator::new(TradingCalendar::default(), store);

        let result = validator.validate_day("AAPL", d(2025, 1, 15)).await;
        assert_eq!(result.missing_periods.len(), 2);
        assert_eq!(result.missing_periods[0].expected_candles(), 10);
        assert_eq!(result.missing_periods[1].expected_candles(), 1);
        // Round trip: the periods cover exactly the missing minutes.
        assert_eq!(
            result.missing_candle_count(),
            390 - result.actual_count as usize
        );
    }

    #[tokio::test]
    async fn test_empty_day_is_one_whole_session_gap() {
        let store = MemoryStore::with("AAPL", Vec::new());
        let validator = Validator::new(TradingCalendar::default(), store);

        let result = validator.validate_day("AAPL", d(2025, 1, 15)).await;
        assert_eq!(result.actual_count, 0);
        assert_eq!(result.missing_periods.len(), 1);
        assert_eq!(result.missing_periods[0].expected_candles(), 390);
    }

    #[tokio::test]
    async fn test_non_trading_day_trivially_valid() {
        let store = MemoryStore::with("AAPL", Vec::new());
        let validator = Validator::new(TradingCalendar::default(), store);

        let result = validator.validate_day("AAPL", d(2025, 1, 18)).await;
        assert!(result.is_valid);
        assert_eq!(result.expected_count, 0);
    }

    #[tokio::test]
    async fn test_half_day_window_narrows() {
        // Black Friday 2025: 210 minutes, 13:30 to 17:00 UTC.
        let open = Utc.with_ymd_and_hms(2025, 11, 28, 13, 30, 0).unwrap();
        let store = MemoryStore::with("AAPL", run(open, 210));
        let validator = Validator::new(TradingCalendar::default(), store);

        let result = validator.validate_day("AAPL", d(2025, 11, 28)).await;
        assert!(result.is_valid);
        assert_eq!(result.expected_count, 210);
        assert_eq!(result.actual_count, 210);
    }

    #[tokio::test]
    async fn test_zero_volume_warns_without_invalidating() {
        let mut candles = run(session_open(), 390);
        candles[5] = minute_candle(candles[5].timestamp, dec!(0));
        let store = MemoryStore::with("AAPL", candles);
        let validator = Validator::new(TradingCalendar::default(), store);

        let result = validator.validate_day("AAPL", d(2025, 1, 15)).await;
        assert!(result.is_valid);
        assert_eq!(result.integrity_warnings.len(), 1);
        assert!(result.integrity_errors.is_empty());
    }

    #[tokio::test]
    async fn test_storage_failure_recorded_not_raised() {
        let store = Arc::new(MemoryStore {
            fail: true,
            ..MemoryStore::default()
        });
        let validator = Validator::new(TradingCalendar::default(), store);

        let result = validator.validate_day("AAPL", d(2025, 1, 15)).await;
        assert!(!result.is_valid);
        assert_eq!(result.integrity_errors.len(), 1);
        assert!(result.integrity_errors[0].contains("storage"));
    }

    #[tokio::test]
    async fn test_validate_range_skips_non_trading_days() {
        let store = MemoryStore::with("AAPL", run(session_open(), 390));
        let validator = Validator::new(TradingCalendar::default(), store);

        // Wed Jan 15 through Tue Jan 21 contains a weekend and MLK Day.
        let range = DateRange::new(d(2025, 1, 15), d(2025, 1, 21)).unwrap();
        let results = validator.validate_range("AAPL", &range).await;
        let dates: Vec<NaiveDate> = results.iter().map(|r| r.date).collect();
        assert_eq!(
            dates,
            vec![d(2025, 1, 15), d(2025, 1, 16), d(2025, 1, 17), d(2025, 1, 21)]
        );
        // Only the 15th has data.
        let summary = CompletenessSummary::from_results(&results);
        assert_eq!(summary.trading_days, 4);
        assert_eq!(summary.valid_days, 1);
    }
}
