//! Targeted recovery of missing candle periods.
//!
//! For each missing period the orchestrator re-fetches exactly that window
//! from the vendor. When the vendor returns nothing, a lightweight
//! trade-existence probe disambiguates a benign quiet period from a vendor
//! that is missing data for an active market. Outcomes are always reported
//! as data; a failed period never aborts its siblings.

#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

use sechura_fetch::{CandleStore, VendorDataSource};
use sechura_types::{CandleSeries, DateRange, MissingPeriod, Timeframe};

/// Result cap for the trade-existence probe. Presence is all that matters,
/// not reconstruction.
const PROBE_TRADE_LIMIT: usize = 10;

/// Terminal classification of one recovery attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum GapFillStatus {
    /// Not attempted: the per-call attempt budget was already spent.
    Skipped,
    /// Candles were recovered and persisted.
    Recovered {
        /// How many candles landed inside the period.
        candles_recovered: usize,
    },
    /// The vendor returned nothing although trades occurred in the window.
    /// Worth retrying later or escalating.
    VendorUnavailable,
    /// The vendor returned nothing and no trades occurred. The gap is
    /// benign: the market simply was not trading.
    NoTradingActivity,
    /// Fetch or probe raised an error; activity in the window is unknown.
    Failed {
        /// The preserved error text.
        message: String,
    },
}

impl std::fmt::Display for GapFillStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Skipped => write!(f, "skipped: attempt budget exhausted"),
            Self::Recovered { candles_recovered } => {
                write!(f, "recovered {candles_recovered} candles")
            }
            Self::VendorUnavailable => {
                write!(f, "vendor returned no data for an active trading period")
            }
            Self::NoTradingActivity => {
                write!(f, "no trading activity during this period")
            }
            Self::Failed { message } => write!(f, "failed: {message}"),
        }
    }
}

impl GapFillStatus {
    /// Returns true if candles were recovered.
    #[must_use]
    pub const fn is_recovered(&self) -> bool {
        matches!(self, Self::Recovered { .. })
    }

    /// Returns true when the vendor came back empty for an active window.
    #[must_use]
    pub const fn is_vendor_unavailable(&self) -> bool {
        matches!(self, Self::VendorUnavailable)
    }

    /// Whether trades occurred in the window, where that could be
    /// established.
    #[must_use]
    pub const fn has_trading_activity(&self) -> Option<bool> {
        match self {
            Self::Recovered { .. } | Self::VendorUnavailable => Some(true),
            Self::NoTradingActivity => Some(false),
            Self::Skipped | Self::Failed { .. } => None,
        }
    }

    /// How many candles landed in the store, zero for every other outcome.
    #[must_use]
    pub const fn candles_recovered(&self) -> usize {
        match self {
            Self::Recovered { candles_recovered } => *candles_recovered,
            _ => 0,
        }
    }

    /// The preserved error text of a failed attempt.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Failed { message } => Some(message),
            _ => None,
        }
    }
}

/// One missing period's recovery outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GapFillOutcome {
    /// The period that was targeted.
    pub period: MissingPeriod,
    /// False only when the period was skipped over budget.
    pub attempted: bool,
    /// What happened.
    pub status: GapFillStatus,
}

/// Orchestrates targeted re-fetches for missing periods.
pub struct GapRecovery {
    source: Arc<dyn VendorDataSource>,
    store: Arc<dyn CandleStore>,
}

impl std::fmt::Debug for GapRecovery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GapRecovery").finish_non_exhaustive()
    }
}

impl GapRecovery {
    /// Creates an orchestrator fetching from `source` and persisting into
    /// `store`.
    #[must_use]
    pub fn new(source: Arc<dyn VendorDataSource>, store: Arc<dyn CandleStore>) -> Self {
        Self { source, store }
    }

    /// Attempts recovery for up to `max_attempts` of `periods`, in order.
    ///
    /// Excess periods are reported as [`GapFillStatus::Skipped`], not as
    /// failures; callers re-run recovery on a later pass.
    pub async fn recover_gaps(
        &self,
        symbol: &str,
        periods: &[MissingPeriod],
        max_attempts: usize,
    ) -> Vec<GapFillOutcome> {
        let mut outcomes = Vec::with_capacity(periods.len());
        for (index, period) in periods.iter().enumerate() {
            if index >= max_attempts {
                outcomes.push(GapFillOutcome {
                    period: *period,
                    attempted: false,
                    status: GapFillStatus::Skipped,
                });
                continue;
            }
            let status = self.recover_one(symbol, period).await;
            info!(symbol, period = %period, %status, "gap recovery outcome");
            outcomes.push(GapFillOutcome {
                period: *period,
                attempted: true,
                status,
            });
        }
        outcomes
    }

    async fn recover_one(&self, symbol: &str, period: &MissingPeriod) -> GapFillStatus {
        let Some(range) = period_dates(period) else {
            return GapFillStatus::Failed {
                message: format!("degenerate period {period}"),
            };
        };

        let fetched = match self
            .source
            .fetch_candles(symbol, Timeframe::Minute1, range)
            .await
        {
            Ok(series) => series,
            Err(err) => {
                warn!(symbol, period = %period, %err, "gap re-fetch failed");
                return GapFillStatus::Failed {
                    message: err.to_string(),
                };
            }
        };

        // Inclusive of the period end to tolerate vendors that label the
        // boundary bucket on either side.
        let candles: Vec<_> = fetched
            .candles()
            .iter()
            .filter(|c| c.timestamp >= period.start && c.timestamp <= period.end)
            .copied()
            .collect();

        if candles.is_empty() {
            return self.classify_empty(symbol, period).await;
        }

        let recovered = candles.len();
        let series = CandleSeries::new(symbol, Timeframe::Minute1, candles);
        if let Err(err) = self.store.store(&series).await {
            warn!(symbol, period = %period, %err, "persisting recovered candles failed");
            return GapFillStatus::Failed {
                message: err.to_string(),
            };
        }
        GapFillStatus::Recovered {
            candles_recovered: recovered,
        }
    }

    /// Zero candles came back: probe for raw trades to tell a quiet market
    /// from a vendor hole.
    async fn classify_empty(&self, symbol: &str, period: &MissingPeriod) -> GapFillStatus {
        match self
            .source
            .fetch_trade_existence(symbol, period.start, period.end, PROBE_TRADE_LIMIT)
            .await
        {
            Ok(trades) if trades.is_empty() => GapFillStatus::NoTradingActivity,
            Ok(_) => GapFillStatus::VendorUnavailable,
            Err(err) => {
                warn!(symbol, period = %period, %err, "trade-existence probe failed");
                GapFillStatus::Failed {
                    message: err.to_string(),
                }
            }
        }
    }
}

/// Date range covering `[start, end)` of a period.
fn period_dates(period: &MissingPeriod) -> Option<DateRange> {
    let last = (period.end - TimeDelta::minutes(1)).date_naive();
    DateRange::new(period.start.date_naive(), last).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{DateTime, TimeZone, Utc};
    use rust_decimal_macros::dec;
    use sechura_fetch::{StorageError, TradeStub, VendorError};
    use sechura_types::{AlignmentMetadata, Candle};
    use std::sync::Mutex;

    fn period(start_hour: u32, start_min: u32, end_hour: u32, end_min: u32) -> MissingPeriod {
        MissingPeriod::new(
            Utc.with_ymd_and_hms(2025, 1, 15, start_hour, start_min, 0).unwrap(),
            Utc.with_ymd_and_hms(2025, 1, 15, end_hour, end_min, 0).unwrap(),
        )
    }

    fn run(start: DateTime<Utc>, count: usize) -> Vec<Candle> {
        (0..count)
            .map(|i| {
                let ts = start + TimeDelta::minutes(i as i64);
                Candle::new(ts, dec!(100), dec!(101), dec!(99), dec!(100), dec!(10)).unwrap()
            })
            .collect()
    }

    struct StubVendor {
        candles: Vec<Candle>,
        trades: Vec<TradeStub>,
        fetch_error: Option<VendorError>,
        probe_error: Option<VendorError>,
    }

    impl StubVendor {
        fn with_candles(candles: Vec<Candle>) -> Self {
            Self {
                candles,
                trades: Vec::new(),
                fetch_error: None,
                probe_error: None,
            }
        }
    }

    #[async_trait]
    impl VendorDataSource for StubVendor {
        async fn fetch_candles(
            &self,
            symbol: &str,
            timeframe: Timeframe,
            _range: DateRange,
        ) -> Result<CandleSeries, VendorError> {
            if let Some(err) = &self.fetch_error {
                return Err(err.clone());
            }
            Ok(CandleSeries::new(symbol, timeframe, self.candles.clone()))
        }

        async fn fetch_trade_existence(
            &self,
            _symbol: &str,
            _from: DateTime<Utc>,
            _to: DateTime<Utc>,
            _limit: usize,
        ) -> Result<Vec<TradeStub>, VendorError> {
            if let Some(err) = &self.probe_error {
                return Err(err.clone());
            }
            Ok(self.trades.clone())
        }

        fn describe_alignment(&self) -> AlignmentMetadata {
            AlignmentMetadata::utc_aligned()
        }
    }

    #[derive(Default)]
    struct RecordingStore {
        stored: Mutex<Vec<CandleSeries>>,
    }

    #[async_trait]
    impl CandleStore for RecordingStore {
        async fn load(
            &self,
            symbol: &str,
            timeframe: Timeframe,
            _range: DateRange,
        ) -> Result<CandleSeries, StorageError> {
            Ok(CandleSeries::empty(symbol, timeframe))
        }

        async fn store(&self, series: &CandleSeries) -> Result<(), StorageError> {
            self.stored.lock().unwrap().push(series.clone());
            Ok(())
        }

        async fn count_in_range(
            &self,
            _symbol: &str,
            _timeframe: Timeframe,
            _range: DateRange,
        ) -> Result<usize, StorageError> {
            Ok(0)
        }

        async fn last_update(
            &self,
            _symbol: &str,
            _timeframe: Timeframe,
        ) -> Result<Option<DateTime<Utc>>, StorageError> {
            Ok(None)
        }
    }

    #[tokio::test]
    async fn test_recovers_and_persists_period_candles() {
        // Vendor returns the full 18:00-20:00 window plus strays outside it.
        let gap = period(18, 0, 20, 0);
        let mut candles = run(gap.start, 120);
        candles.extend(run(
            Utc.with_ymd_and_hms(2025, 1, 15, 13, 30, 0).unwrap(),
            5,
        ));
        let vendor = Arc::new(StubVendor::with_candles(candles));
        let store = Arc::new(RecordingStore::default());
        let recovery = GapRecovery::new(vendor, store.clone());

        let outcomes = recovery.recover_gaps("AAPL", &[gap], 10).await;
        assert_eq!(outcomes.len(), 1);
        assert!(outcomes[0].attempted);
        assert_eq!(
            outcomes[0].status,
            GapFillStatus::Recovered {
                candles_recovered: 120
            }
        );
        assert!(outcomes[0].status.is_recovered());
        assert_eq!(outcomes[0].status.candles_recovered(), 120);
        assert_eq!(outcomes[0].status.has_trading_activity(), Some(true));
        // Only the in-period candles were persisted.
        let stored = store.stored.lock().unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].len(), 120);
        assert!(stored[0].candles().iter().all(|c| c.timestamp >= gap.start));
    }

    #[tokio::test]
    async fn test_boundary_candle_at_period_end_kept() {
        // A vendor labeling the closing bucket at the period end is
        // tolerated: the filter is inclusive of `end`.
        let gap = period(18, 0, 19, 0);
        let vendor = Arc::new(StubVendor::with_candles(run(gap.end, 1)));
        let store = Arc::new(RecordingStore::default());
        let recovery = GapRecovery::new(vendor, store);

        let outcomes = recovery.recover_gaps("AAPL", &[gap], 10).await;
        assert_eq!(
            outcomes[0].status,
            GapFillStatus::Recovered {
                candles_recovered: 1
            }
        );
    }

    #[tokio::test]
    async fn test_empty_window_with_trades_is_vendor_unavailable() {
        let mut vendor = StubVendor::with_candles(Vec::new());
        vendor.trades = vec![TradeStub {
            timestamp: Utc.with_ymd_and_hms(2025, 1, 15, 18, 30, 0).unwrap(),
            price: dec!(100),
            size: dec!(5),
        }];
        let recovery = GapRecovery::new(Arc::new(vendor), Arc::new(RecordingStore::default()));

        let outcomes = recovery.recover_gaps("AAPL", &[period(18, 0, 20, 0)], 10).await;
        assert_eq!(outcomes[0].status, GapFillStatus::VendorUnavailable);
        assert!(outcomes[0].status.to_string().contains("active trading"));
    }

    #[tokio::test]
    async fn test_empty_window_without_trades_is_benign() {
        let vendor = StubVendor::with_candles(Vec::new());
        let recovery = GapRecovery::new(Arc::new(vendor), Arc::new(RecordingStore::default()));

        let outcomes = recovery.recover_gaps("AAPL", &[period(18, 0, 20, 0)], 10).await;
        assert_eq!(outcomes[0].status, GapFillStatus::NoTradingActivity);
        assert_eq!(outcomes[0].status.has_trading_activity(), Some(false));
        assert!(outcomes[0]
            .status
            .to_string()
            .contains("no trading activity"));
    }

    #[tokio::test]
    async fn test_fetch_error_preserved_as_failure() {
        let mut vendor = StubVendor::with_candles(Vec::new());
        vendor.fetch_error = Some(VendorError::Transient("connection reset".into()));
        let recovery = GapRecovery::new(Arc::new(vendor), Arc::new(RecordingStore::default()));

        let outcomes = recovery.recover_gaps("AAPL", &[period(18, 0, 20, 0)], 10).await;
        match &outcomes[0].status {
            GapFillStatus::Failed { message } => assert!(message.contains("connection reset")),
            other => panic!("unexpected status: {other:?}"),
        }
        assert!(outcomes[0].status.message().unwrap().contains("connection reset"));
        assert_eq!(outcomes[0].status.has_trading_activity(), None);
    }

    #[tokio::test]
    async fn test_probe_error_preserved_as_failure() {
        let mut vendor = StubVendor::with_candles(Vec::new());
        vendor.probe_error = Some(VendorError::RateLimit("429".into()));
        let recovery = GapRecovery::new(Arc::new(vendor), Arc::new(RecordingStore::default()));

        let outcomes = recovery.recover_gaps("AAPL", &[period(18, 0, 20, 0)], 10).await;
        assert!(matches!(outcomes[0].status, GapFillStatus::Failed { .. }));
    }

    #[tokio::test]
    async fn test_attempt_budget_skips_excess_periods() {
        let gap = period(18, 0, 20, 0);
        let vendor = Arc::new(StubVendor::with_candles(run(gap.start, 120)));
        let recovery = GapRecovery::new(vendor, Arc::new(RecordingStore::default()));

        let periods = vec![gap, period(14, 0, 14, 10), period(15, 0, 15, 5)];
        let outcomes = recovery.recover_gaps("AAPL", &periods, 2).await;

        assert_eq!(outcomes.len(), 3);
        assert!(outcomes[0].attempted);
        assert!(outcomes[1].attempted);
        assert!(!outcomes[2].attempted);
        assert_eq!(outcomes[2].status, GapFillStatus::Skipped);
    }
}
