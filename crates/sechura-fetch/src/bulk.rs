//! Bulk fetch driver: batches, pacing, retry and per-batch tracing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, warn};

use sechura_types::{Candle, CandleSeries, DateRange, Timeframe};

use crate::batch::BatchPlan;
use crate::pacer::RequestPacer;
use crate::source::{VendorDataSource, VendorError};

/// Retry and pacing knobs for bulk fetches.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Attempts per batch, including the first.
    pub max_attempts: u32,
    /// First retry delay; doubles on each subsequent retry.
    pub base_delay: Duration,
    /// Pause between consecutive batches.
    pub batch_delay: Duration,
    /// Requests-per-second budget for the pacer.
    pub requests_per_second: u32,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
            batch_delay: Duration::from_millis(200),
            requests_per_second: 5,
        }
    }
}

/// Record of one batch attempt sequence, successful or not.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchBatchTrace {
    /// Date range the batch covered.
    pub range: DateRange,
    /// Whether the batch eventually succeeded.
    pub success: bool,
    /// Candles returned on success, zero otherwise.
    pub candle_count: usize,
    /// Terminal error text when the batch failed.
    pub error_message: Option<String>,
    /// When the batch was last attempted.
    pub attempted_at: DateTime<Utc>,
}

/// Outcome of a bulk fetch across a date range.
#[derive(Debug, Clone)]
pub struct FetchReport {
    /// Symbol that was fetched.
    pub symbol: String,
    /// Timeframe that was fetched.
    pub timeframe: Timeframe,
    candles: Vec<Candle>,
    /// One trace per batch, in fetch order.
    pub batches: Vec<FetchBatchTrace>,
}

impl FetchReport {
    /// Total candles retrieved across all successful batches.
    #[must_use]
    pub fn candle_count(&self) -> usize {
        self.candles.len()
    }

    /// Number of batches that failed terminally.
    #[must_use]
    pub fn failed_batches(&self) -> usize {
        self.batches.iter().filter(|b| !b.success).count()
    }

    /// Date ranges whose batches failed, for targeted gap recovery.
    #[must_use]
    pub fn failed_ranges(&self) -> Vec<DateRange> {
        self.batches
            .iter()
            .filter(|b| !b.success)
            .map(|b| b.range)
            .collect()
    }

    /// Consumes the report, returning the fetched candles as a series.
    #[must_use]
    pub fn into_series(self) -> CandleSeries {
        CandleSeries::new(self.symbol, self.timeframe, self.candles)
    }
}

/// Drives a bulk fetch as a sequence of paced, retried batches.
pub struct BulkFetcher {
    source: Arc<dyn VendorDataSource>,
    pacer: RequestPacer,
    config: FetchConfig,
}

impl std::fmt::Debug for BulkFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BulkFetcher")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl BulkFetcher {
    /// Creates a fetcher over `source` with the given configuration.
    #[must_use]
    pub fn new(source: Arc<dyn VendorDataSource>, config: FetchConfig) -> Self {
        let pacer = RequestPacer::per_second(config.requests_per_second);
        Self {
            source,
            pacer,
            config,
        }
    }

    /// Creates a fetcher with default configuration.
    #[must_use]
    pub fn with_defaults(source: Arc<dyn VendorDataSource>) -> Self {
        Self::new(source, FetchConfig::default())
    }

    /// Fetches `symbol` at `timeframe` across `range`, batch by batch.
    ///
    /// Individual batch failures are recorded in the report rather than
    /// aborting the fetch; an authentication failure stops the remaining
    /// batches since no later batch can succeed.
    pub async fn fetch_range(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        range: DateRange,
    ) -> FetchReport {
        let plan = BatchPlan::for_timeframe(timeframe);
        let batches = plan.split(&range);
        debug!(
            symbol,
            timeframe = %timeframe,
            batches = batches.len(),
            batch_days = plan.batch_days,
            "starting bulk fetch"
        );

        let mut report = FetchReport {
            symbol: symbol.to_string(),
            timeframe,
            candles: Vec::new(),
            batches: Vec::with_capacity(batches.len()),
        };

        for (index, batch) in batches.iter().enumerate() {
            if index > 0 {
                tokio::time::sleep(self.config.batch_delay).await;
            }

            match self.fetch_batch(symbol, timeframe, *batch).await {
                Ok(series) => {
                    report.batches.push(FetchBatchTrace {
                        range: *batch,
                        success: true,
                        candle_count: series.len(),
                        error_message: None,
                        attempted_at: Utc::now(),
                    });
                    report.candles.extend(series.into_candles());
                }
                Err(err) => {
                    let fatal = !err.is_retryable();
                    report.batches.push(FetchBatchTrace {
                        range: *batch,
                        success: false,
                        candle_count: 0,
                        error_message: Some(err.to_string()),
                        attempted_at: Utc::now(),
                    });
                    if fatal {
                        error!(symbol, %err, "authentication failure, aborting remaining batches");
                        break;
                    }
                }
            }
        }

        report
    }

    /// Fetches one batch with exponential-backoff retry.
    async fn fetch_batch(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        batch: DateRange,
    ) -> Result<CandleSeries, VendorError> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            self.pacer.pace().await;
            match self.source.fetch_candles(symbol, timeframe, batch).await {
                Ok(series) => return Ok(series),
                Err(err) if err.is_retryable() && attempt < self.config.max_attempts => {
                    let delay = self.config.base_delay * 2u32.pow(attempt - 1);
                    warn!(
                        symbol,
                        range = %batch,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        %err,
                        "batch fetch failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(err) => return Err(err),
            }
        }
    }
}
