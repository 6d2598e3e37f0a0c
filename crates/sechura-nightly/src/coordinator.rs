//! Nightly update coordination across symbols.

use chrono::{DateTime, NaiveDate, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{info, warn};

use sechura_calendar::TradingCalendar;
use sechura_classify::AssetClassifier;
use sechura_fetch::{BulkFetcher, CandleStore, FetchConfig, VendorDataSource};
use sechura_recover::{GapFillOutcome, GapRecovery};
use sechura_types::{DateRange, MissingPeriod, Timeframe};
use sechura_validate::{ValidationResult, Validator};

use crate::job::{ProgressSink, SymbolProgress, UpdatePhase};

/// Tuning knobs for the coordinator.
#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    /// Symbols processed in parallel. Conservative by default: vendor rate
    /// limits bite before CPU does.
    pub max_concurrent: usize,
    /// Missing periods attempted per symbol per run.
    pub max_gap_attempts: usize,
    /// History window when a symbol has never been stored.
    pub lookback_days: u32,
    /// Bulk fetch retry and pacing settings.
    pub fetch: FetchConfig,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            max_concurrent: 3,
            max_gap_attempts: 10,
            lookback_days: 90,
            fetch: FetchConfig::default(),
        }
    }
}

/// What a coordinator run should cover.
#[derive(Debug, Clone, Default)]
pub struct UpdateRequest {
    /// Symbols to update.
    pub symbols: Vec<String>,
    /// Validate the full window even when stored data looks current.
    pub force_validation: bool,
    /// Override of the configured concurrency bound.
    pub max_concurrent: Option<usize>,
    /// Rebuild derived timeframes after the source refresh.
    pub enable_resampling: bool,
    /// Explicit window start; derived from the store when absent.
    pub start_date: Option<NaiveDate>,
    /// Explicit window end; the most recent trading day when absent.
    pub end_date: Option<NaiveDate>,
}

/// Per-symbol outcome of one coordinator run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymbolUpdateResult {
    /// Symbol that was processed.
    pub symbol: String,
    /// True when every pipeline step finished clean.
    pub success: bool,
    /// Net new 1-minute candles in the window after recovery and refresh.
    pub candles_updated: usize,
    /// Per-day validation artifacts.
    pub validation_results: Vec<ValidationResult>,
    /// Gap recovery outcomes, one per targeted period.
    pub gap_outcomes: Vec<GapFillOutcome>,
    /// Derived candles written per target timeframe.
    pub resampling_results: HashMap<Timeframe, usize>,
    /// Why the pipeline failed, when it did.
    pub error_message: Option<String>,
}

impl SymbolUpdateResult {
    fn failed(symbol: &str, message: String) -> Self {
        Self {
            symbol: symbol.to_string(),
            success: false,
            candles_updated: 0,
            validation_results: Vec::new(),
            gap_outcomes: Vec::new(),
            resampling_results: HashMap::new(),
            error_message: Some(message),
        }
    }
}

/// Aggregate outcome of one coordinator run.
///
/// Every requested symbol appears in `results`, failed ones included.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateSummary {
    /// Symbols requested.
    pub total_symbols: usize,
    /// Symbols that finished clean.
    pub succeeded: usize,
    /// Symbols that failed.
    pub failed: usize,
    /// Net new 1-minute candles across all symbols.
    pub candles_updated: usize,
    /// Earliest date any symbol's window started.
    pub earliest_date: Option<NaiveDate>,
    /// Latest date any symbol's window ended.
    pub latest_date: Option<NaiveDate>,
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// When the run finished.
    pub finished_at: DateTime<Utc>,
    /// Per-symbol outcomes.
    pub results: Vec<SymbolUpdateResult>,
}

impl UpdateSummary {
    /// Wall-clock duration of the run.
    #[must_use]
    pub fn duration(&self) -> TimeDelta {
        self.finished_at - self.started_at
    }
}

/// Sequences validate, recover, refresh and resample per symbol with a
/// bounded cross-symbol concurrency.
pub struct UpdateCoordinator {
    store: Arc<dyn CandleStore>,
    calendar: TradingCalendar,
    classifier: AssetClassifier,
    validator: Validator,
    recovery: GapRecovery,
    fetcher: BulkFetcher,
    config: CoordinatorConfig,
}

impl std::fmt::Debug for UpdateCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpdateCoordinator")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl UpdateCoordinator {
    /// Creates a coordinator over the given collaborators.
    #[must_use]
    pub fn new(
        vendor: Arc<dyn VendorDataSource>,
        store: Arc<dyn CandleStore>,
        calendar: TradingCalendar,
        classifier: AssetClassifier,
        config: CoordinatorConfig,
    ) -> Self {
        let validator = Validator::new(calendar.clone(), store.clone());
        let recovery = GapRecovery::new(vendor.clone(), store.clone());
        let fetcher = BulkFetcher::new(vendor, config.fetch.clone());
        Self {
            store,
            calendar,
            classifier,
            validator,
            recovery,
            fetcher,
            config,
        }
    }

    /// Runs the full update for `request`, reporting progress to `sink`.
    ///
    /// Symbols are independent: one symbol's failure is recorded in its
    /// result while the others keep running.
    pub async fn run(&self, request: &UpdateRequest, sink: &dyn ProgressSink) -> UpdateSummary {
        let started_at = Utc::now();
        let bound = request
            .max_concurrent
            .unwrap_or(self.config.max_concurrent)
            .max(1);
        let semaphore = Arc::new(Semaphore::new(bound));
        info!(
            symbols = request.symbols.len(),
            max_concurrent = bound,
            "starting nightly update"
        );

        let tasks = request.symbols.iter().map(|symbol| {
            let semaphore = semaphore.clone();
            async move {
                report(sink, symbol, UpdatePhase::Pending, "queued", None);
                let _permit = semaphore
                    .acquire()
                    .await
                    .expect("semaphore is never closed");
                self.process_symbol(symbol, request, sink).await
            }
        });
        let results = futures::future::join_all(tasks).await;

        let succeeded = results.iter().filter(|r| r.success).count();
        let candles_updated = results.iter().map(|r| r.candles_updated).sum();
        let mut earliest_date: Option<NaiveDate> = None;
        let mut latest_date: Option<NaiveDate> = None;
        for validation in results.iter().flat_map(|r| &r.validation_results) {
            earliest_date = Some(earliest_date.map_or(validation.date, |d| d.min(validation.date)));
            latest_date = Some(latest_date.map_or(validation.date, |d| d.max(validation.date)));
        }

        let summary = UpdateSummary {
            total_symbols: results.len(),
            succeeded,
            failed: results.len() - succeeded,
            candles_updated,
            earliest_date,
            latest_date,
            started_at,
            finished_at: Utc::now(),
            results,
        };
        info!(
            succeeded = summary.succeeded,
            failed = summary.failed,
            candles = summary.candles_updated,
            "nightly update finished"
        );
        summary
    }

    /// One symbol's strictly sequential pipeline.
    async fn process_symbol(
        &self,
        symbol: &str,
        request: &UpdateRequest,
        sink: &dyn ProgressSink,
    ) -> SymbolUpdateResult {
        let range = match self.resolve_range(symbol, request).await {
            Ok(Some(range)) => range,
            Ok(None) => {
                report(sink, symbol, UpdatePhase::Completed, "already up to date", None);
                return SymbolUpdateResult {
                    symbol: symbol.to_string(),
                    success: true,
                    candles_updated: 0,
                    validation_results: Vec::new(),
                    gap_outcomes: Vec::new(),
                    resampling_results: HashMap::new(),
                    error_message: None,
                };
            }
            Err(message) => {
                report(sink, symbol, UpdatePhase::Failed, "resolving window", Some(&message));
                return SymbolUpdateResult::failed(symbol, message);
            }
        };

        report(
            sink,
            symbol,
            UpdatePhase::Validating,
            &format!("validating {range}"),
            None,
        );
        let validation_results = self.validator.validate_range(symbol, &range).await;
        let missing: Vec<MissingPeriod> = validation_results
            .iter()
            .flat_map(|r| r.missing_periods.iter().copied())
            .collect();

        report(
            sink,
            symbol,
            UpdatePhase::Downloading,
            &format!("recovering {} gaps, refreshing {range}", missing.len()),
            None,
        );
        // Recovery and refresh overlap, so new candles are measured as the
        // store delta over the window rather than by tallying both writes.
        let stored_before = match self
            .store
            .count_in_range(symbol, Timeframe::Minute1, range)
            .await
        {
            Ok(count) => count,
            Err(err) => {
                let message = err.to_string();
                report(sink, symbol, UpdatePhase::Failed, "counting stored candles", Some(&message));
                return SymbolUpdateResult {
                    validation_results,
                    ..SymbolUpdateResult::failed(symbol, message)
                };
            }
        };

        let gap_outcomes = self
            .recovery
            .recover_gaps(symbol, &missing, self.config.max_gap_attempts)
            .await;

        let refresh = self
            .fetcher
            .fetch_range(symbol, Timeframe::Minute1, range)
            .await;
        if !refresh.batches.is_empty() && refresh.failed_batches() == refresh.batches.len() {
            let message = refresh
                .batches
                .first()
                .and_then(|b| b.error_message.clone())
                .unwrap_or_else(|| "all fetch batches failed".to_string());
            report(sink, symbol, UpdatePhase::Failed, "source refresh", Some(&message));
            return SymbolUpdateResult {
                validation_results,
                gap_outcomes,
                ..SymbolUpdateResult::failed(symbol, message)
            };
        }
        if refresh.failed_batches() > 0 {
            warn!(
                symbol,
                failed = refresh.failed_batches(),
                "refresh left failed batches for the next recovery pass"
            );
        }
        if refresh.candle_count() > 0 {
            let series = refresh.into_series();
            if let Err(err) = self.store.store(&series).await {
                let message = err.to_string();
                report(sink, symbol, UpdatePhase::Failed, "persisting refresh", Some(&message));
                return SymbolUpdateResult {
                    validation_results,
                    gap_outcomes,
                    ..SymbolUpdateResult::failed(symbol, message)
                };
            }
        }
        let candles_updated = match self
            .store
            .count_in_range(symbol, Timeframe::Minute1, range)
            .await
        {
            Ok(count) => count.saturating_sub(stored_before),
            Err(err) => {
                let message = err.to_string();
                report(sink, symbol, UpdatePhase::Failed, "counting stored candles", Some(&message));
                return SymbolUpdateResult {
                    validation_results,
                    gap_outcomes,
                    ..SymbolUpdateResult::failed(symbol, message)
                };
            }
        };

        let mut resampling_results = HashMap::new();
        if request.enable_resampling {
            report(
                sink,
                symbol,
                UpdatePhase::Resampling,
                "rebuilding derived timeframes",
                None,
            );
            match self.resample_symbol(symbol, range).await {
                Ok(counts) => resampling_results = counts,
                Err(message) => {
                    report(sink, symbol, UpdatePhase::Failed, "resampling", Some(&message));
                    return SymbolUpdateResult {
                        symbol: symbol.to_string(),
                        success: false,
                        candles_updated,
                        validation_results,
                        gap_outcomes,
                        resampling_results: HashMap::new(),
                        error_message: Some(message),
                    };
                }
            }
        }

        report(sink, symbol, UpdatePhase::Completed, "done", None);
        SymbolUpdateResult {
            symbol: symbol.to_string(),
            success: true,
            candles_updated,
            validation_results,
            gap_outcomes,
            resampling_results,
            error_message: None,
        }
    }

    /// Rebuilds every derived timeframe from the stored 1-minute series.
    /// Runs only after gap recovery so derived bars see corrected source
    /// data.
    async fn resample_symbol(
        &self,
        symbol: &str,
        range: DateRange,
    ) -> Result<HashMap<Timeframe, usize>, String> {
        let source = self
            .store
            .load(symbol, Timeframe::Minute1, range)
            .await
            .map_err(|e| e.to_string())?;
        let asset_class = self.classifier.classify(symbol);

        let mut counts = HashMap::new();
        for target in Timeframe::resample_targets() {
            let derived = sechura_resample::resample(&source, *target, asset_class)
                .map_err(|e| e.to_string())?;
            let count = derived.len();
            if count > 0 {
                self.store.store(&derived).await.map_err(|e| e.to_string())?;
            }
            counts.insert(*target, count);
        }
        Ok(counts)
    }

    /// Decides the date window to process for `symbol`.
    ///
    /// `Ok(None)` means the stored data already covers the window and
    /// validation was not forced.
    async fn resolve_range(
        &self,
        symbol: &str,
        request: &UpdateRequest,
    ) -> Result<Option<DateRange>, String> {
        let today = Utc::now().date_naive();
        let end = request.end_date.unwrap_or_else(|| {
            if self.calendar.is_trading_day(today) {
                today
            } else {
                self.calendar.previous_trading_day(today)
            }
        });

        let fallback_start = end - TimeDelta::days(i64::from(self.config.lookback_days));
        let start = if let Some(start) = request.start_date {
            start
        } else if request.force_validation {
            fallback_start
        } else {
            let last = self
                .store
                .last_update(symbol, Timeframe::Minute1)
                .await
                .map_err(|e| e.to_string())?;
            match last {
                Some(ts) => {
                    // Resume from the last stored day itself, not the day
                    // after: a partial final download must be revalidated.
                    let resume = ts.date_naive();
                    if resume > end {
                        return Ok(None);
                    }
                    resume
                }
                None => fallback_start,
            }
        };

        if start > end {
            return Ok(None);
        }
        DateRange::new(start, end)
            .map(Some)
            .map_err(|e| e.to_string())
    }
}

fn report(
    sink: &dyn ProgressSink,
    symbol: &str,
    phase: UpdatePhase,
    step: &str,
    error: Option<&str>,
) {
    sink.report(SymbolProgress {
        symbol: symbol.to_string(),
        phase,
        percent: phase.percent(),
        current_step: step.to_string(),
        error_message: error.map(str::to_string),
    });
}
