//! Streaming candle-to-candle resampling.

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::debug;

use sechura_types::{
    AlignmentMetadata, AssetClass, Candle, CandleSeries, SechuraError, Timeframe,
};

use crate::bucket::BucketRule;

/// Errors rejecting a resample call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResampleError {
    /// The target timeframe is not strictly longer than the source.
    #[error("cannot resample {from} to {target}: target must be strictly longer")]
    UnsupportedTimeframe {
        /// Source timeframe.
        from: Timeframe,
        /// Requested target timeframe.
        target: Timeframe,
    },
}

impl From<ResampleError> for SechuraError {
    fn from(err: ResampleError) -> Self {
        Self::Resample(err.to_string())
    }
}

/// Resamples `source` to `target` using the asset-class alignment defaults.
///
/// Buckets with no contributing candles are omitted, never zero-filled. An
/// empty source yields an empty series.
///
/// # Errors
///
/// Returns [`ResampleError::UnsupportedTimeframe`] if `target` is not
/// strictly longer than the source timeframe.
pub fn resample(
    source: &CandleSeries,
    target: Timeframe,
    asset_class: AssetClass,
) -> Result<CandleSeries, ResampleError> {
    let rule = BucketRule::for_asset(target, asset_class);
    run(source, target, rule)
}

/// Resamples `source` to `target` reproducing a specific vendor's declared
/// bucket alignment instead of the asset-class default.
///
/// Used when cross-validating derived bars against a second data source.
///
/// # Errors
///
/// Returns [`ResampleError::UnsupportedTimeframe`] if `target` is not
/// strictly longer than the source timeframe.
pub fn resample_with_alignment(
    source: &CandleSeries,
    target: Timeframe,
    asset_class: AssetClass,
    alignment: &AlignmentMetadata,
) -> Result<CandleSeries, ResampleError> {
    let rule = BucketRule::for_alignment(target, asset_class, alignment);
    run(source, target, rule)
}

fn run(
    source: &CandleSeries,
    target: Timeframe,
    rule: BucketRule,
) -> Result<CandleSeries, ResampleError> {
    if target.minutes() <= source.timeframe.minutes() {
        return Err(ResampleError::UnsupportedTimeframe {
            from: source.timeframe,
            target,
        });
    }

    let mut aggregator = CandleAggregator::new(rule);
    let mut out = Vec::with_capacity(source.len() / 2 + 1);
    for candle in source.candles() {
        if let Some(done) = aggregator.process(candle) {
            out.push(done);
        }
    }
    if let Some(done) = aggregator.finish() {
        out.push(done);
    }

    debug!(
        symbol = %source.symbol,
        source_tf = %source.timeframe,
        target_tf = %target,
        input = source.len(),
        output = out.len(),
        "resampled series"
    );
    Ok(CandleSeries::new(source.symbol.clone(), target, out))
}

/// Streaming aggregator folding finer candles into target buckets.
#[derive(Debug)]
struct CandleAggregator {
    rule: BucketRule,
    current: Option<BucketBuilder>,
}

impl CandleAggregator {
    const fn new(rule: BucketRule) -> Self {
        Self {
            rule,
            current: None,
        }
    }

    /// Folds in one source candle, emitting the previous bucket when this
    /// candle opens a new one. Source candles arrive in timestamp order.
    fn process(&mut self, candle: &Candle) -> Option<Candle> {
        let bucket_start = self.rule.bucket_start(candle.timestamp);

        match self.current.take() {
            Some(mut builder) if builder.timestamp == bucket_start => {
                builder.update(candle);
                self.current = Some(builder);
                None
            }
            Some(builder) => {
                let completed = builder.finish();
                self.current = Some(BucketBuilder::new(bucket_start, candle));
                Some(completed)
            }
            None => {
                self.current = Some(BucketBuilder::new(bucket_start, candle));
                None
            }
        }
    }

    /// Emits the trailing partial bucket, if any.
    fn finish(self) -> Option<Candle> {
        self.current.map(BucketBuilder::finish)
    }
}

/// Accumulates OHLCV over one bucket.
#[derive(Debug)]
struct BucketBuilder {
    timestamp: DateTime<Utc>,
    open: rust_decimal::Decimal,
    high: rust_decimal::Decimal,
    low: rust_decimal::Decimal,
    close: rust_decimal::Decimal,
    volume: rust_decimal::Decimal,
}

impl BucketBuilder {
    const fn new(timestamp: DateTime<Utc>, first: &Candle) -> Self {
        Self {
            timestamp,
            open: first.open,
            high: first.high,
            low: first.low,
            close: first.close,
            volume: first.volume,
        }
    }

    fn update(&mut self, candle: &Candle) {
        self.high = self.high.max(candle.high);
        self.low = self.low.min(candle.low);
        self.close = candle.close;
        self.volume += candle.volume;
    }

    /// Aggregation preserves the OHLC invariants of its inputs, so the
    /// candle is built directly instead of revalidating.
    const fn finish(self) -> Candle {
        Candle {
            timestamp: self.timestamp,
            open: self.open,
            high: self.high,
            low: self.low,
            close: self.close,
            volume: self.volume,
        }
    }
}
