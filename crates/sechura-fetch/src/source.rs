//! Collaborator contracts for vendor data sources and candle storage.
//!
//! Implementations (HTTP vendors, file-backed stores) live outside this
//! workspace; the engine only depends on these traits.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use sechura_types::{AlignmentMetadata, CandleSeries, DateRange, SechuraError, Timeframe};

/// Minimal record of a single trade, returned by the trade-existence probe.
///
/// Used only to decide whether a market was active inside a missing period,
/// never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeStub {
    /// When the trade executed.
    pub timestamp: DateTime<Utc>,
    /// Trade price.
    pub price: Decimal,
    /// Trade size.
    pub size: Decimal,
}

/// Failure kinds a vendor call can surface.
///
/// The retry policy differentiates on the variant: authentication failures
/// are never retried, rate limits and transient faults are retried with
/// backoff.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VendorError {
    /// Credentials were rejected. Retrying cannot help.
    #[error("vendor authentication failed: {0}")]
    Authentication(String),

    /// The vendor throttled the request.
    #[error("vendor rate limit hit: {0}")]
    RateLimit(String),

    /// Network fault, timeout or 5xx-style vendor trouble.
    #[error("transient vendor error: {0}")]
    Transient(String),
}

impl VendorError {
    /// Returns true if a retry with backoff is worth attempting.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        !matches!(self, Self::Authentication(_))
    }
}

impl From<VendorError> for SechuraError {
    fn from(err: VendorError) -> Self {
        Self::Vendor(err.to_string())
    }
}

/// Failure reported by the candle store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("candle store failure: {0}")]
pub struct StorageError(pub String);

impl From<StorageError> for SechuraError {
    fn from(err: StorageError) -> Self {
        Self::Storage(err.0)
    }
}

/// Upstream source of historical candles.
#[async_trait]
pub trait VendorDataSource: Send + Sync {
    /// Fetches candles for `symbol` at `timeframe` across `range`
    /// (inclusive on both ends, date granular).
    async fn fetch_candles(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        range: DateRange,
    ) -> Result<CandleSeries, VendorError>;

    /// Probes for raw trades in `[from, to)`, capped at `limit` results.
    ///
    /// An empty result on an active trading window means the vendor has no
    /// data for it, as opposed to the market being closed.
    async fn fetch_trade_existence(
        &self,
        symbol: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<TradeStub>, VendorError>;

    /// Describes how this vendor aligns the buckets it returns, so the
    /// resampler can reproduce the same boundaries.
    fn describe_alignment(&self) -> AlignmentMetadata;
}

/// Persistent store of candle series.
#[async_trait]
pub trait CandleStore: Send + Sync {
    /// Loads stored candles for `symbol` at `timeframe` across `range`.
    /// Missing data yields an empty series, not an error.
    async fn load(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        range: DateRange,
    ) -> Result<CandleSeries, StorageError>;

    /// Persists `series`, merging with existing data. Per-timestamp
    /// conflicts resolve last-write-wins in favor of `series`.
    async fn store(&self, series: &CandleSeries) -> Result<(), StorageError>;

    /// Counts stored candles for `symbol` at `timeframe` across `range`.
    async fn count_in_range(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        range: DateRange,
    ) -> Result<usize, StorageError>;

    /// Timestamp of the most recent stored candle, or `None` if the store
    /// has never seen this symbol/timeframe pair.
    async fn last_update(
        &self,
        symbol: &str,
        timeframe: Timeframe,
    ) -> Result<Option<DateTime<Utc>>, StorageError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_policy_by_variant() {
        assert!(!VendorError::Authentication("bad key".into()).is_retryable());
        assert!(VendorError::RateLimit("429".into()).is_retryable());
        assert!(VendorError::Transient("timeout".into()).is_retryable());
    }

    #[test]
    fn test_errors_convert_to_umbrella() {
        let err: SechuraError = VendorError::RateLimit("slow down".into()).into();
        assert!(matches!(err, SechuraError::Vendor(_)));

        let err: SechuraError = StorageError("disk full".into()).into();
        assert!(matches!(err, SechuraError::Storage(_)));
    }
}
