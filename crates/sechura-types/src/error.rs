//! Error types shared across the sechura workspace.

use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;

/// Result type alias for sechura operations.
pub type Result<T> = std::result::Result<T, SechuraError>;

/// Errors that can occur during ingestion, validation and resampling.
///
/// Vendor, storage and resampling failures originate in their own crates'
/// error enums and convert into the matching variant here via `From` impls
/// defined next to those enums.
#[derive(Error, Debug)]
pub enum SechuraError {
    /// A candle violated its construction invariants.
    #[error(transparent)]
    Candle(#[from] CandleError),

    /// Invalid date range.
    #[error(transparent)]
    DateRange(#[from] DateRangeError),

    /// A vendor call failed.
    #[error("vendor error: {0}")]
    Vendor(String),

    /// The candle store failed.
    #[error("storage error: {0}")]
    Storage(String),

    /// A resample operation was rejected or failed.
    #[error("resample error: {0}")]
    Resample(String),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Error for candles that violate OHLC/volume invariants at construction.
///
/// Always fatal to the single data point, never to a batch: callers drop the
/// candle and log.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CandleError {
    /// OHLC or volume invariants violated.
    #[error("malformed candle at {timestamp}: {reason}")]
    Malformed {
        /// Timestamp of the offending candle.
        timestamp: DateTime<Utc>,
        /// What was wrong with it.
        reason: String,
    },
}

/// Error for invalid date ranges.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DateRangeError {
    /// Start date is after end date.
    #[error("invalid date range: {start} > {end}")]
    InvalidRange {
        /// The start date.
        start: NaiveDate,
        /// The end date.
        end: NaiveDate,
    },
}
