//! OHLCV candle representation.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::CandleError;

/// A single OHLCV bar for a fixed time bucket.
///
/// Prices and volume use exact decimal arithmetic so that aggregation across
/// thousands of bars cannot accumulate rounding drift. A candle is immutable
/// once constructed; [`Candle::new`] rejects values that violate the OHLC
/// invariants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candle {
    /// Bar open time (start of the bucket, UTC).
    pub timestamp: DateTime<Utc>,
    /// Opening price.
    pub open: Decimal,
    /// Highest price during the bucket.
    pub high: Decimal,
    /// Lowest price during the bucket.
    pub low: Decimal,
    /// Closing price.
    pub close: Decimal,
    /// Total traded volume.
    pub volume: Decimal,
}

impl Candle {
    /// Creates a new candle, validating the OHLC invariants.
    ///
    /// # Errors
    ///
    /// Returns [`CandleError::Malformed`] when `low > high`, when open or
    /// close fall outside `[low, high]`, when any price is zero or negative,
    /// or when volume is negative.
    pub fn new(
        timestamp: DateTime<Utc>,
        open: Decimal,
        high: Decimal,
        low: Decimal,
        close: Decimal,
        volume: Decimal,
    ) -> Result<Self, CandleError> {
        if open <= Decimal::ZERO
            || high <= Decimal::ZERO
            || low <= Decimal::ZERO
            || close <= Decimal::ZERO
        {
            return Err(CandleError::Malformed {
                timestamp,
                reason: "price is zero or negative".to_string(),
            });
        }
        if high < low {
            return Err(CandleError::Malformed {
                timestamp,
                reason: format!("high ({high}) < low ({low})"),
            });
        }
        if open < low || open > high || close < low || close > high {
            return Err(CandleError::Malformed {
                timestamp,
                reason: "open/close outside [low, high]".to_string(),
            });
        }
        if volume < Decimal::ZERO {
            return Err(CandleError::Malformed {
                timestamp,
                reason: format!("negative volume ({volume})"),
            });
        }
        Ok(Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        })
    }

    /// Returns the price range (high - low).
    #[must_use]
    pub fn range(&self) -> Decimal {
        self.high - self.low
    }

    /// Returns the body size (|close - open|).
    #[must_use]
    pub fn body(&self) -> Decimal {
        (self.close - self.open).abs()
    }

    /// Returns true if this is a bullish (green) bar.
    #[must_use]
    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }

    /// Returns true if this is a bearish (red) bar.
    #[must_use]
    pub fn is_bearish(&self) -> bool {
        self.close < self.open
    }
}
