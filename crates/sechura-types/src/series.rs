//! Time-ordered candle series.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{Candle, Timeframe};

/// A strictly time-ordered sequence of candles for one (symbol, timeframe)
/// unit.
///
/// Construction sorts the input and deduplicates by timestamp with
/// last-write-wins semantics. A series is never mutated in place;
/// transformations such as [`CandleSeries::merge`] produce a new series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandleSeries {
    /// The ticker symbol this series belongs to.
    pub symbol: String,
    /// The bucket duration of every candle in the series.
    pub timeframe: Timeframe,
    /// Candles in ascending timestamp order, no duplicates.
    candles: Vec<Candle>,
}

impl CandleSeries {
    /// Creates a series from unordered candles, sorting and deduplicating by
    /// timestamp (later entries in the input win).
    #[must_use]
    pub fn new(symbol: impl Into<String>, timeframe: Timeframe, candles: Vec<Candle>) -> Self {
        let mut candles = candles;
        // Stable sort keeps input order within equal timestamps, so the later
        // duplicate survives the backwards dedup below.
        candles.sort_by_key(|c| c.timestamp);
        let mut deduped: Vec<Candle> = Vec::with_capacity(candles.len());
        for candle in candles {
            match deduped.last() {
                Some(last) if last.timestamp == candle.timestamp => {
                    *deduped.last_mut().expect("non-empty") = candle;
                }
                _ => deduped.push(candle),
            }
        }
        Self {
            symbol: symbol.into(),
            timeframe,
            candles: deduped,
        }
    }

    /// Creates an empty series.
    #[must_use]
    pub fn empty(symbol: impl Into<String>, timeframe: Timeframe) -> Self {
        Self {
            symbol: symbol.into(),
            timeframe,
            candles: Vec::new(),
        }
    }

    /// Returns the candles in ascending timestamp order.
    #[must_use]
    pub fn candles(&self) -> &[Candle] {
        &self.candles
    }

    /// Consumes the series, returning its candles.
    #[must_use]
    pub fn into_candles(self) -> Vec<Candle> {
        self.candles
    }

    /// Returns the number of candles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.candles.len()
    }

    /// Returns true if the series has no candles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    /// Returns the timestamp of the first candle, if any.
    #[must_use]
    pub fn first_timestamp(&self) -> Option<DateTime<Utc>> {
        self.candles.first().map(|c| c.timestamp)
    }

    /// Returns the timestamp of the last candle, if any.
    #[must_use]
    pub fn last_timestamp(&self) -> Option<DateTime<Utc>> {
        self.candles.last().map(|c| c.timestamp)
    }

    /// Returns a new series merged with `other`, preferring `other`'s candles
    /// when timestamps collide.
    #[must_use]
    pub fn merge(&self, other: &Self) -> Self {
        let mut combined = self.candles.clone();
        combined.extend(other.candles.iter().copied());
        Self::new(self.symbol.clone(), self.timeframe, combined)
    }

    /// Returns a new series restricted to candles with timestamps in
    /// `[start, end)`.
    #[must_use]
    pub fn slice(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        let candles = self
            .candles
            .iter()
            .filter(|c| c.timestamp >= start && c.timestamp < end)
            .copied()
            .collect();
        Self {
            symbol: self.symbol.clone(),
            timeframe: self.timeframe,
            candles,
        }
    }

    /// Returns a new series restricted to candles falling on `date` (UTC).
    #[must_use]
    pub fn on_date(&self, date: NaiveDate) -> Self {
        let candles = self
            .candles
            .iter()
            .filter(|c| c.timestamp.date_naive() == date)
            .copied()
            .collect();
        Self {
            symbol: self.symbol.clone(),
            timeframe: self.timeframe,
            candles,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn candle(minute: u32, close: rust_decimal::Decimal) -> Candle {
        let ts = Utc.with_ymd_and_hms(2025, 1, 15, 13, minute, 0).unwrap();
        Candle::new(ts, close, close, close, close, dec!(100)).unwrap()
    }

    #[test]
    fn test_sorts_and_dedupes() {
        let series = CandleSeries::new(
            "AAPL",
            Timeframe::Minute1,
            vec![candle(32, dec!(10)), candle(30, dec!(11)), candle(32, dec!(12))],
        );
        assert_eq!(series.len(), 2);
        assert_eq!(series.candles()[0].close, dec!(11));
        // Last write wins for the duplicated 13:32 timestamp.
        assert_eq!(series.candles()[1].close, dec!(12));
    }

    #[test]
    fn test_merge_prefers_other() {
        let base = CandleSeries::new(
            "AAPL",
            Timeframe::Minute1,
            vec![candle(30, dec!(10)), candle(31, dec!(10))],
        );
        let fresh = CandleSeries::new("AAPL", Timeframe::Minute1, vec![candle(31, dec!(99))]);
        let merged = base.merge(&fresh);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged.candles()[1].close, dec!(99));
    }

    #[test]
    fn test_slice_half_open() {
        let series = CandleSeries::new(
            "AAPL",
            Timeframe::Minute1,
            vec![candle(30, dec!(1)), candle(31, dec!(2)), candle(32, dec!(3))],
        );
        let start = Utc.with_ymd_and_hms(2025, 1, 15, 13, 30, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2025, 1, 15, 13, 32, 0).unwrap();
        assert_eq!(series.slice(start, end).len(), 2);
    }
}
