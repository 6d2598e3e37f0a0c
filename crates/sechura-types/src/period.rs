//! Missing time periods detected by the completeness validator.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// A maximal run of consecutive missing expected minutes.
///
/// The range is half-open: `start` is the first missing minute, `end` is one
/// minute past the last missing minute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissingPeriod {
    /// First missing minute (inclusive, UTC).
    pub start: DateTime<Utc>,
    /// End of the run (exclusive, UTC).
    pub end: DateTime<Utc>,
}

impl MissingPeriod {
    /// Creates a new missing period.
    #[must_use]
    pub const fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Number of 1-minute candles expected inside the period.
    #[must_use]
    pub fn expected_candles(&self) -> usize {
        (self.end - self.start).num_minutes().max(0) as usize
    }

    /// Iterates over the missing minute timestamps, start inclusive to end
    /// exclusive.
    pub fn minutes(&self) -> impl Iterator<Item = DateTime<Utc>> + '_ {
        let count = self.expected_candles();
        (0..count).map(move |i| self.start + TimeDelta::minutes(i as i64))
    }

    /// Returns true if `ts` falls within `[start, end)`.
    #[must_use]
    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        ts >= self.start && ts < self.end
    }
}

impl std::fmt::Display for MissingPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}
