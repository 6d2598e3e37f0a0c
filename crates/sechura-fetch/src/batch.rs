//! Batch-size governance for bulk fetches.
//!
//! Vendors cap the number of results per request, so a long date range must
//! be split into batches sized by how many candles one trading day yields at
//! the requested timeframe.

use chrono::TimeDelta;

use sechura_types::{DateRange, Timeframe};

/// Hard per-request result cap imposed by the vendor.
pub const VENDOR_RESULT_CAP: u32 = 50_000;

/// Results budget per batch, kept under the cap with a 10% safety margin.
const SAFETY_LIMIT: u32 = VENDOR_RESULT_CAP / 10 * 9;

/// Tradable minutes in a regular US equity session.
const FULL_SESSION_MINUTES: u32 = 390;

/// How a date range is carved into vendor-sized batches for one timeframe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchPlan {
    /// Timeframe being fetched.
    pub timeframe: Timeframe,
    /// Candles a full trading day yields at this timeframe.
    pub candles_per_day: u32,
    /// Calendar days covered by one batch.
    pub batch_days: u32,
}

impl BatchPlan {
    /// Computes the batch sizing for `timeframe`.
    #[must_use]
    pub const fn for_timeframe(timeframe: Timeframe) -> Self {
        let candles_per_day = if matches!(timeframe, Timeframe::Daily) {
            1
        } else {
            let per_day = FULL_SESSION_MINUTES / timeframe.minutes();
            if per_day == 0 { 1 } else { per_day }
        };

        let ceiling = match timeframe {
            Timeframe::Minute1 => 60,
            Timeframe::Minute5 | Timeframe::Minute15 => 90,
            _ => 365,
        };

        let days = SAFETY_LIMIT / candles_per_day;
        let batch_days = if days > ceiling {
            ceiling
        } else if days == 0 {
            1
        } else {
            days
        };

        Self {
            timeframe,
            candles_per_day,
            batch_days,
        }
    }

    /// Splits `range` into consecutive batches of at most `batch_days`
    /// days each, in ascending order. Ranges stay inclusive on both ends.
    #[must_use]
    pub fn split(&self, range: &DateRange) -> Vec<DateRange> {
        let mut batches = Vec::new();
        let mut cursor = range.start;
        while cursor <= range.end {
            let batch_end = (cursor + TimeDelta::days(i64::from(self.batch_days) - 1))
                .min(range.end);
            batches.push(DateRange::new(cursor, batch_end).expect("cursor <= batch_end"));
            cursor = batch_end + TimeDelta::days(1);
        }
        batches
    }
}
