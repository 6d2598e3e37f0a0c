//! Bucket boundary rules for resampling.
//!
//! Boundaries must exactly reproduce vendor-native aggregation or derived
//! bars drift off the vendor's own aggregates. The rules:
//!
//! - 5/15/30-minute targets are anchored to the session open for assets
//!   with a defined session (13:30 UTC for US equities, 08:00 UTC for
//!   forex) and to UTC midnight otherwise.
//! - 1h/2h/4h targets are always UTC-hour aligned, even for session
//!   assets, because vendors aggregate long intraday bars on UTC hours.
//! - Daily targets close at 20:00 UTC for US equities and at UTC midnight
//!   for everything else.
//!
//! All buckets are labeled at their start instant.

use chrono::{DateTime, NaiveTime, TimeDelta, Utc};

use sechura_types::{AlignmentMetadata, AlignmentStrategy, AssetClass, DailyBoundary, Timeframe};

/// US equity daily bars close at 20:00 UTC.
const MARKET_CLOSE_HOUR: u32 = 20;

/// Resolved bucket boundary rule for one (timeframe, asset) pairing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BucketRule {
    /// Fixed-width minute buckets anchored `offset_minutes` past UTC
    /// midnight.
    Minutes {
        /// Bucket width in minutes.
        interval: u32,
        /// Anchor offset from UTC midnight in minutes.
        offset_minutes: u32,
    },
    /// Daily buckets bounded at 20:00 UTC.
    DailyMarketClose,
    /// Daily buckets bounded at UTC midnight.
    DailyMidnight,
}

impl BucketRule {
    /// Resolves the rule for `target` using the asset-class defaults.
    pub(crate) fn for_asset(target: Timeframe, asset_class: AssetClass) -> Self {
        match target {
            Timeframe::Daily => {
                if asset_class == AssetClass::UsEquity {
                    Self::DailyMarketClose
                } else {
                    Self::DailyMidnight
                }
            }
            Timeframe::Hour1 | Timeframe::Hour2 | Timeframe::Hour4 => Self::Minutes {
                interval: target.minutes(),
                offset_minutes: 0,
            },
            _ => Self::Minutes {
                interval: target.minutes(),
                offset_minutes: session_offset(asset_class),
            },
        }
    }

    /// Resolves the rule for `target` from vendor-declared alignment
    /// metadata, falling back to asset-class defaults where the metadata
    /// delegates.
    pub(crate) fn for_alignment(
        target: Timeframe,
        asset_class: AssetClass,
        alignment: &AlignmentMetadata,
    ) -> Self {
        match target {
            Timeframe::Daily => match alignment.daily_boundary {
                DailyBoundary::MarketClose => Self::DailyMarketClose,
                DailyBoundary::UtcMidnight => Self::DailyMidnight,
                DailyBoundary::AssetSpecific => Self::for_asset(target, asset_class),
            },
            Timeframe::Hour1 | Timeframe::Hour2 | Timeframe::Hour4 => Self::Minutes {
                interval: target.minutes(),
                offset_minutes: 0,
            },
            _ => {
                let offset = match alignment.intraday_alignment {
                    AlignmentStrategy::SessionAligned => session_offset(asset_class),
                    AlignmentStrategy::UtcAligned => 0,
                };
                Self::Minutes {
                    interval: target.minutes(),
                    offset_minutes: offset,
                }
            }
        }
    }

    /// Start instant of the bucket containing `timestamp`.
    pub(crate) fn bucket_start(&self, timestamp: DateTime<Utc>) -> DateTime<Utc> {
        match *self {
            Self::Minutes {
                interval,
                offset_minutes,
            } => {
                let midnight = timestamp
                    .date_naive()
                    .and_time(NaiveTime::MIN)
                    .and_utc();
                let minutes = (timestamp - midnight).num_minutes();
                let rem =
                    (minutes - i64::from(offset_minutes)).rem_euclid(i64::from(interval));
                // A pre-anchor timestamp lands in a bucket opened the
                // previous day; the subtraction goes negative and the
                // addition walks back across midnight.
                midnight + TimeDelta::minutes(minutes - rem)
            }
            Self::DailyMarketClose => {
                let close = timestamp
                    .date_naive()
                    .and_hms_opt(MARKET_CLOSE_HOUR, 0, 0)
                    .expect("valid time")
                    .and_utc();
                if timestamp < close {
                    close - TimeDelta::days(1)
                } else {
                    close
                }
            }
            Self::DailyMidnight => timestamp
                .date_naive()
                .and_time(NaiveTime::MIN)
                .and_utc(),
        }
    }
}

fn session_offset(asset_class: AssetClass) -> u32 {
    asset_class
        .session()
        .map_or(0, |s| s.open_offset_minutes())
}
