//! Candle aggregation timeframe definitions.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Candle aggregation timeframe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Timeframe {
    /// 1-minute bars.
    #[default]
    #[serde(rename = "1min")]
    Minute1,
    /// 5-minute bars.
    #[serde(rename = "5min")]
    Minute5,
    /// 15-minute bars.
    #[serde(rename = "15min")]
    Minute15,
    /// 30-minute bars.
    #[serde(rename = "30min")]
    Minute30,
    /// 1-hour bars.
    #[serde(rename = "1h")]
    Hour1,
    /// 2-hour bars.
    #[serde(rename = "2h")]
    Hour2,
    /// 4-hour bars.
    #[serde(rename = "4h")]
    Hour4,
    /// Daily bars.
    #[serde(rename = "daily")]
    Daily,
}

impl Timeframe {
    /// Returns the bucket duration in minutes.
    #[must_use]
    pub const fn minutes(&self) -> u32 {
        match self {
            Self::Minute1 => 1,
            Self::Minute5 => 5,
            Self::Minute15 => 15,
            Self::Minute30 => 30,
            Self::Hour1 => 60,
            Self::Hour2 => 120,
            Self::Hour4 => 240,
            Self::Daily => 1440,
        }
    }

    /// Returns the bucket duration in seconds.
    #[must_use]
    pub const fn seconds(&self) -> u64 {
        self.minutes() as u64 * 60
    }

    /// Returns true if the bucket is shorter than a day.
    #[must_use]
    pub const fn is_intraday(&self) -> bool {
        !matches!(self, Self::Daily)
    }

    /// Returns the timeframe as a string identifier.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Minute1 => "1min",
            Self::Minute5 => "5min",
            Self::Minute15 => "15min",
            Self::Minute30 => "30min",
            Self::Hour1 => "1h",
            Self::Hour2 => "2h",
            Self::Hour4 => "4h",
            Self::Daily => "daily",
        }
    }

    /// Returns all timeframes, shortest first.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Minute1,
            Self::Minute5,
            Self::Minute15,
            Self::Minute30,
            Self::Hour1,
            Self::Hour2,
            Self::Hour4,
            Self::Daily,
        ]
    }

    /// Returns the standard resampling targets derived from 1-minute data,
    /// shortest first.
    #[must_use]
    pub const fn resample_targets() -> &'static [Self] {
        &[
            Self::Minute5,
            Self::Minute15,
            Self::Minute30,
            Self::Hour1,
            Self::Hour2,
            Self::Hour4,
            Self::Daily,
        ]
    }
}

impl std::fmt::Display for Timeframe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Timeframe {
    type Err = TimeframeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "1min" | "m1" | "1m" | "minute" => Ok(Self::Minute1),
            "5min" | "m5" | "5m" => Ok(Self::Minute5),
            "15min" | "m15" | "15m" => Ok(Self::Minute15),
            "30min" | "m30" | "30m" => Ok(Self::Minute30),
            "1h" | "h1" | "hour" => Ok(Self::Hour1),
            "2h" | "h2" => Ok(Self::Hour2),
            "4h" | "h4" => Ok(Self::Hour4),
            "daily" | "d1" | "1d" | "day" => Ok(Self::Daily),
            _ => Err(TimeframeParseError(s.to_string())),
        }
    }
}

/// Error returned when parsing an invalid timeframe string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeframeParseError(String);

impl std::fmt::Display for TimeframeParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid timeframe '{}', expected one of: 1min, 5min, 15min, 30min, 1h, 2h, 4h, daily",
            self.0
        )
    }
}

impl std::error::Error for TimeframeParseError {}
