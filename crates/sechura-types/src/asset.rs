//! Asset classes and their market session characteristics.

use serde::{Deserialize, Serialize};

/// Asset class of a traded symbol.
///
/// Derived from symbol text on demand, never persisted. The class selects the
/// resampling alignment policy and the session window used by validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AssetClass {
    /// US stock market securities (NYSE, NASDAQ).
    UsEquity,
    /// Digital currencies trading around the clock.
    Crypto,
    /// Currency pairs trading in global sessions.
    Forex,
    /// Physical goods and futures contracts.
    Commodity,
    /// Non-US stock market securities.
    InternationalEquity,
    /// Asset class could not be determined.
    #[default]
    Unknown,
}

impl AssetClass {
    /// Returns the market session attached to this class, or `None` for
    /// classes that trade 24/7 or have no defined session.
    #[must_use]
    pub const fn session(&self) -> Option<MarketSession> {
        match self {
            Self::UsEquity => Some(MarketSession::US_EQUITY),
            Self::Forex => Some(MarketSession::LONDON_FOREX),
            _ => None,
        }
    }

    /// Returns true if intraday resampling buckets are anchored to the
    /// session open instead of UTC midnight.
    #[must_use]
    pub const fn uses_session_alignment(&self) -> bool {
        matches!(self, Self::UsEquity | Self::Forex)
    }

    /// Returns true if the market trades 24/7 (or nearly so).
    #[must_use]
    pub const fn is_24_7(&self) -> bool {
        matches!(self, Self::Crypto | Self::Forex)
    }

    /// Returns the class as a string identifier.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::UsEquity => "us_equity",
            Self::Crypto => "crypto",
            Self::Forex => "forex",
            Self::Commodity => "commodity",
            Self::InternationalEquity => "international_equity",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for AssetClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Regular trading session of a market, expressed in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketSession {
    /// Human-readable session name.
    pub name: &'static str,
    /// Session open hour (UTC).
    pub open_hour: u32,
    /// Session open minute (UTC).
    pub open_minute: u32,
    /// Session close hour (UTC).
    pub close_hour: u32,
    /// Session close minute (UTC).
    pub close_minute: u32,
    /// IANA timezone label of the home market.
    pub timezone: &'static str,
}

impl MarketSession {
    /// US equity regular hours, 9:30 AM - 4:00 PM ET expressed in UTC.
    pub const US_EQUITY: Self = Self {
        name: "US Equity Regular Hours",
        open_hour: 13,
        open_minute: 30,
        close_hour: 20,
        close_minute: 0,
        timezone: "America/New_York",
    };

    /// London forex session.
    pub const LONDON_FOREX: Self = Self {
        name: "London Forex Session",
        open_hour: 8,
        open_minute: 0,
        close_hour: 17,
        close_minute: 0,
        timezone: "Europe/London",
    };

    /// Minutes from UTC midnight to the session open, used as the bucket
    /// anchor for session-aligned resampling.
    #[must_use]
    pub const fn open_offset_minutes(&self) -> u32 {
        self.open_hour * 60 + self.open_minute
    }

    /// Session length in minutes.
    #[must_use]
    pub const fn length_minutes(&self) -> u32 {
        (self.close_hour * 60 + self.close_minute) - self.open_offset_minutes()
    }
}
