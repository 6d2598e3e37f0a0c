//! Vendor-declared aggregation alignment metadata.

use serde::{Deserialize, Serialize};

/// How a vendor anchors its intraday aggregation buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlignmentStrategy {
    /// Buckets anchored to the market session open (e.g. 13:30 UTC for US
    /// equities).
    SessionAligned,
    /// Buckets anchored to UTC midnight.
    UtcAligned,
}

/// Where a vendor places its daily bucket boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DailyBoundary {
    /// Daily bars close at the market close (20:00 UTC for US equities).
    MarketClose,
    /// Daily bars close at UTC midnight.
    UtcMidnight,
    /// Boundary depends on the asset class (market close for US equities,
    /// UTC midnight otherwise).
    AssetSpecific,
}

/// A vendor's declared aggregation behavior.
///
/// Returned by `VendorDataSource::describe_alignment` and consumed by the
/// resampling engine when derived bars must match a specific vendor's native
/// aggregates instead of the asset-class default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlignmentMetadata {
    /// Overall anchoring strategy.
    pub alignment_strategy: AlignmentStrategy,
    /// Daily bucket boundary convention.
    pub daily_boundary: DailyBoundary,
    /// Intraday anchoring, which can differ from the daily convention.
    pub intraday_alignment: AlignmentStrategy,
}

impl AlignmentMetadata {
    /// Alignment used by vendors that aggregate on plain UTC boundaries with
    /// asset-specific daily bars.
    #[must_use]
    pub const fn utc_aligned() -> Self {
        Self {
            alignment_strategy: AlignmentStrategy::UtcAligned,
            daily_boundary: DailyBoundary::AssetSpecific,
            intraday_alignment: AlignmentStrategy::UtcAligned,
        }
    }

    /// Alignment used by vendors that aggregate relative to the market
    /// session.
    #[must_use]
    pub const fn session_aligned() -> Self {
        Self {
            alignment_strategy: AlignmentStrategy::SessionAligned,
            daily_boundary: DailyBoundary::MarketClose,
            intraday_alignment: AlignmentStrategy::SessionAligned,
        }
    }
}
