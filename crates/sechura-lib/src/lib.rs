//! Market-data completeness and resampling engine.
//!
//! Facade crate re-exporting the sechura workspace: calendar-aware
//! completeness validation of minute-resolution OHLCV data, targeted gap
//! recovery, asset-aware resampling and the nightly update coordinator.
//!
//! # Quick Start
//!
//! ```ignore
//! use sechura_lib::prelude::*;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let vendor: Arc<dyn VendorDataSource> = make_vendor();
//!     let store: Arc<dyn CandleStore> = make_store();
//!
//!     let coordinator = UpdateCoordinator::new(
//!         vendor,
//!         store,
//!         TradingCalendar::default(),
//!         AssetClassifier::new(),
//!         CoordinatorConfig::default(),
//!     );
//!     let request = UpdateRequest {
//!         symbols: vec!["AAPL".to_string()],
//!         enable_resampling: true,
//!         ..UpdateRequest::default()
//!     };
//!     let summary = coordinator.run(&request, &NullProgressSink).await;
//!     println!("updated {} candles", summary.candles_updated);
//! }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Re-export core types
pub use sechura_types::*;

// Re-export the asset classifier and trading calendar
pub use sechura_calendar::{
    CalendarConfig, DaySchedule, ExchangeCalendarFeed, TradingCalendar,
};
pub use sechura_classify::AssetClassifier;

// Re-export vendor and storage contracts
#[cfg(feature = "fetch")]
pub use sechura_fetch::{
    BatchPlan, BulkFetcher, CandleStore, FetchBatchTrace, FetchConfig, FetchReport, RequestPacer,
    StorageError, TradeStub, VENDOR_RESULT_CAP, VendorDataSource, VendorError,
};

// Re-export validation
#[cfg(feature = "validate")]
pub use sechura_validate::{CompletenessSummary, ValidationResult, Validator};

// Re-export resampling
#[cfg(feature = "resample")]
pub use sechura_resample::{ResampleError, resample, resample_with_alignment};

// Re-export gap recovery
#[cfg(feature = "recover")]
pub use sechura_recover::{GapFillOutcome, GapFillStatus, GapRecovery};

// Re-export the nightly coordinator
#[cfg(feature = "nightly")]
pub use sechura_nightly::{
    CoordinatorConfig, JobId, JobRecord, JobRegistry, NullProgressSink, ProgressSink,
    SymbolProgress, SymbolUpdateResult, UpdateCoordinator, UpdatePhase, UpdateRequest,
    UpdateSummary,
};

/// Prelude module for convenient imports.
///
/// ```
/// use sechura_lib::prelude::*;
/// ```
pub mod prelude {
    pub use sechura_types::{
        AlignmentMetadata, AssetClass, Candle, CandleSeries, DateRange, MarketSession,
        MissingPeriod, Result, SechuraError, Timeframe,
    };

    pub use sechura_calendar::TradingCalendar;
    pub use sechura_classify::AssetClassifier;

    #[cfg(feature = "fetch")]
    pub use sechura_fetch::{BulkFetcher, CandleStore, VendorDataSource, VendorError};

    #[cfg(feature = "validate")]
    pub use sechura_validate::{CompletenessSummary, ValidationResult, Validator};

    #[cfg(feature = "resample")]
    pub use sechura_resample::{resample, resample_with_alignment};

    #[cfg(feature = "recover")]
    pub use sechura_recover::{GapFillOutcome, GapFillStatus, GapRecovery};

    #[cfg(feature = "nightly")]
    pub use sechura_nightly::{
        CoordinatorConfig, JobRegistry, NullProgressSink, ProgressSink, UpdateCoordinator,
        UpdateRequest, UpdateSummary,
    };
}
