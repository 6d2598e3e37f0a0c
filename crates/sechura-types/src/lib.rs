//! Core types for the sechura market-data engine.
//!
//! This crate provides the fundamental data structures used throughout
//! sechura:
//!
//! - [`Candle`] - One OHLCV bar with exact-decimal prices and volume
//! - [`CandleSeries`] - Time-ordered, deduplicated candles for one
//!   (symbol, timeframe) unit
//! - [`Timeframe`] - Candle bucket duration, 1 minute through daily
//! - [`AssetClass`] / [`MarketSession`] - Asset classes and their trading
//!   sessions, which select resampling alignment
//! - [`AlignmentMetadata`] - A vendor's declared aggregation behavior
//! - [`MissingPeriod`] - A maximal run of expected-but-absent minutes
//! - [`DateRange`] - Inclusive date range for data retrieval

#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod alignment;
mod asset;
mod candle;
mod date_range;
mod error;
mod period;
mod series;
mod timeframe;

pub use alignment::{AlignmentMetadata, AlignmentStrategy, DailyBoundary};
pub use asset::{AssetClass, MarketSession};
pub use candle::Candle;
pub use date_range::{DateRange, DayIterator};
pub use error::{CandleError, DateRangeError, Result, SechuraError};
pub use period::MissingPeriod;
pub use series::CandleSeries;
pub use timeframe::{Timeframe, TimeframeParseError};
