//! Asset-aware OHLCV resampling.
//!
//! Folds fine candles into coarser buckets with boundaries that reproduce
//! vendor-native aggregation:
//!
//! - [`resample`] - asset-class default alignment
//! - [`resample_with_alignment`] - vendor-declared alignment metadata
//!
//! All arithmetic is exact decimal, so bucket volume is the exact sum of
//! its contributors with no floating drift.

#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod bucket;
mod engine;

pub use engine::{ResampleError, resample, resample_with_alignment};
