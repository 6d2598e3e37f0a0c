//! Calendar-aware completeness validation.
//!
//! Diffs stored 1-minute candles against the trading calendar's expected
//! minute grid and reports missing periods plus per-candle integrity
//! findings:
//!
//! - [`Validator`] - per-day and per-range validation
//! - [`ValidationResult`] - read-only per-day artifact
//! - [`CompletenessSummary`] - multi-day rollup

#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod result;
mod validator;

pub use result::{CompletenessSummary, ValidationResult};
pub use validator::Validator;
