//! Vendor contracts and the bulk fetch driver.
//!
//! This crate defines the seams between the engine and its collaborators:
//!
//! - [`VendorDataSource`] / [`CandleStore`] - contracts implemented outside
//!   the workspace
//! - [`VendorError`] - failure taxonomy with a differentiated retry policy
//! - [`RequestPacer`] - request spacing under vendor rate limits
//! - [`BatchPlan`] - batch sizing against the vendor result cap
//! - [`BulkFetcher`] - paced, retried batch fetching with per-batch traces

#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod batch;
mod bulk;
mod pacer;
mod source;

pub use batch::{BatchPlan, VENDOR_RESULT_CAP};
pub use bulk::{BulkFetcher, FetchBatchTrace, FetchConfig, FetchReport};
pub use pacer::RequestPacer;
pub use source::{CandleStore, StorageError, TradeStub, VendorDataSource, VendorError};
