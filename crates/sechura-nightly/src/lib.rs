//! Nightly update coordination.
//!
//! Glue over the validator, gap recovery, bulk fetcher and resampler:
//!
//! - [`UpdateCoordinator`] - per-symbol validate, recover, refresh,
//!   resample pipeline with bounded cross-symbol concurrency
//! - [`JobRegistry`] - explicit in-process job tracking
//! - [`ProgressSink`] - caller-owned progress reporting contract

#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod coordinator;
mod job;

pub use coordinator::{
    CoordinatorConfig, SymbolUpdateResult, UpdateCoordinator, UpdateRequest, UpdateSummary,
};
pub use job::{
    JobId, JobRecord, JobRegistry, NullProgressSink, ProgressSink, SymbolProgress, UpdatePhase,
};
