//! # sweepr common
//!
//! Shared data model for the `sweepr` scanner.
//!
//! * **[`network`]**: address ranges, probe targets and local interface lookup.
//! * **[`scan`]**: scan jobs, per-target outcomes and the frozen report.
//! * **[`config`]**: explicit scan and output settings.
//! * **[`error`]**: typed errors surfaced to callers.

pub mod config;
pub mod error;
pub mod log;
pub mod network;
pub mod scan;

#[doc(hidden)]
pub use tracing;
