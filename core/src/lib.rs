//! # sweepr core
//!
//! Probing and coordination for the `sweepr` scanner.
//!
//! * **[`network`]**: the TCP connect probe.
//! * **[`scanner`]**: the [`Prober`](scanner::Prober) abstraction and the
//!   bounded, cancellable coordinator that turns a job into a report.

pub mod network;
pub mod scanner;
