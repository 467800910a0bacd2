//! # Engine Module
//!
//! The comparison engine: structural metrics, rigid-body alignment, batch comparison drivers
//! and the analyses built on top of them.
//!
//! ## Architecture
//!
//! - **Metrics** ([`metrics`]) - Closed set of structure-to-structure distance measures
//! - **Alignment** ([`align`]) - Kabsch superposition of one structure onto another
//! - **Batch Comparison** ([`batch`]) - One-to-many, many-to-many and all-pairs drivers,
//!   parallelized with rayon when the `parallel` feature is enabled
//! - **Near-Duplicate Filtering** ([`filter`]) - Threshold selection over pair values
//! - **Trajectory Analysis** ([`trajectory`]) - Derived series of N trajectories against a base
//! - **Configuration** ([`config`]) - Builders for analysis and duplicate-search parameters
//! - **Progress Monitoring** ([`progress`]) - Callback-based progress events
//! - **Error Handling** ([`error`]) - Comparison and analyzer error types
//!
//! Parallel and sequential evaluation produce identical, identically ordered results.

pub mod align;
pub mod batch;
pub mod config;
pub mod error;
pub mod filter;
pub mod metrics;
pub mod progress;
pub mod trajectory;
