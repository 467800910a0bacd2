//! # trajcmp Core Library
//!
//! Geometric similarity comparison of molecular conformers and optimization trajectories.
//!
//! ## Architectural Philosophy
//!
//! The library follows a strict three-layer architecture:
//!
//! - **[`core`]: The Foundation.** Stateless data models (`MolecularStructure`, `Trajectory`),
//!   the multi-block XYZ codec, Kabsch superposition and other geometric primitives, plus
//!   structural features and covalent bond bookkeeping.
//!
//! - **[`engine`]: The Comparison Core.** Structural metrics, alignment, the one-to-many,
//!   many-to-many and all-pairs batch drivers, the near-duplicate filter and the trajectory
//!   analyzer that derives per-step series of N trajectories against a base trajectory.
//!
//! - **[`workflows`]: The Public API.** File-level procedures that load geometries, run the
//!   engine and return serializable results: trajectory analysis, duplicate search,
//!   cross-file comparison, aligned export and feature measurement.
//!
//! Structures are compared atom by atom in file order: atom `i` of one structure is assumed
//! to correspond to atom `i` of the other.

pub mod core;
pub mod engine;
pub mod workflows;
