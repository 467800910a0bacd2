//! # Core Module
//!
//! Stateless building blocks shared by the comparison engine: molecular geometry models,
//! file codecs, geometric primitives, and structural bookkeeping.
//!
//! ## Architecture
//!
//! - **Molecular Representation** ([`models`]) - Structures, element data and trajectories
//! - **File I/O** ([`io`]) - Reading and writing multi-block XYZ geometry files
//! - **Geometry** ([`utils`]) - Kabsch superposition, RMSD, bond and torsion angles
//! - **Structural Features** ([`features`]) - Distances, angles and dihedrals with constraints
//! - **Connectivity** ([`bonds`]) - Covalent-radius bond detection and reference comparison
//!
//! Nothing in this layer holds state between calls; every operation is a pure function of
//! its inputs.

pub mod bonds;
pub mod features;
pub mod io;
pub mod models;
pub mod utils;
