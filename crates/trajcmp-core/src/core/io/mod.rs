//! Provides input/output functionality for molecular geometry files.
//!
//! The [`traits::MolecularFile`] trait gives every format the same reader/writer surface;
//! [`xyz`] implements it for multi-block XYZ files (trajectories and conformer ensembles).

pub mod traits;
pub mod xyz;
