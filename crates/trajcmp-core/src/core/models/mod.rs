//! # Core Models Module
//!
//! Data structures describing molecular geometries as they flow through the comparison engine.
//!
//! ## Key Components
//!
//! - [`element`] - Element symbols, atomic numbers and covalent radii
//! - [`structure`] - A single geometry: atomic numbers, positions and descriptive metadata
//! - [`trajectory`] - Ordered sequences of structures and the on-disk sources they are loaded from
//!
//! ## Usage
//!
//! ```ignore
//! use trajcmp::core::models::structure::MolecularStructure;
//!
//! let co = MolecularStructure::from_coords(vec![6, 8], &[[0.0, 0.0, 0.0], [1.128, 0.0, 0.0]])?;
//! assert_eq!(co.symbols(), vec!["C", "O"]);
//! ```

pub mod element;
pub mod structure;
pub mod trajectory;
