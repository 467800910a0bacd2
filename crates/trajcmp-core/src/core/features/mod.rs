//! Internal-coordinate features measured on single structures and the constraints that
//! decide whether a structure is acceptable.

pub mod constraints;
pub mod feature;
