use crate::core::models::structure::MolecularStructure;
use crate::core::utils::geometry;
use nalgebra::Point3;
use serde::Deserialize;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum FeatureError {
    #[error("Atom index {index} is out of range for a structure with {len} atoms")]
    AtomIndexOutOfRange { index: usize, len: usize },
    #[error("{0} is undefined for coincident atoms")]
    Degenerate(String),
}

/// An internal coordinate measured on a single structure.
///
/// Distances are in Angstroms, angles and dihedrals in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(tag = "kind", content = "atoms", rename_all = "kebab-case")]
pub enum Feature {
    /// Distance between two atoms.
    Distance([usize; 2]),
    /// Bending angle with the vertex at the middle atom.
    Angle([usize; 3]),
    /// Torsion angle about the bond between the two middle atoms.
    Dihedral([usize; 4]),
}

impl Feature {
    pub fn atoms(&self) -> &[usize] {
        match self {
            Feature::Distance(atoms) => atoms,
            Feature::Angle(atoms) => atoms,
            Feature::Dihedral(atoms) => atoms,
        }
    }

    fn kind_name(&self) -> &'static str {
        match self {
            Feature::Distance(_) => "Distance",
            Feature::Angle(_) => "Bending angle",
            Feature::Dihedral(_) => "Torsion angle",
        }
    }

    fn positions<'a>(
        &self,
        structure: &'a MolecularStructure,
    ) -> Result<Vec<&'a Point3<f64>>, FeatureError> {
        let positions = structure.positions();
        self.atoms()
            .iter()
            .map(|&index| {
                positions.get(index).ok_or(FeatureError::AtomIndexOutOfRange {
                    index,
                    len: positions.len(),
                })
            })
            .collect()
    }

    /// Measures this feature on `structure`.
    ///
    /// # Errors
    ///
    /// Returns [`FeatureError::AtomIndexOutOfRange`] for an index past the end of the structure
    /// and [`FeatureError::Degenerate`] when an angle is undefined because atoms coincide.
    pub fn value(&self, structure: &MolecularStructure) -> Result<f64, FeatureError> {
        let p = self.positions(structure)?;
        let value = match self {
            Feature::Distance(_) => Some((p[0] - p[1]).norm()),
            Feature::Angle(_) => geometry::bond_angle(p[0], p[1], p[2]),
            Feature::Dihedral(_) => geometry::dihedral_angle(p[0], p[1], p[2], p[3]),
        };
        value.ok_or_else(|| FeatureError::Degenerate(self.to_string()))
    }

    /// Human-readable description naming the atoms by element and index,
    /// e.g. `"Distance between atoms C(0)-O(2)"`.
    pub fn describe(&self, structure: &MolecularStructure) -> String {
        let symbols = structure.symbols();
        let atoms = self
            .atoms()
            .iter()
            .map(|&i| format!("{}({})", symbols.get(i).copied().unwrap_or("?"), i))
            .collect::<Vec<_>>()
            .join("-");
        format!("{} between atoms {}", self.kind_name(), atoms)
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let atoms = self
            .atoms()
            .iter()
            .map(|i| i.to_string())
            .collect::<Vec<_>>()
            .join("-");
        write!(f, "{} {}", self.kind_name(), atoms)
    }
}
