use super::element;
use nalgebra::Point3;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum StructureError {
    #[error("Structure has {numbers} atomic numbers but {positions} positions")]
    LengthMismatch { numbers: usize, positions: usize },
}

/// Descriptive metadata attached to a structure.
///
/// Every field defaults to an empty string, so a missing field is simply `""`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct StructureInfo {
    /// Logical name, e.g. the file stem with a 1-based block suffix.
    pub name: String,
    /// Free-text description, typically the comment line of a geometry block.
    pub description: String,
    /// Origin of the structure, typically the file name it was read from.
    pub source: String,
}

impl StructureInfo {
    pub fn new(name: &str, description: &str, source: &str) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            source: source.to_string(),
        }
    }
}

/// A molecule's discrete geometry: atom identities plus Cartesian coordinates.
///
/// Atom order is the identity of an atom. Two structures being compared are expected to list
/// chemically equivalent atoms at the same indices; no correspondence search is performed.
#[derive(Debug, Clone, PartialEq)]
pub struct MolecularStructure {
    atomic_numbers: Vec<u8>,
    positions: Vec<Point3<f64>>,
    info: StructureInfo,
}

impl MolecularStructure {
    /// Creates a structure from parallel atomic-number and position sequences.
    ///
    /// # Errors
    ///
    /// Returns [`StructureError::LengthMismatch`] if the two sequences differ in length.
    pub fn new(
        atomic_numbers: Vec<u8>,
        positions: Vec<Point3<f64>>,
        info: StructureInfo,
    ) -> Result<Self, StructureError> {
        if atomic_numbers.len() != positions.len() {
            return Err(StructureError::LengthMismatch {
                numbers: atomic_numbers.len(),
                positions: positions.len(),
            });
        }
        Ok(Self {
            atomic_numbers,
            positions,
            info,
        })
    }

    /// Creates a structure from plain `[x, y, z]` triples with empty metadata.
    pub fn from_coords(
        atomic_numbers: Vec<u8>,
        coords: &[[f64; 3]],
    ) -> Result<Self, StructureError> {
        let positions = coords
            .iter()
            .map(|&[x, y, z]| Point3::new(x, y, z))
            .collect();
        Self::new(atomic_numbers, positions, StructureInfo::default())
    }

    pub fn len(&self) -> usize {
        self.atomic_numbers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atomic_numbers.is_empty()
    }

    pub fn atomic_numbers(&self) -> &[u8] {
        &self.atomic_numbers
    }

    pub fn positions(&self) -> &[Point3<f64>] {
        &self.positions
    }

    pub fn info(&self) -> &StructureInfo {
        &self.info
    }

    pub fn name(&self) -> &str {
        &self.info.name
    }

    pub fn description(&self) -> &str {
        &self.info.description
    }

    pub fn source(&self) -> &str {
        &self.info.source
    }

    pub fn with_info(mut self, info: StructureInfo) -> Self {
        self.info = info;
        self
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.info.name = name.into();
    }

    pub fn set_source(&mut self, source: impl Into<String>) {
        self.info.source = source.into();
    }

    /// Returns a copy of this structure carrying new positions.
    ///
    /// Atom identities and metadata are kept; the receiver is left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`StructureError::LengthMismatch`] if `positions` has a different atom count.
    pub fn with_positions(&self, positions: Vec<Point3<f64>>) -> Result<Self, StructureError> {
        Self::new(self.atomic_numbers.clone(), positions, self.info.clone())
    }

    /// Element symbols in atom order; unknown atomic numbers map to `"X"`.
    pub fn symbols(&self) -> Vec<&'static str> {
        self.atomic_numbers
            .iter()
            .map(|&z| element::symbol(z).unwrap_or("X"))
            .collect()
    }

    /// Euclidean distance between atoms `i` and `j`, or `None` if either index is out of range.
    pub fn distance(&self, i: usize, j: usize) -> Option<f64> {
        let a = self.positions.get(i)?;
        let b = self.positions.get(j)?;
        Some((a - b).norm())
    }

    /// Full N×N inter-atomic distance matrix in row-major order.
    pub fn distance_matrix(&self) -> Vec<Vec<f64>> {
        let n = self.len();
        let mut matrix = vec![vec![0.0; n]; n];
        for i in 0..n {
            for j in (i + 1)..n {
                let d = (self.positions[i] - self.positions[j]).norm();
                matrix[i][j] = d;
                matrix[j][i] = d;
            }
        }
        matrix
    }

    /// Returns `true` if both structures have identical atom identities and all inter-atomic
    /// distances agree within `rtol * |b| + atol`.
    pub fn is_equivalent_to(&self, other: &Self, rtol: f64, atol: f64) -> bool {
        if self.atomic_numbers != other.atomic_numbers {
            return false;
        }
        let d1 = self.distance_matrix();
        let d2 = other.distance_matrix();
        d1.iter().zip(d2.iter()).all(|(row1, row2)| {
            row1.iter()
                .zip(row2.iter())
                .all(|(a, b)| (a - b).abs() <= atol + rtol * b.abs())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn water() -> MolecularStructure {
        MolecularStructure::from_coords(
            vec![8, 1, 1],
            &[[0.0, 0.0, 0.0], [0.9572, 0.0, 0.0], [-0.2399, 0.9266, 0.0]],
        )
        .unwrap()
    }

    #[test]
    fn new_rejects_mismatched_lengths() {
        let result = MolecularStructure::new(
            vec![6, 8],
            vec![Point3::origin()],
            StructureInfo::default(),
        );
        assert_eq!(
            result,
            Err(StructureError::LengthMismatch {
                numbers: 2,
                positions: 1
            })
        );
    }

    #[test]
    fn missing_metadata_resolves_to_empty_strings() {
        let s = water();
        assert_eq!(s.name(), "");
        assert_eq!(s.description(), "");
        assert_eq!(s.source(), "");
    }

    #[test]
    fn symbols_follow_atom_order() {
        assert_eq!(water().symbols(), vec!["O", "H", "H"]);
    }

    #[test]
    fn distance_returns_none_for_out_of_range_index() {
        let s = water();
        assert!((s.distance(0, 1).unwrap() - 0.9572).abs() < 1e-12);
        assert_eq!(s.distance(0, 3), None);
    }

    #[test]
    fn distance_matrix_is_symmetric_with_zero_diagonal() {
        let m = water().distance_matrix();
        assert_eq!(m.len(), 3);
        for i in 0..3 {
            assert_eq!(m[i][i], 0.0);
            for j in 0..3 {
                assert_eq!(m[i][j], m[j][i]);
            }
        }
    }

    #[test]
    fn with_positions_keeps_original_untouched() {
        let original = water().with_info(StructureInfo::new("w", "water", "w.xyz"));
        let moved: Vec<_> = original
            .positions()
            .iter()
            .map(|p| p + nalgebra::Vector3::new(1.0, 0.0, 0.0))
            .collect();
        let shifted = original.with_positions(moved).unwrap();

        assert_eq!(shifted.info(), original.info());
        assert_eq!(shifted.atomic_numbers(), original.atomic_numbers());
        assert_eq!(original.positions()[0], Point3::origin());
        assert_eq!(shifted.positions()[0], Point3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn translated_copy_is_equivalent() {
        let s = water();
        let moved: Vec<_> = s
            .positions()
            .iter()
            .map(|p| p + nalgebra::Vector3::new(3.0, -2.0, 5.0))
            .collect();
        let t = s.with_positions(moved).unwrap();
        assert!(s.is_equivalent_to(&t, 1e-5, 1e-8));
    }

    #[test]
    fn different_elements_are_not_equivalent() {
        let s = water();
        let t = MolecularStructure::new(
            vec![16, 1, 1],
            s.positions().to_vec(),
            StructureInfo::default(),
        )
        .unwrap();
        assert!(!s.is_equivalent_to(&t, 1e-5, 1e-8));
    }
}
