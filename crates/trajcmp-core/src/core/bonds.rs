use crate::core::models::element;
use crate::core::models::structure::MolecularStructure;
use kiddo::{KdTree, SquaredEuclidean};
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// An undirected bond between two atom indices, stored as `(min, max)`.
pub type Bond = (usize, usize);

/// Orders a pair of atom indices so that the smaller one comes first.
pub fn canonical_bond(i: usize, j: usize) -> Bond {
    if i <= j { (i, j) } else { (j, i) }
}

pub fn to_bond_set(bonds: impl IntoIterator<Item = (usize, usize)>) -> BTreeSet<Bond> {
    bonds.into_iter().map(|(i, j)| canonical_bond(i, j)).collect()
}

/// Finds all bonds between atoms of element `z1` and atoms of element `z2`.
///
/// Two atoms are bonded when their separation is below the sum of their covalent
/// radii. Elements without a tabulated radius never form bonds.
pub fn detect_bonds(structure: &MolecularStructure, z1: u8, z2: u8) -> BTreeSet<Bond> {
    let mut bonds = BTreeSet::new();
    let (Some(r1), Some(r2)) = (element::covalent_radius(z1), element::covalent_radius(z2)) else {
        return bonds;
    };
    let cutoff = r1 + r2;

    let numbers = structure.atomic_numbers();
    let positions = structure.positions();

    let partner_indices: Vec<usize> = (0..numbers.len()).filter(|&i| numbers[i] == z2).collect();
    if partner_indices.is_empty() {
        return bonds;
    }
    let partner_positions: Vec<[f64; 3]> = partner_indices
        .iter()
        .map(|&i| [positions[i].x, positions[i].y, positions[i].z])
        .collect();
    let kdtree: KdTree<f64, 3> = (&partner_positions).into();

    for (i, &z) in numbers.iter().enumerate() {
        if z != z1 {
            continue;
        }
        let query = [positions[i].x, positions[i].y, positions[i].z];
        for neighbour in kdtree.within::<SquaredEuclidean>(&query, cutoff * cutoff) {
            let j = partner_indices[neighbour.item as usize];
            if i != j && neighbour.distance < cutoff * cutoff {
                bonds.insert(canonical_bond(i, j));
            }
        }
    }
    debug!(
        "Detected {} bonds between elements {} and {}.",
        bonds.len(),
        z1,
        z2
    );
    bonds
}

/// Symmetric difference of two bond sets, split by which side lacks each bond.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BondDifference {
    pub missing_in_first: BTreeSet<Bond>,
    pub missing_in_second: BTreeSet<Bond>,
}

impl BondDifference {
    pub fn between(first: &BTreeSet<Bond>, second: &BTreeSet<Bond>) -> Self {
        Self {
            missing_in_first: second.difference(first).copied().collect(),
            missing_in_second: first.difference(second).copied().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.missing_in_first.is_empty() && self.missing_in_second.is_empty()
    }
}

#[derive(Debug, Deserialize)]
struct ReferenceBondRecord {
    first: String,
    second: String,
    i: usize,
    j: usize,
}

#[derive(Debug, Error)]
pub enum ReferenceLoadError {
    #[error("CSV parsing error for '{path}': {source}")]
    Csv { path: String, source: csv::Error },
    #[error("Unknown element '{element}' in '{path}'")]
    UnknownElement { path: String, element: String },
}

/// Bond deviations of one element pair against the reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BondDeviation {
    pub elements: (u8, u8),
    /// Reference bonds absent from the structure.
    pub broken: BTreeSet<Bond>,
    /// Bonds present in the structure but not in the reference.
    pub formed: BTreeSet<Bond>,
}

/// Expected connectivity of a target molecule, grouped by element pair.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceBonds {
    bonds: BTreeMap<(u8, u8), BTreeSet<Bond>>,
}

impl ReferenceBonds {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a reference from the bonds detected in a known-good structure.
    pub fn from_structure(structure: &MolecularStructure, pairs: &[(u8, u8)]) -> Self {
        let mut reference = Self::new();
        for &(z1, z2) in pairs {
            reference.insert(z1, z2, detect_bonds(structure, z1, z2));
        }
        reference
    }

    pub fn insert(&mut self, z1: u8, z2: u8, bonds: impl IntoIterator<Item = (usize, usize)>) {
        self.bonds
            .entry(Self::key(z1, z2))
            .or_default()
            .extend(bonds.into_iter().map(|(i, j)| canonical_bond(i, j)));
    }

    pub fn bonds(&self, z1: u8, z2: u8) -> Option<&BTreeSet<Bond>> {
        self.bonds.get(&Self::key(z1, z2))
    }

    pub fn element_pairs(&self) -> impl Iterator<Item = (u8, u8)> + '_ {
        self.bonds.keys().copied()
    }

    fn key(z1: u8, z2: u8) -> (u8, u8) {
        if z1 <= z2 { (z1, z2) } else { (z2, z1) }
    }

    /// Loads a reference table with `first,second,i,j` columns, one bond per row.
    pub fn load(path: &Path) -> Result<Self, ReferenceLoadError> {
        let mut reader = csv::Reader::from_path(path).map_err(|e| ReferenceLoadError::Csv {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;

        let mut reference = Self::new();
        for result in reader.deserialize::<ReferenceBondRecord>() {
            let record = result.map_err(|e| ReferenceLoadError::Csv {
                path: path.to_string_lossy().to_string(),
                source: e,
            })?;
            let lookup = |symbol: &str| {
                element::parse_element(symbol).ok_or_else(|| ReferenceLoadError::UnknownElement {
                    path: path.to_string_lossy().to_string(),
                    element: symbol.to_string(),
                })
            };
            let z1 = lookup(&record.first)?;
            let z2 = lookup(&record.second)?;
            reference.insert(z1, z2, [(record.i, record.j)]);
        }
        Ok(reference)
    }

    /// Compares the structure's connectivity to the reference for every element pair.
    ///
    /// Only element pairs with at least one broken or formed bond are returned.
    pub fn deviations(&self, structure: &MolecularStructure) -> Vec<BondDeviation> {
        self.bonds
            .iter()
            .filter_map(|(&(z1, z2), expected)| {
                let found = detect_bonds(structure, z1, z2);
                let diff = BondDifference::between(&found, expected);
                if diff.is_empty() {
                    None
                } else {
                    Some(BondDeviation {
                        elements: (z1, z2),
                        broken: diff.missing_in_first,
                        formed: diff.missing_in_second,
                    })
                }
            })
            .collect()
    }

    pub fn matches(&self, structure: &MolecularStructure) -> bool {
        self.deviations(structure).is_empty()
    }
}
