use super::structure::MolecularStructure;
use crate::core::io::traits::MolecularFile;
use crate::core::io::xyz::{XyzError, XyzFile};
use serde::Deserialize;
use std::path::PathBuf;

/// Which steps of a multi-block geometry file to keep.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StepSelection {
    /// Every block in file order.
    #[default]
    All,
    /// `n` indices linearly spaced from the first to the last block, both included.
    ///
    /// Values of 0 or 1 select every block.
    Count(usize),
    /// Explicit 0-based block indices; out-of-range entries are dropped.
    Indices(Vec<usize>),
}

impl StepSelection {
    /// Resolves the selection against a sequence of `len` items.
    pub fn resolve(&self, len: usize) -> Vec<usize> {
        match self {
            StepSelection::All => (0..len).collect(),
            StepSelection::Count(n) if *n > 1 && len > 0 => linspace_indices(0, len - 1, *n),
            StepSelection::Count(_) => (0..len).collect(),
            StepSelection::Indices(indices) => {
                indices.iter().copied().filter(|&i| i < len).collect()
            }
        }
    }

    pub fn apply<T: Clone>(&self, items: &[T]) -> Vec<T> {
        self.resolve(items.len())
            .into_iter()
            .map(|i| items[i].clone())
            .collect()
    }
}

/// `num` integer indices evenly spaced over `[start, end]`, truncated toward zero.
///
/// The first index is always `start` and, for `num > 1`, the last is always `end`.
pub fn linspace_indices(start: usize, end: usize, num: usize) -> Vec<usize> {
    match num {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let span = end as f64 - start as f64;
            let step = span / (num - 1) as f64;
            (0..num)
                .map(|k| {
                    if k == num - 1 {
                        end
                    } else {
                        (start as f64 + k as f64 * step) as usize
                    }
                })
                .collect()
        }
    }
}

/// A named, ordered sequence of structures: optimization steps, MD frames or conformers.
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    pub name: String,
    pub structures: Vec<MolecularStructure>,
}

impl Trajectory {
    pub fn new(name: impl Into<String>, structures: Vec<MolecularStructure>) -> Self {
        Self {
            name: name.into(),
            structures,
        }
    }

    pub fn len(&self) -> usize {
        self.structures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.structures.is_empty()
    }

    pub fn first(&self) -> Option<&MolecularStructure> {
        self.structures.first()
    }

    pub fn last(&self) -> Option<&MolecularStructure> {
        self.structures.last()
    }

    pub fn step(&self, i: usize) -> Option<&MolecularStructure> {
        self.structures.get(i)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MolecularStructure> {
        self.structures.iter()
    }
}

/// A geometry file on disk together with a logical name and a step selection.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TrajectorySource {
    pub path: PathBuf,
    pub name: String,
    #[serde(default)]
    pub selection: StepSelection,
}

impl TrajectorySource {
    pub fn new(path: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
            selection: StepSelection::All,
        }
    }

    pub fn with_selection(mut self, selection: StepSelection) -> Self {
        self.selection = selection;
        self
    }

    /// Reads the file, names every block after `self.name` and applies the step selection.
    pub fn load(&self) -> Result<Trajectory, XyzError> {
        let structures = XyzFile::read_named_from_path(&self.path, &self.name)?;
        Ok(Trajectory::new(
            self.name.clone(),
            self.selection.apply(&structures),
        ))
    }
}
