use super::align::align;
use super::error::ComparisonError;
use super::metrics::Metric;
use super::progress::{Progress, ProgressReporter};
use crate::core::models::structure::{MolecularStructure, StructureInfo};
use itertools::Itertools;
use std::collections::BTreeMap;
use tracing::{debug, instrument, warn};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Metric values for every unordered pair `(i, j)`, `i < j`, of one structure set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PairwiseComparison {
    /// Metadata of the compared structures, indexed like the input.
    pub info: Vec<StructureInfo>,
    pub values: BTreeMap<(usize, usize), f64>,
    /// Pairs whose comparison failed; disjoint from `values`.
    pub failures: BTreeMap<(usize, usize), ComparisonError>,
}

impl PairwiseComparison {
    /// Looks up a pair in either orientation.
    pub fn get(&self, i: usize, j: usize) -> Option<f64> {
        let key = if i <= j { (i, j) } else { (j, i) };
        self.values.get(&key).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Metric values for every `(target, structure)` combination of two structure sets.
///
/// Keys are `(i, j)` with `i` indexing the targets and `j` the structures.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CrossComparison {
    pub values: BTreeMap<(usize, usize), f64>,
    /// Combinations whose comparison failed; disjoint from `values`.
    pub failures: BTreeMap<(usize, usize), ComparisonError>,
}

impl CrossComparison {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

type PairOutcomes = (
    BTreeMap<(usize, usize), f64>,
    BTreeMap<(usize, usize), ComparisonError>,
);

/// Alignment policy and metric shared by a batch of comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Comparator {
    pub align: bool,
    pub metric: Metric,
}

impl Comparator {
    pub fn new(metric: Metric, align: bool) -> Self {
        Self { align, metric }
    }

    /// Optionally superimposes `structure` onto `target`, then evaluates the metric.
    pub fn compare(
        &self,
        target: &MolecularStructure,
        structure: &MolecularStructure,
    ) -> Result<f64, ComparisonError> {
        if self.align {
            let aligned = align(target, structure)?;
            self.metric.evaluate(target, &aligned)
        } else {
            self.metric.evaluate(target, structure)
        }
    }

    fn row(
        &self,
        target: &MolecularStructure,
        structures: &[MolecularStructure],
        reporter: &ProgressReporter,
    ) -> Result<Vec<f64>, ComparisonError> {
        #[cfg(not(feature = "parallel"))]
        let iterator = structures.iter();

        #[cfg(feature = "parallel")]
        let iterator = structures.par_iter();

        iterator
            .map(|structure| {
                let value = self.compare(target, structure);
                reporter.report(Progress::TaskIncrement);
                value
            })
            .collect()
    }

    /// Compares every structure against one target, preserving input order.
    ///
    /// Stops at the first failing comparison.
    #[instrument(skip_all, name = "one_to_many", fields(metric = %self.metric, count = structures.len()))]
    pub fn one_to_many(
        &self,
        target: &MolecularStructure,
        structures: &[MolecularStructure],
        reporter: &ProgressReporter,
    ) -> Result<Vec<f64>, ComparisonError> {
        reporter.task(structures.len(), || self.row(target, structures, reporter))
    }

    /// One [`one_to_many`](Self::one_to_many) row per target.
    #[instrument(skip_all, name = "many_to_many", fields(metric = %self.metric, targets = targets.len(), count = structures.len()))]
    pub fn many_to_many(
        &self,
        targets: &[MolecularStructure],
        structures: &[MolecularStructure],
        reporter: &ProgressReporter,
    ) -> Result<Vec<Vec<f64>>, ComparisonError> {
        reporter.task(targets.len() * structures.len(), || {
            targets
                .iter()
                .map(|target| self.row(target, structures, reporter))
                .collect()
        })
    }

    /// Compares each unordered pair of `structures` exactly once.
    ///
    /// A failing pair is recorded in [`PairwiseComparison::failures`] and does not stop the
    /// remaining pairs.
    #[instrument(skip_all, name = "all_pairs", fields(metric = %self.metric, count = structures.len()))]
    pub fn all_pairs(
        &self,
        structures: &[MolecularStructure],
        reporter: &ProgressReporter,
    ) -> PairwiseComparison {
        let pairs: Vec<(usize, usize)> = (0..structures.len()).tuple_combinations().collect();
        let (values, failures) = self.evaluate_pairs(&pairs, structures, structures, reporter);
        let result = PairwiseComparison {
            info: structures.iter().map(|s| s.info().clone()).collect(),
            values,
            failures,
        };
        debug!(
            "Computed {} pair values ({} failed).",
            result.values.len(),
            result.failures.len()
        );
        result
    }

    /// Compares every target against every structure of a second set.
    ///
    /// Unlike [`many_to_many`](Self::many_to_many), a failing combination is recorded in
    /// [`CrossComparison::failures`] and does not stop the others.
    #[instrument(skip_all, name = "cross_pairs", fields(metric = %self.metric, targets = targets.len(), count = structures.len()))]
    pub fn cross_pairs(
        &self,
        targets: &[MolecularStructure],
        structures: &[MolecularStructure],
        reporter: &ProgressReporter,
    ) -> CrossComparison {
        let pairs: Vec<(usize, usize)> = (0..targets.len())
            .cartesian_product(0..structures.len())
            .collect();
        let (values, failures) = self.evaluate_pairs(&pairs, targets, structures, reporter);
        debug!(
            "Computed {} cross values ({} failed).",
            values.len(),
            failures.len()
        );
        CrossComparison { values, failures }
    }

    /// Compares `first[i]` with `second[j]` for every listed pair, collecting failures.
    fn evaluate_pairs(
        &self,
        pairs: &[(usize, usize)],
        first: &[MolecularStructure],
        second: &[MolecularStructure],
        reporter: &ProgressReporter,
    ) -> PairOutcomes {
        let outcomes: Vec<((usize, usize), Result<f64, ComparisonError>)> =
            reporter.task(pairs.len(), || {
                #[cfg(not(feature = "parallel"))]
                let iterator = pairs.iter();

                #[cfg(feature = "parallel")]
                let iterator = pairs.par_iter();

                iterator
                    .map(|&(i, j)| {
                        let value = self.compare(&first[i], &second[j]);
                        reporter.report(Progress::TaskIncrement);
                        ((i, j), value)
                    })
                    .collect()
            });

        let mut values = BTreeMap::new();
        let mut failures = BTreeMap::new();
        for ((i, j), outcome) in outcomes {
            match outcome {
                Ok(value) => {
                    values.insert((i, j), value);
                }
                Err(e) => {
                    warn!(
                        "Comparison of '{}' and '{}' failed: {}",
                        first[i].name(),
                        second[j].name(),
                        e
                    );
                    failures.insert((i, j), e);
                }
            }
        }
        (values, failures)
    }
}

/// Evaluates `metric(target, structure)`, superimposing `structure` onto `target` first when
/// `align` is set.
pub fn compare_pair(
    target: &MolecularStructure,
    structure: &MolecularStructure,
    align: bool,
    metric: Metric,
) -> Result<f64, ComparisonError> {
    Comparator::new(metric, align).compare(target, structure)
}

pub fn one_to_many(
    target: &MolecularStructure,
    structures: &[MolecularStructure],
    align: bool,
    metric: Metric,
) -> Result<Vec<f64>, ComparisonError> {
    Comparator::new(metric, align).one_to_many(target, structures, &ProgressReporter::new())
}

pub fn many_to_many(
    targets: &[MolecularStructure],
    structures: &[MolecularStructure],
    align: bool,
    metric: Metric,
) -> Result<Vec<Vec<f64>>, ComparisonError> {
    Comparator::new(metric, align).many_to_many(targets, structures, &ProgressReporter::new())
}

pub fn all_pairs(
    structures: &[MolecularStructure],
    align: bool,
    metric: Metric,
) -> PairwiseComparison {
    Comparator::new(metric, align).all_pairs(structures, &ProgressReporter::new())
}
