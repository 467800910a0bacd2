use super::error::WorkflowError;
use super::read_structures;
use crate::engine::batch::Comparator;
use crate::engine::progress::{Progress, ProgressReporter};
use serde::Serialize;
use std::path::Path;
use tracing::{info, instrument};

/// Metric values of every target against every structure of a second set.
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonTable {
    pub target_names: Vec<String>,
    pub structure_names: Vec<String>,
    /// `values[target][structure]`.
    pub values: Vec<Vec<f64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonRecord<'a> {
    pub target: &'a str,
    pub structure: &'a str,
    pub value: f64,
}

impl ComparisonTable {
    pub fn records(&self) -> Vec<ComparisonRecord<'_>> {
        self.target_names
            .iter()
            .zip(&self.values)
            .flat_map(|(target, row)| {
                self.structure_names
                    .iter()
                    .zip(row)
                    .map(move |(structure, &value)| ComparisonRecord {
                        target,
                        structure,
                        value,
                    })
            })
            .collect()
    }

    /// The closest structure for each target, as `(structure index, value)`.
    pub fn best_matches(&self) -> Vec<Option<(usize, f64)>> {
        self.values
            .iter()
            .map(|row| {
                row.iter()
                    .copied()
                    .enumerate()
                    .min_by(|(_, a), (_, b)| a.total_cmp(b))
            })
            .collect()
    }
}

/// Compares every structure of `targets_path` against every structure of `structures_path`.
#[instrument(skip_all, name = "compare_workflow", fields(metric = %comparator.metric))]
pub fn run(
    targets_path: &Path,
    structures_path: &Path,
    comparator: Comparator,
    reporter: &ProgressReporter,
) -> Result<ComparisonTable, WorkflowError> {
    reporter.report(Progress::PhaseStart { name: "Loading" });
    let targets = read_structures(targets_path)?;
    let structures = read_structures(structures_path)?;
    reporter.report(Progress::PhaseFinish);

    reporter.report(Progress::PhaseStart { name: "Comparing" });
    let values = comparator.many_to_many(&targets, &structures, reporter)?;
    reporter.report(Progress::PhaseFinish);

    info!(
        "Compared {} target(s) against {} structure(s).",
        targets.len(),
        structures.len()
    );
    Ok(ComparisonTable {
        target_names: targets.iter().map(|s| s.name().to_string()).collect(),
        structure_names: structures.iter().map(|s| s.name().to_string()).collect(),
        values,
    })
}
