use super::error::WorkflowError;
use super::read_structures;
use crate::engine::batch::Comparator;
use crate::engine::config::DuplicateSearchConfig;
use crate::engine::filter::{NearDuplicate, NearDuplicateFilter};
use crate::engine::progress::{Progress, ProgressReporter};
use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::{info, instrument};

/// A near-duplicate pair with the names of both structures.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DuplicateMatch {
    pub label: &'static str,
    pub first_index: usize,
    pub first_name: String,
    pub second_index: usize,
    pub second_name: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DuplicateReport {
    /// Pairs below the threshold, closest first.
    pub matches: Vec<DuplicateMatch>,
    /// Number of comparisons that produced a value.
    pub compared: usize,
    /// Number of comparisons that failed and were skipped.
    pub failed: usize,
}

fn named(found: Vec<NearDuplicate>, first: &[String], second: &[String]) -> Vec<DuplicateMatch> {
    found
        .into_iter()
        .map(|d| DuplicateMatch {
            label: d.label,
            first_index: d.first,
            first_name: first[d.first].clone(),
            second_index: d.second,
            second_name: second[d.second].clone(),
            value: d.value,
        })
        .collect()
}

/// Whether two paths name the same file, resolving links and relative components when both
/// paths exist.
fn same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

/// Finds structure pairs whose metric value is below the configured threshold.
///
/// Without a second file, every unordered pair of the target file is compared once and
/// failing pairs are skipped. The same holds when the second file is the target file itself.
/// With a distinct second file, every target is compared against every structure of that
/// file and failing combinations are skipped as well.
#[instrument(skip_all, name = "duplicates_workflow")]
pub fn run(
    config: &DuplicateSearchConfig,
    reporter: &ProgressReporter,
) -> Result<DuplicateReport, WorkflowError> {
    let comparator = Comparator::new(config.metric, config.align);
    let filter = NearDuplicateFilter::new(config.threshold);

    reporter.report(Progress::PhaseStart { name: "Loading" });
    let targets = read_structures(&config.targets)?;
    let others = match &config.structures {
        Some(path) if !same_file(path, &config.targets) => Some(read_structures(path)?),
        _ => None,
    };
    reporter.report(Progress::PhaseFinish);

    reporter.report(Progress::PhaseStart { name: "Comparing" });
    let target_names: Vec<String> = targets.iter().map(|s| s.name().to_string()).collect();
    let report = match others {
        None => {
            let pairs = comparator.all_pairs(&targets, reporter);
            DuplicateReport {
                matches: named(filter.from_pairs(&pairs), &target_names, &target_names),
                compared: pairs.values.len(),
                failed: pairs.failures.len(),
            }
        }
        Some(structures) => {
            let cross = comparator.cross_pairs(&targets, &structures, reporter);
            let names: Vec<String> = structures.iter().map(|s| s.name().to_string()).collect();
            let found = filter.select(cross.values.iter().map(|(&k, &v)| (k, v)), false);
            DuplicateReport {
                matches: named(found, &target_names, &names),
                compared: cross.values.len(),
                failed: cross.failures.len(),
            }
        }
    };
    reporter.report(Progress::PhaseFinish);

    info!(
        "Found {} pair(s) below {} ({}) out of {} comparisons.",
        report.matches.len(),
        config.threshold,
        config.metric,
        report.compared
    );
    Ok(report)
}
