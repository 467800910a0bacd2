use super::error::WorkflowError;
use super::read_structures;
use crate::core::io::traits::MolecularFile;
use crate::core::io::xyz::XyzFile;
use crate::core::utils::geometry;
use crate::engine::align::align;
use crate::engine::progress::{Progress, ProgressReporter};
use serde::Serialize;
use std::path::Path;
use tracing::{info, instrument};

/// How far one structure was from the target before and after superposition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlignmentSummary {
    pub name: String,
    pub rmsd_before: f64,
    pub rmsd_after: f64,
    /// Atom that remains furthest from its target position after superposition.
    pub max_deviation_atom: usize,
    pub max_deviation: f64,
}

/// Superimposes every structure of `input` onto structure `target_index` of `target_path`
/// and writes the aligned structures to `output`.
#[instrument(skip_all, name = "align_workflow")]
pub fn run(
    target_path: &Path,
    target_index: usize,
    input: &Path,
    output: &Path,
    reporter: &ProgressReporter,
) -> Result<Vec<AlignmentSummary>, WorkflowError> {
    let targets = read_structures(target_path)?;
    let target = targets
        .get(target_index)
        .ok_or_else(|| WorkflowError::IndexOutOfRange {
            path: target_path.display().to_string(),
            index: target_index,
            len: targets.len(),
        })?;
    let structures = read_structures(input)?;

    reporter.report(Progress::PhaseStart { name: "Aligning" });
    let (aligned, summaries) = reporter.task(structures.len(), || {
        let mut aligned = Vec::with_capacity(structures.len());
        let mut summaries = Vec::with_capacity(structures.len());
        for structure in &structures {
            let moved = align(target, structure)?;
            let rmsd_before = geometry::calculate_rmsd(structure.positions(), target.positions())
                .unwrap_or_default();
            let rmsd_after = geometry::calculate_rmsd(moved.positions(), target.positions())
                .unwrap_or_default();
            let (max_deviation_atom, max_deviation) =
                geometry::find_max_atom_deviation(moved.positions(), target.positions())
                    .unwrap_or_default();
            summaries.push(AlignmentSummary {
                name: structure.name().to_string(),
                rmsd_before,
                rmsd_after,
                max_deviation_atom,
                max_deviation,
            });
            aligned.push(moved);
            reporter.report(Progress::TaskIncrement);
        }
        Ok::<_, WorkflowError>((aligned, summaries))
    })?;
    reporter.report(Progress::PhaseFinish);

    XyzFile::write_to_path(&aligned, output).map_err(|e| WorkflowError::Xyz {
        path: output.display().to_string(),
        source: e,
    })?;
    info!(
        "Aligned {} structure(s) onto '{}' and wrote them to '{}'.",
        aligned.len(),
        target.name(),
        output.display()
    );
    Ok(summaries)
}
