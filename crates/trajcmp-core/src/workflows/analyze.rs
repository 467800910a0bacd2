use super::error::WorkflowError;
use crate::core::models::trajectory::{Trajectory, TrajectorySource};
use crate::engine::config::AnalysisConfig;
use crate::engine::error::AnalyzerError;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::trajectory::TrajectoryAnalyzer;
use tracing::{info, instrument};

fn load(source: &TrajectorySource) -> Result<Trajectory, AnalyzerError> {
    let trajectory = source.load().map_err(|e| AnalyzerError::Load {
        name: source.name.clone(),
        source: e,
    })?;
    info!(
        "Loaded '{}' ({} steps) from '{}'.",
        trajectory.name,
        trajectory.len(),
        source.path.display()
    );
    Ok(trajectory)
}

/// Loads the base and comparison trajectories and runs the trajectory analyzer.
#[instrument(skip_all, name = "analyze_workflow")]
pub fn run(
    config: &AnalysisConfig,
    reporter: &ProgressReporter,
) -> Result<TrajectoryAnalyzer, WorkflowError> {
    reporter.report(Progress::PhaseStart { name: "Loading" });
    let base = load(&config.base)?;
    let trajectories = config
        .comparisons
        .iter()
        .map(load)
        .collect::<Result<Vec<_>, _>>()?;
    reporter.report(Progress::PhaseFinish);

    let analyzer = TrajectoryAnalyzer::with_progress(
        config.description.clone(),
        base,
        trajectories,
        config.metrics.clone(),
        reporter,
    )?;

    let failed = analyzer.results().iter().filter(|(_, r)| r.is_err()).count();
    info!(
        "Trajectory analysis '{}' complete: {} metric(s), {} failed.",
        analyzer.description(),
        analyzer.results().len(),
        failed
    );
    Ok(analyzer)
}
