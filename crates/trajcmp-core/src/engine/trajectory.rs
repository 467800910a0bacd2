use super::batch::Comparator;
use super::error::{AnalyzerError, ComparisonError};
use super::metrics::MetricSpec;
use super::progress::{Progress, ProgressReporter};
use crate::core::models::structure::MolecularStructure;
use crate::core::models::trajectory::Trajectory;
use serde::Serialize;
use tracing::{info, instrument, warn};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Every derived series computed for one metric.
///
/// Matrices are indexed `[step][trajectory]`; per-trajectory series are indexed
/// `[trajectory][step]`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TrajectoryMetrics {
    /// Step `i` of each trajectory against base step `i`.
    pub to_base: Vec<Vec<f64>>,
    /// Smallest `to_base` value over steps `i..M` of each trajectory.
    pub to_base_future: Vec<Vec<f64>>,
    /// Step `i` of each trajectory against the final base step.
    pub to_base_last_step: Vec<Vec<f64>>,
    pub base_to_first: Vec<f64>,
    pub trajectories_to_first: Vec<Vec<f64>>,
    pub base_to_last: Vec<f64>,
    pub trajectories_to_last: Vec<Vec<f64>>,
    /// Step `i` against step `i + 1`; one entry shorter than the trajectory.
    pub base_incremental: Vec<f64>,
    pub trajectories_incremental: Vec<Vec<f64>>,
}

/// One value of one series, flattened for tabular output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesRecord {
    pub metric: String,
    pub series: &'static str,
    pub trajectory: String,
    pub step: usize,
    pub value: f64,
}

impl TrajectoryMetrics {
    /// Flattens every series into records, naming trajectories by `base` and `names`.
    pub fn records(&self, label: &str, base: &str, names: &[&str]) -> Vec<SeriesRecord> {
        let mut records = Vec::new();
        let mut push = |series: &'static str, trajectory: &str, step: usize, value: f64| {
            records.push(SeriesRecord {
                metric: label.to_string(),
                series,
                trajectory: trajectory.to_string(),
                step,
                value,
            });
        };

        for (series, matrix) in [
            ("to_base", &self.to_base),
            ("to_base_future", &self.to_base_future),
            ("to_base_last_step", &self.to_base_last_step),
        ] {
            for (step, row) in matrix.iter().enumerate() {
                for (name, &value) in names.iter().zip(row) {
                    push(series, name, step, value);
                }
            }
        }

        for (series, base_values, per_trajectory) in [
            ("to_first", &self.base_to_first, &self.trajectories_to_first),
            ("to_last", &self.base_to_last, &self.trajectories_to_last),
            (
                "incremental",
                &self.base_incremental,
                &self.trajectories_incremental,
            ),
        ] {
            for (step, &value) in base_values.iter().enumerate() {
                push(series, base, step, value);
            }
            for (name, values) in names.iter().zip(per_trajectory) {
                for (step, &value) in values.iter().enumerate() {
                    push(series, name, step, value);
                }
            }
        }
        records
    }
}

/// Compares N trajectories against a base trajectory of the same length.
///
/// All series for all metrics are computed once at construction; afterwards the analyzer
/// is read-only. A metric whose evaluation fails is stored as an error without affecting
/// the other metrics.
#[derive(Debug, Clone)]
pub struct TrajectoryAnalyzer {
    description: String,
    base: Trajectory,
    trajectories: Vec<Trajectory>,
    results: Vec<(MetricSpec, Result<TrajectoryMetrics, ComparisonError>)>,
}

impl TrajectoryAnalyzer {
    pub fn new(
        description: impl Into<String>,
        base: Trajectory,
        trajectories: Vec<Trajectory>,
        metrics: Vec<MetricSpec>,
    ) -> Result<Self, AnalyzerError> {
        Self::with_progress(
            description,
            base,
            trajectories,
            metrics,
            &ProgressReporter::new(),
        )
    }

    /// Validates the inputs and evaluates every metric.
    ///
    /// # Errors
    ///
    /// Fails if the base trajectory is empty, a trajectory's step count differs from the
    /// base's, or no metric is requested.
    #[instrument(skip_all, name = "trajectory_analyzer", fields(base = %base.name, trajectories = trajectories.len()))]
    pub fn with_progress(
        description: impl Into<String>,
        base: Trajectory,
        trajectories: Vec<Trajectory>,
        metrics: Vec<MetricSpec>,
        reporter: &ProgressReporter,
    ) -> Result<Self, AnalyzerError> {
        if base.is_empty() {
            return Err(AnalyzerError::EmptyTrajectory(base.name.clone()));
        }
        if let Some(bad) = trajectories.iter().find(|t| t.len() != base.len()) {
            return Err(AnalyzerError::TrajectoryLengthMismatch {
                name: bad.name.clone(),
                expected: base.len(),
                found: bad.len(),
            });
        }
        if metrics.is_empty() {
            return Err(AnalyzerError::NoMetrics);
        }

        info!(
            "Analyzing {} trajectories of {} steps with {} metric(s).",
            trajectories.len(),
            base.len(),
            metrics.len()
        );

        let mut analyzer = Self {
            description: description.into(),
            base,
            trajectories,
            results: Vec::with_capacity(metrics.len()),
        };
        for spec in metrics {
            reporter.report(Progress::Message(format!("Evaluating '{}'", spec.label)));
            let result = analyzer.evaluate(Comparator::new(spec.metric, true), reporter);
            if let Err(e) = &result {
                warn!("Metric '{}' failed: {}", spec.label, e);
            }
            analyzer.results.push((spec, result));
        }
        Ok(analyzer)
    }

    fn evaluate(
        &self,
        comparator: Comparator,
        reporter: &ProgressReporter,
    ) -> Result<TrajectoryMetrics, ComparisonError> {
        let steps = self.num_steps();
        let n = self.trajectories.len();

        reporter.report(Progress::PhaseStart { name: "to_base" });
        let to_base = reporter.task(steps * n, || {
            self.per_step(steps, |i| {
                let base_step = &self.base.structures[i];
                self.trajectories
                    .iter()
                    .map(|t| {
                        let value = comparator.compare(base_step, &t.structures[i]);
                        reporter.report(Progress::TaskIncrement);
                        value
                    })
                    .collect()
            })
        })?;
        let to_base_future = suffix_minimum(&to_base);
        reporter.report(Progress::PhaseFinish);

        reporter.report(Progress::PhaseStart {
            name: "to_base_last_step",
        });
        let base_last = &self.base.structures[steps - 1];
        let to_base_last_step = reporter.task(steps * n, || {
            self.per_step(steps, |i| {
                self.trajectories
                    .iter()
                    .map(|t| {
                        let value = comparator.compare(base_last, &t.structures[i]);
                        reporter.report(Progress::TaskIncrement);
                        value
                    })
                    .collect()
            })
        })?;
        reporter.report(Progress::PhaseFinish);

        reporter.report(Progress::PhaseStart {
            name: "self_convergence",
        });
        let per_trajectory = 2 * steps + steps.saturating_sub(1);
        let series = reporter.task(per_trajectory * (n + 1), || {
            std::iter::once(&self.base)
                .chain(&self.trajectories)
                .map(|t| -> Result<_, ComparisonError> {
                    Ok((
                        self.against_fixed(comparator, t, 0, reporter)?,
                        self.against_fixed(comparator, t, steps - 1, reporter)?,
                        incremental(comparator, &t.structures, reporter)?,
                    ))
                })
                .collect::<Result<Vec<_>, ComparisonError>>()
        })?;
        let mut series = series.into_iter();
        let (base_to_first, base_to_last, base_incremental) =
            series.next().unwrap_or_default();
        let mut trajectories_to_first = Vec::with_capacity(n);
        let mut trajectories_to_last = Vec::with_capacity(n);
        let mut trajectories_incremental = Vec::with_capacity(n);
        for (to_first, to_last, steps_apart) in series {
            trajectories_to_first.push(to_first);
            trajectories_to_last.push(to_last);
            trajectories_incremental.push(steps_apart);
        }
        reporter.report(Progress::PhaseFinish);

        Ok(TrajectoryMetrics {
            to_base,
            to_base_future,
            to_base_last_step,
            base_to_first,
            trajectories_to_first,
            base_to_last,
            trajectories_to_last,
            base_incremental,
            trajectories_incremental,
        })
    }

    fn per_step<F>(&self, steps: usize, row: F) -> Result<Vec<Vec<f64>>, ComparisonError>
    where
        F: Fn(usize) -> Result<Vec<f64>, ComparisonError> + Sync + Send,
    {
        #[cfg(not(feature = "parallel"))]
        let iterator = 0..steps;

        #[cfg(feature = "parallel")]
        let iterator = (0..steps).into_par_iter();

        iterator.map(row).collect()
    }

    /// Every step of `trajectory` compared against its own step `step`.
    fn against_fixed(
        &self,
        comparator: Comparator,
        trajectory: &Trajectory,
        step: usize,
        reporter: &ProgressReporter,
    ) -> Result<Vec<f64>, ComparisonError> {
        let fixed = &trajectory.structures[step];

        #[cfg(not(feature = "parallel"))]
        let iterator = trajectory.structures.iter();

        #[cfg(feature = "parallel")]
        let iterator = trajectory.structures.par_iter();

        iterator
            .map(|structure| {
                let value = comparator.compare(fixed, structure);
                reporter.report(Progress::TaskIncrement);
                value
            })
            .collect()
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn base(&self) -> &Trajectory {
        &self.base
    }

    pub fn trajectories(&self) -> &[Trajectory] {
        &self.trajectories
    }

    /// Number of compared trajectories, excluding the base.
    pub fn len(&self) -> usize {
        self.trajectories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trajectories.is_empty()
    }

    pub fn num_steps(&self) -> usize {
        self.base.len()
    }

    /// Results in the order the metrics were requested.
    pub fn results(&self) -> &[(MetricSpec, Result<TrajectoryMetrics, ComparisonError>)] {
        &self.results
    }

    /// Looks up the series of the metric published under `label`.
    pub fn metrics(&self, label: &str) -> Option<&Result<TrajectoryMetrics, ComparisonError>> {
        self.results
            .iter()
            .find(|(spec, _)| spec.label == label)
            .map(|(_, result)| result)
    }

    /// Flattens every successfully computed series into records.
    pub fn records(&self) -> Vec<SeriesRecord> {
        let names: Vec<&str> = self.trajectories.iter().map(|t| t.name.as_str()).collect();
        self.results
            .iter()
            .filter_map(|(spec, result)| result.as_ref().ok().map(|m| (spec, m)))
            .flat_map(|(spec, m)| m.records(&spec.label, &self.base.name, &names))
            .collect()
    }
}

fn incremental(
    comparator: Comparator,
    structures: &[MolecularStructure],
    reporter: &ProgressReporter,
) -> Result<Vec<f64>, ComparisonError> {
    structures
        .windows(2)
        .map(|pair| {
            let value = comparator.compare(&pair[0], &pair[1]);
            reporter.report(Progress::TaskIncrement);
            value
        })
        .collect()
}

/// `out[i][n] = min(matrix[i..][n])`.
fn suffix_minimum(matrix: &[Vec<f64>]) -> Vec<Vec<f64>> {
    let mut out = matrix.to_vec();
    for i in (0..out.len().saturating_sub(1)).rev() {
        let (head, tail) = out.split_at_mut(i + 1);
        for (current, later) in head[i].iter_mut().zip(&tail[0]) {
            *current = current.min(*later);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::batch::compare_pair;
    use crate::engine::metrics::Metric;

    fn step(offset: f64) -> MolecularStructure {
        MolecularStructure::from_coords(
            vec![6, 8, 1, 1],
            &[
                [0.0, 0.0, 0.0],
                [1.2 + offset, 0.0, 0.0],
                [-0.5, 0.9 - offset, 0.0],
                [-0.5, -0.9, 0.3 * offset],
            ],
        )
        .unwrap()
    }

    fn trajectory(name: &str, offsets: &[f64]) -> Trajectory {
        Trajectory::new(name, offsets.iter().map(|&o| step(o)).collect())
    }

    fn analyzer(metrics: Vec<MetricSpec>) -> TrajectoryAnalyzer {
        TrajectoryAnalyzer::new(
            "test run",
            trajectory("base", &[0.4, 0.2, 0.1, 0.0]),
            vec![
                trajectory("fast", &[0.4, 0.1, 0.0, 0.0]),
                trajectory("slow", &[0.5, 0.45, 0.3, 0.25]),
            ],
            metrics,
        )
        .unwrap()
    }

    fn rmsd() -> MetricSpec {
        MetricSpec::labeled(Metric::PositionsRmsd, "rmsd")
    }

    #[test]
    fn series_have_expected_shapes() {
        let a = analyzer(vec![rmsd()]);
        let m = a.metrics("rmsd").unwrap().as_ref().unwrap();

        assert_eq!(a.num_steps(), 4);
        assert_eq!(a.len(), 2);
        for matrix in [&m.to_base, &m.to_base_future, &m.to_base_last_step] {
            assert_eq!(matrix.len(), 4);
            assert!(matrix.iter().all(|row| row.len() == 2));
        }
        assert_eq!(m.base_to_first.len(), 4);
        assert_eq!(m.base_to_last.len(), 4);
        assert_eq!(m.base_incremental.len(), 3);
        assert_eq!(m.trajectories_to_first.len(), 2);
        assert!(m.trajectories_incremental.iter().all(|s| s.len() == 3));
    }

    #[test]
    fn to_base_compares_matching_steps() {
        let a = analyzer(vec![rmsd()]);
        let m = a.metrics("rmsd").unwrap().as_ref().unwrap();

        let expected = compare_pair(&step(0.2), &step(0.45), true, Metric::PositionsRmsd).unwrap();
        assert!((m.to_base[1][1] - expected).abs() < 1e-12);
        assert!(m.to_base[0][0] < 1e-9);
    }

    #[test]
    fn to_base_future_is_forward_minimum_of_to_base() {
        let a = analyzer(vec![rmsd()]);
        let m = a.metrics("rmsd").unwrap().as_ref().unwrap();

        for i in 0..4 {
            for n in 0..2 {
                let expected = (i..4)
                    .map(|s| m.to_base[s][n])
                    .fold(f64::INFINITY, f64::min);
                assert_eq!(m.to_base_future[i][n], expected);
            }
        }
        assert_eq!(m.to_base_future[3], m.to_base[3]);
    }

    #[test]
    fn self_convergence_series_start_and_end_at_zero() {
        let a = analyzer(vec![rmsd()]);
        let m = a.metrics("rmsd").unwrap().as_ref().unwrap();

        assert!(m.base_to_first[0] < 1e-9);
        assert!(m.base_to_last[3] < 1e-9);
        assert!(m.trajectories_to_first[1][0] < 1e-9);
        assert!(m.trajectories_to_last[0][3] < 1e-9);
        // "fast" does not move over its last step.
        assert!(m.trajectories_incremental[0][2] < 1e-9);
        assert!(m.to_base_last_step[2][0] < 1e-9);
    }

    #[test]
    fn mismatched_step_counts_fail_at_construction() {
        let result = TrajectoryAnalyzer::new(
            "bad",
            trajectory("base", &[0.0, 0.1, 0.2]),
            vec![trajectory("short", &[0.0, 0.1])],
            vec![rmsd()],
        );
        assert!(matches!(
            result,
            Err(AnalyzerError::TrajectoryLengthMismatch { ref name, expected: 3, found: 2 }) if name == "short"
        ));
    }

    #[test]
    fn empty_base_or_metrics_are_rejected() {
        let empty = TrajectoryAnalyzer::new("x", Trajectory::new("base", vec![]), vec![], vec![rmsd()]);
        assert!(matches!(empty, Err(AnalyzerError::EmptyTrajectory(_))));

        let none = TrajectoryAnalyzer::new("x", trajectory("base", &[0.0]), vec![], vec![]);
        assert!(matches!(none, Err(AnalyzerError::NoMetrics)));
    }

    #[test]
    fn per_metric_failures_are_recorded() {
        let mut broken = trajectory("broken", &[0.0, 0.1]);
        broken.structures[1] = MolecularStructure::from_coords(vec![6], &[[0.0; 3]]).unwrap();

        let a = TrajectoryAnalyzer::new(
            "mixed",
            trajectory("base", &[0.0, 0.1]),
            vec![broken],
            vec![rmsd(), MetricSpec::new(Metric::DistancesMad)],
        )
        .unwrap();

        assert_eq!(a.results().len(), 2);
        assert!(matches!(
            a.metrics("rmsd"),
            Some(Err(ComparisonError::ShapeMismatch { .. }))
        ));
        assert!(a.metrics("distances-mad").unwrap().is_err());
        assert!(a.metrics("missing").is_none());
    }

    #[test]
    fn sibling_metrics_are_independent_when_one_succeeds() {
        let a = analyzer(vec![rmsd(), MetricSpec::new(Metric::DistancesRmsd)]);
        assert!(a.results().iter().all(|(_, r)| r.is_ok()));
        assert_eq!(a.results()[0].0.label, "rmsd");
        assert_eq!(a.results()[1].0.label, "distances-rmsd");
    }

    #[test]
    fn each_phase_reports_one_task_sized_to_its_comparisons() {
        let events = std::sync::Mutex::new(Vec::new());
        let reporter = ProgressReporter::with_callback(Box::new(|event| {
            events.lock().unwrap().push(event);
        }));
        TrajectoryAnalyzer::with_progress(
            "progress",
            trajectory("base", &[0.4, 0.2, 0.1, 0.0]),
            vec![
                trajectory("fast", &[0.4, 0.1, 0.0, 0.0]),
                trajectory("slow", &[0.5, 0.45, 0.3, 0.25]),
            ],
            vec![rmsd()],
            &reporter,
        )
        .unwrap();
        drop(reporter);

        let mut tasks = Vec::new();
        let mut open: Option<(u64, u64)> = None;
        for event in events.into_inner().unwrap() {
            match event {
                Progress::TaskStart { total_steps } => {
                    assert!(open.is_none(), "tasks must not nest");
                    open = Some((total_steps, 0));
                }
                Progress::TaskIncrement => {
                    if let Some((_, done)) = open.as_mut() {
                        *done += 1;
                    }
                }
                Progress::TaskFinish => tasks.extend(open.take()),
                _ => {}
            }
        }

        // 4 steps x 2 trajectories twice, then (4 + 4 + 3) x (base + 2 trajectories).
        assert_eq!(tasks, vec![(8, 8), (8, 8), (33, 33)]);
    }

    #[test]
    fn single_step_trajectories_have_empty_incremental_series() {
        let a = TrajectoryAnalyzer::new(
            "one",
            trajectory("base", &[0.0]),
            vec![trajectory("other", &[0.1])],
            vec![rmsd()],
        )
        .unwrap();
        let m = a.metrics("rmsd").unwrap().as_ref().unwrap();
        assert!(m.base_incremental.is_empty());
        assert!(m.trajectories_incremental[0].is_empty());
    }

    #[test]
    fn records_flatten_every_series() {
        let a = analyzer(vec![rmsd()]);
        let records = a.records();

        // 3 matrices of 4x2, then (base + 2 trajectories) x (4 + 4 + 3).
        assert_eq!(records.len(), 3 * 8 + 3 * 11);
        assert!(records.iter().all(|r| r.metric == "rmsd"));
        let first = &records[0];
        assert_eq!((first.series, first.trajectory.as_str(), first.step), ("to_base", "fast", 0));
        assert!(records
            .iter()
            .any(|r| r.series == "incremental" && r.trajectory == "base" && r.step == 2));
    }
}
