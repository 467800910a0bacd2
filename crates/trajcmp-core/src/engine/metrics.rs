use super::error::ComparisonError;
use crate::core::models::structure::MolecularStructure;
use crate::core::utils::geometry;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Scalar distance between two structures with identical atom ordering.
///
/// Position-based metrics depend on the relative placement of the two structures and are
/// normally evaluated after [`align`](super::align::align). Distance-based metrics compare the
/// full inter-atomic distance matrices (diagonal included) and are invariant to rigid motion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Metric {
    /// `sqrt(mean_i |a_i - b_i|^2)`
    PositionsRmsd,
    /// `sqrt(mean_ij (Da_ij - Db_ij)^2)`
    DistancesRmsd,
    /// `mean_i |a_i - b_i|`
    PositionsMad,
    /// `mean_ij |Da_ij - Db_ij|`
    DistancesMad,
}

#[derive(Debug, Error, PartialEq, Eq, Clone)]
#[error("Unknown metric '{0}' (expected one of: positions-rmsd, distances-rmsd, positions-mad, distances-mad)")]
pub struct ParseMetricError(pub String);

impl Metric {
    pub const ALL: [Metric; 4] = [
        Metric::PositionsRmsd,
        Metric::DistancesRmsd,
        Metric::PositionsMad,
        Metric::DistancesMad,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Metric::PositionsRmsd => "positions-rmsd",
            Metric::DistancesRmsd => "distances-rmsd",
            Metric::PositionsMad => "positions-mad",
            Metric::DistancesMad => "distances-mad",
        }
    }

    pub fn is_distance_based(&self) -> bool {
        matches!(self, Metric::DistancesRmsd | Metric::DistancesMad)
    }

    /// Evaluates the metric between `a` and `b`.
    ///
    /// # Errors
    ///
    /// Returns [`ComparisonError::ShapeMismatch`] if the structures differ in atom count and
    /// [`ComparisonError::EmptyStructure`] if they have no atoms.
    pub fn evaluate(
        &self,
        a: &MolecularStructure,
        b: &MolecularStructure,
    ) -> Result<f64, ComparisonError> {
        check_shapes(a, b)?;
        let value = match self {
            Metric::PositionsRmsd => {
                geometry::calculate_rmsd(a.positions(), b.positions()).unwrap_or_default()
            }
            Metric::PositionsMad => positions_mad(a, b),
            Metric::DistancesRmsd => distance_difference_mean(a, b, |d| d * d).sqrt(),
            Metric::DistancesMad => distance_difference_mean(a, b, f64::abs),
        };
        Ok(value)
    }
}

pub(crate) fn check_shapes(
    a: &MolecularStructure,
    b: &MolecularStructure,
) -> Result<(), ComparisonError> {
    if a.len() != b.len() {
        return Err(ComparisonError::ShapeMismatch {
            expected: a.len(),
            found: b.len(),
        });
    }
    if a.is_empty() {
        return Err(ComparisonError::EmptyStructure);
    }
    Ok(())
}

fn positions_mad(a: &MolecularStructure, b: &MolecularStructure) -> f64 {
    let sum: f64 = a
        .positions()
        .iter()
        .zip(b.positions())
        .map(|(p, q)| (p - q).norm())
        .sum();
    sum / a.len() as f64
}

/// Mean of `f(Da_ij - Db_ij)` over the full N x N matrix. The diagonal contributes zero and
/// each off-diagonal pair appears twice.
fn distance_difference_mean(
    a: &MolecularStructure,
    b: &MolecularStructure,
    f: impl Fn(f64) -> f64,
) -> f64 {
    let pa = a.positions();
    let pb = b.positions();
    let n = pa.len();
    let mut sum = 0.0;
    for i in 0..n {
        for j in (i + 1)..n {
            let da = (pa[i] - pa[j]).norm();
            let db = (pb[i] - pb[j]).norm();
            sum += f(da - db);
        }
    }
    2.0 * sum / (n * n) as f64
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Metric {
    type Err = ParseMetricError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        Metric::ALL
            .into_iter()
            .find(|m| m.name() == normalized)
            .ok_or_else(|| ParseMetricError(s.to_string()))
    }
}

/// A metric together with the label its results are published under.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MetricSpec {
    pub metric: Metric,
    pub label: String,
}

impl MetricSpec {
    /// Labels the metric with its own name.
    pub fn new(metric: Metric) -> Self {
        Self {
            metric,
            label: metric.name().to_string(),
        }
    }

    pub fn labeled(metric: Metric, label: impl Into<String>) -> Self {
        Self {
            metric,
            label: label.into(),
        }
    }
}

impl From<Metric> for MetricSpec {
    fn from(metric: Metric) -> Self {
        Self::new(metric)
    }
}

/// Parses `metric` or `label=metric`.
impl FromStr for MetricSpec {
    type Err = ParseMetricError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('=') {
            Some((label, metric)) if !label.trim().is_empty() => {
                Ok(Self::labeled(metric.parse()?, label.trim()))
            }
            _ => Ok(Self::new(s.trim_start_matches('=').parse()?)),
        }
    }
}

impl fmt::Display for MetricSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.label, self.metric)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::utils::geometry::rotation_from_axis_angle;
    use crate::engine::align::align;
    use nalgebra::{Point3, Vector3};

    fn triangle() -> MolecularStructure {
        MolecularStructure::from_coords(
            vec![6, 6, 8],
            &[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
        )
        .unwrap()
    }

    fn shifted(s: &MolecularStructure, dx: f64) -> MolecularStructure {
        let positions = s
            .positions()
            .iter()
            .map(|p| Point3::new(p.x + dx, p.y, p.z))
            .collect();
        s.with_positions(positions).unwrap()
    }

    #[test]
    fn self_distance_is_zero_for_every_metric() {
        let s = triangle();
        for metric in Metric::ALL {
            assert_eq!(metric.evaluate(&s, &s).unwrap(), 0.0, "{metric}");
        }
    }

    #[test]
    fn positional_metrics_measure_a_translation() {
        let a = triangle();
        let b = shifted(&a, 0.5);
        assert!((Metric::PositionsRmsd.evaluate(&a, &b).unwrap() - 0.5).abs() < 1e-12);
        assert!((Metric::PositionsMad.evaluate(&a, &b).unwrap() - 0.5).abs() < 1e-12);
        assert!(Metric::DistancesRmsd.evaluate(&a, &b).unwrap().abs() < 1e-12);
        assert!(Metric::DistancesMad.evaluate(&a, &b).unwrap().abs() < 1e-12);
    }

    #[test]
    fn distance_metrics_average_over_full_matrix() {
        let a = MolecularStructure::from_coords(vec![1, 1], &[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0]])
            .unwrap();
        let b = MolecularStructure::from_coords(vec![1, 1], &[[0.0, 0.0, 0.0], [3.0, 0.0, 0.0]])
            .unwrap();
        // Off-diagonal differences of 2 in two of four cells.
        assert!((Metric::DistancesMad.evaluate(&a, &b).unwrap() - 1.0).abs() < 1e-12);
        assert!((Metric::DistancesRmsd.evaluate(&a, &b).unwrap() - 2.0f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn mismatched_atom_counts_are_rejected() {
        let a = triangle();
        let b = MolecularStructure::from_coords(vec![6], &[[0.0, 0.0, 0.0]]).unwrap();
        for metric in Metric::ALL {
            assert_eq!(
                metric.evaluate(&a, &b),
                Err(ComparisonError::ShapeMismatch {
                    expected: 3,
                    found: 1
                })
            );
        }
    }

    #[test]
    fn empty_structures_are_rejected() {
        let empty = MolecularStructure::from_coords(vec![], &[]).unwrap();
        assert_eq!(
            Metric::PositionsRmsd.evaluate(&empty, &empty),
            Err(ComparisonError::EmptyStructure)
        );
    }

    #[test]
    fn distance_metrics_are_unchanged_by_alignment() {
        let target = triangle();
        let rot = rotation_from_axis_angle(&Vector3::new(0.2, 1.0, 0.4), 50.0);
        let positions = [[0.1, -0.2, 0.3], [1.3, 0.1, -0.1], [-0.2, 1.1, 0.4]]
            .iter()
            .map(|c| rot * Point3::new(c[0], c[1], c[2]) + Vector3::new(2.0, 0.0, -1.0))
            .collect();
        let moving = target.with_positions(positions).unwrap();

        let aligned = align(&target, &moving).unwrap();

        for metric in [Metric::DistancesRmsd, Metric::DistancesMad] {
            let before = metric.evaluate(&moving, &target).unwrap();
            let after = metric.evaluate(&aligned, &target).unwrap();
            assert!((before - after).abs() < 1e-10, "{metric}: {before} vs {after}");
        }
    }

    #[test]
    fn metric_names_round_trip_through_from_str() {
        for metric in Metric::ALL {
            assert_eq!(metric.name().parse::<Metric>(), Ok(metric));
        }
        assert_eq!("POSITIONS_RMSD".parse::<Metric>(), Ok(Metric::PositionsRmsd));
        assert!("rmsd".parse::<Metric>().is_err());
    }

    #[test]
    fn metric_spec_parses_optional_label() {
        let plain: MetricSpec = "distances-mad".parse().unwrap();
        assert_eq!(plain, MetricSpec::new(Metric::DistancesMad));
        assert_eq!(plain.label, "distances-mad");

        let labeled: MetricSpec = "mean_abs_diff=positions-mad".parse().unwrap();
        assert_eq!(labeled.label, "mean_abs_diff");
        assert_eq!(labeled.metric, Metric::PositionsMad);
        assert_eq!(labeled.to_string(), "mean_abs_diff=positions-mad");

        assert!("x=nope".parse::<MetricSpec>().is_err());
    }

    #[test]
    fn metric_deserializes_from_kebab_case() {
        #[derive(Deserialize)]
        struct Wrapper {
            metrics: Vec<MetricSpec>,
        }
        let w: Wrapper = toml::from_str(
            r#"metrics = [{ metric = "positions-rmsd", label = "rmsd" }]"#,
        )
        .unwrap();
        assert_eq!(w.metrics[0], MetricSpec::labeled(Metric::PositionsRmsd, "rmsd"));
    }
}
