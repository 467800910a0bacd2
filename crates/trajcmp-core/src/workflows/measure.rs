use super::error::WorkflowError;
use super::read_structures;
use crate::core::bonds::ReferenceBonds;
use crate::core::features::constraints::ConstraintSet;
use crate::core::models::element;
use serde::Serialize;
use std::path::Path;
use tracing::{info, instrument, warn};

/// One constrained feature measured on one structure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Measurement {
    pub structure: String,
    pub label: String,
    pub description: String,
    pub value: f64,
    pub satisfied: bool,
}

/// Connectivity of one structure that disagrees with the reference for one element pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BondReport {
    pub structure: String,
    pub elements: String,
    pub broken: String,
    pub formed: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct MeasureReport {
    pub measurements: Vec<Measurement>,
    pub bond_reports: Vec<BondReport>,
    /// Names of structures that satisfy every constraint and match the reference bonds.
    pub valid: Vec<String>,
}

fn format_bonds<'a>(bonds: impl IntoIterator<Item = &'a (usize, usize)>) -> String {
    bonds
        .into_iter()
        .map(|(i, j)| format!("{}-{}", i, j))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Measures every constrained feature on every structure of `input` and, when a reference
/// is given, reports bonds that were broken or formed relative to it.
#[instrument(skip_all, name = "measure_workflow")]
pub fn run(
    input: &Path,
    constraints: &ConstraintSet,
    reference: Option<&ReferenceBonds>,
) -> Result<MeasureReport, WorkflowError> {
    let structures = read_structures(input)?;
    let mut report = MeasureReport::default();

    for structure in &structures {
        let outcomes = constraints.evaluate(structure)?;
        let mut valid = outcomes.iter().all(|o| o.satisfied);
        report
            .measurements
            .extend(outcomes.into_iter().map(|o| Measurement {
                structure: structure.name().to_string(),
                label: o.label,
                description: o.description,
                value: o.measured,
                satisfied: o.satisfied,
            }));

        if let Some(reference) = reference {
            for deviation in reference.deviations(structure) {
                valid = false;
                let (z1, z2) = deviation.elements;
                report.bond_reports.push(BondReport {
                    structure: structure.name().to_string(),
                    elements: format!(
                        "{}-{}",
                        element::symbol(z1).unwrap_or("X"),
                        element::symbol(z2).unwrap_or("X")
                    ),
                    broken: format_bonds(&deviation.broken),
                    formed: format_bonds(&deviation.formed),
                });
            }
        }

        if valid {
            report.valid.push(structure.name().to_string());
        } else {
            warn!("Structure '{}' failed validation.", structure.name());
        }
    }

    info!(
        "{} of {} structure(s) passed validation.",
        report.valid.len(),
        structures.len()
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::features::constraints::{Condition, Constraint, FeatureConstraint};
    use crate::core::features::feature::{Feature, FeatureError};
    use tempfile::tempdir;

    const TWO_GEOMETRIES: &str = "\
3
intact
C 0.0 0.0 0.0
O 1.2 0.0 0.0
H -0.5 0.9 0.0
3
dissociated
C 0.0 0.0 0.0
O 3.0 0.0 0.0
H -0.5 0.9 0.0
";

    fn co_bond_constraint() -> ConstraintSet {
        ConstraintSet {
            label: "carbonyl".into(),
            constraints: vec![FeatureConstraint {
                label: "C=O".into(),
                feature: Feature::Distance([0, 1]),
                constraint: Constraint::new(Condition::LessThan, 1.5),
            }],
        }
    }

    #[test]
    fn reports_measurements_and_validity() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("geoms.xyz");
        std::fs::write(&path, TWO_GEOMETRIES).unwrap();

        let mut reference = ReferenceBonds::new();
        reference.insert(6, 8, [(0, 1)]);

        let report = run(&path, &co_bond_constraint(), Some(&reference)).unwrap();

        assert_eq!(report.measurements.len(), 2);
        assert!((report.measurements[1].value - 3.0).abs() < 1e-12);
        assert!(!report.measurements[1].satisfied);
        assert_eq!(report.valid, vec!["geoms_1"]);
        assert_eq!(report.bond_reports.len(), 1);
        assert_eq!(report.bond_reports[0].structure, "geoms_2");
        assert_eq!(report.bond_reports[0].elements, "C-O");
        assert_eq!(report.bond_reports[0].broken, "0-1");
        assert_eq!(report.bond_reports[0].formed, "");
    }

    #[test]
    fn out_of_range_feature_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("geoms.xyz");
        std::fs::write(&path, TWO_GEOMETRIES).unwrap();
        let constraints = ConstraintSet {
            label: String::new(),
            constraints: vec![FeatureConstraint {
                label: "bad".into(),
                feature: Feature::Angle([0, 1, 7]),
                constraint: Constraint::new(Condition::GreaterThan, 0.0),
            }],
        };

        let err = run(&path, &constraints, None).unwrap_err();

        assert!(matches!(
            err,
            WorkflowError::Feature(FeatureError::AtomIndexOutOfRange { index: 7, len: 3 })
        ));
    }
}
