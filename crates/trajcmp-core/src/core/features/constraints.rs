use super::feature::{Feature, FeatureError};
use crate::core::models::structure::MolecularStructure;
use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

const DEFAULT_ABS_TOLERANCE: f64 = 1e-7;

/// Comparison applied between a measured value and a constraint's reference value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub enum Condition {
    #[serde(rename = "<")]
    LessThan,
    #[serde(rename = ">")]
    GreaterThan,
    #[serde(rename = "<=")]
    LessOrEqual,
    #[serde(rename = ">=")]
    GreaterOrEqual,
    /// Equal within the constraint's absolute tolerance.
    #[serde(rename = "=")]
    Equal,
}

impl FromStr for Condition {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "<" => Ok(Condition::LessThan),
            ">" => Ok(Condition::GreaterThan),
            "<=" => Ok(Condition::LessOrEqual),
            ">=" => Ok(Condition::GreaterOrEqual),
            "=" | "==" => Ok(Condition::Equal),
            _ => Err(()),
        }
    }
}

fn default_tolerance() -> f64 {
    DEFAULT_ABS_TOLERANCE
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Constraint {
    pub condition: Condition,
    pub value: f64,
    #[serde(default = "default_tolerance")]
    pub abs_tolerance: f64,
}

impl Constraint {
    pub fn new(condition: Condition, value: f64) -> Self {
        Self {
            condition,
            value,
            abs_tolerance: DEFAULT_ABS_TOLERANCE,
        }
    }

    pub fn is_satisfied_by(&self, measured: f64) -> bool {
        match self.condition {
            Condition::LessThan => measured < self.value,
            Condition::GreaterThan => measured > self.value,
            Condition::LessOrEqual => measured <= self.value,
            Condition::GreaterOrEqual => measured >= self.value,
            Condition::Equal => (self.value - measured).abs() < self.abs_tolerance,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FeatureConstraint {
    pub label: String,
    pub feature: Feature,
    #[serde(flatten)]
    pub constraint: Constraint,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintOutcome {
    pub label: String,
    pub description: String,
    pub measured: f64,
    pub satisfied: bool,
}

/// A named collection of feature constraints that a valid structure must satisfy.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct ConstraintSet {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub constraints: Vec<FeatureConstraint>,
}

#[derive(Debug, Error)]
pub enum ConstraintLoadError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("TOML parsing error for '{path}': {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },
}

impl ConstraintSet {
    pub fn load(path: &Path) -> Result<Self, ConstraintLoadError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConstraintLoadError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| ConstraintLoadError::Toml {
            path: path.to_string_lossy().to_string(),
            source: e,
        })
    }

    /// Measures every constrained feature on `structure`, in declaration order.
    pub fn evaluate(
        &self,
        structure: &MolecularStructure,
    ) -> Result<Vec<ConstraintOutcome>, FeatureError> {
        self.constraints
            .iter()
            .map(|fc| {
                let measured = fc.feature.value(structure)?;
                Ok(ConstraintOutcome {
                    label: fc.label.clone(),
                    description: fc.feature.describe(structure),
                    measured,
                    satisfied: fc.constraint.is_satisfied_by(measured),
                })
            })
            .collect()
    }

    /// Returns `true` if every constraint holds; stops at the first violation.
    pub fn is_satisfied_by(&self, structure: &MolecularStructure) -> Result<bool, FeatureError> {
        for fc in &self.constraints {
            if !fc.constraint.is_satisfied_by(fc.feature.value(structure)?) {
                return Ok(false);
            }
        }
        Ok(true)
    }
}
