use crate::core::io::xyz::XyzError;
use thiserror::Error;

/// Failure of a single structure-to-structure comparison.
#[derive(Debug, Error, PartialEq, Clone)]
pub enum ComparisonError {
    #[error("Atom count mismatch: expected {expected} atoms, found {found}")]
    ShapeMismatch { expected: usize, found: usize },

    #[error("Cannot compare structures without atoms")]
    EmptyStructure,

    #[error("Superposition failed: {0}")]
    Alignment(String),
}

#[derive(Debug, Error)]
pub enum AnalyzerError {
    #[error("Base trajectory '{0}' has no steps")]
    EmptyTrajectory(String),

    #[error("Trajectory '{name}' has {found} steps but the base trajectory has {expected}")]
    TrajectoryLengthMismatch {
        name: String,
        expected: usize,
        found: usize,
    },

    #[error("At least one metric must be requested")]
    NoMetrics,

    #[error("Failed to load trajectory '{name}': {source}")]
    Load {
        name: String,
        #[source]
        source: XyzError,
    },
}
