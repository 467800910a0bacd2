use crate::core::features::feature::FeatureError;
use crate::core::io::xyz::XyzError;
use crate::engine::error::{AnalyzerError, ComparisonError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("Failed to read or write '{path}': {source}")]
    Xyz {
        path: String,
        #[source]
        source: XyzError,
    },

    #[error("No structures found in '{0}'")]
    EmptyInput(String),

    #[error("Structure index {index} is out of range for '{path}' ({len} structures)")]
    IndexOutOfRange {
        path: String,
        index: usize,
        len: usize,
    },

    #[error(transparent)]
    Analyzer(#[from] AnalyzerError),

    #[error("Comparison failed: {0}")]
    Comparison(#[from] ComparisonError),

    #[error("Feature measurement failed: {0}")]
    Feature(#[from] FeatureError),
}
