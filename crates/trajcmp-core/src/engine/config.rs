use super::metrics::{Metric, MetricSpec};
use crate::core::models::trajectory::{StepSelection, TrajectorySource};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Invalid value for parameter '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    pub description: String,
    pub base: TrajectorySource,
    pub comparisons: Vec<TrajectorySource>,
    pub metrics: Vec<MetricSpec>,
}

/// Builds an [`AnalysisConfig`].
///
/// `steps` resamples every trajectory to that many linearly spaced steps, replacing the
/// selection of each source.
#[derive(Default)]
pub struct AnalysisConfigBuilder {
    description: Option<String>,
    base: Option<TrajectorySource>,
    comparisons: Vec<TrajectorySource>,
    metrics: Vec<MetricSpec>,
    steps: Option<usize>,
}

impl AnalysisConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
    pub fn base(mut self, source: TrajectorySource) -> Self {
        self.base = Some(source);
        self
    }
    pub fn comparison(mut self, source: TrajectorySource) -> Self {
        self.comparisons.push(source);
        self
    }
    pub fn comparisons(mut self, sources: impl IntoIterator<Item = TrajectorySource>) -> Self {
        self.comparisons.extend(sources);
        self
    }
    pub fn metric(mut self, spec: impl Into<MetricSpec>) -> Self {
        self.metrics.push(spec.into());
        self
    }
    pub fn metrics(mut self, specs: impl IntoIterator<Item = MetricSpec>) -> Self {
        self.metrics.extend(specs);
        self
    }
    pub fn steps(mut self, steps: usize) -> Self {
        self.steps = Some(steps);
        self
    }

    pub fn build(self) -> Result<AnalysisConfig, ConfigError> {
        let mut base = self.base.ok_or(ConfigError::MissingParameter("base"))?;
        if self.metrics.is_empty() {
            return Err(ConfigError::MissingParameter("metrics"));
        }
        let mut comparisons = self.comparisons;
        if let Some(steps) = self.steps {
            if steps == 0 {
                return Err(ConfigError::InvalidParameter {
                    name: "steps",
                    reason: "must be at least 1".to_string(),
                });
            }
            for source in std::iter::once(&mut base).chain(comparisons.iter_mut()) {
                source.selection = StepSelection::Count(steps);
            }
        }
        Ok(AnalysisConfig {
            description: self.description.unwrap_or_else(|| base.name.clone()),
            base,
            comparisons,
            metrics: self.metrics,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DuplicateSearchConfig {
    /// File whose structures are searched.
    pub targets: PathBuf,
    /// Second file to compare against; `None` searches `targets` against itself.
    pub structures: Option<PathBuf>,
    pub threshold: f64,
    pub metric: Metric,
    pub align: bool,
}

#[derive(Default)]
pub struct DuplicateSearchConfigBuilder {
    targets: Option<PathBuf>,
    structures: Option<PathBuf>,
    threshold: Option<f64>,
    metric: Option<Metric>,
    align: Option<bool>,
}

impl DuplicateSearchConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn targets(mut self, path: PathBuf) -> Self {
        self.targets = Some(path);
        self
    }
    pub fn structures(mut self, path: PathBuf) -> Self {
        self.structures = Some(path);
        self
    }
    pub fn threshold(mut self, threshold: f64) -> Self {
        self.threshold = Some(threshold);
        self
    }
    pub fn metric(mut self, metric: Metric) -> Self {
        self.metric = Some(metric);
        self
    }
    pub fn align(mut self, align: bool) -> Self {
        self.align = Some(align);
        self
    }

    pub fn build(self) -> Result<DuplicateSearchConfig, ConfigError> {
        let threshold = self
            .threshold
            .ok_or(ConfigError::MissingParameter("threshold"))?;
        if !threshold.is_finite() || threshold < 0.0 {
            return Err(ConfigError::InvalidParameter {
                name: "threshold",
                reason: format!("{} is not a non-negative number", threshold),
            });
        }
        Ok(DuplicateSearchConfig {
            targets: self
                .targets
                .ok_or(ConfigError::MissingParameter("targets"))?,
            structures: self.structures,
            threshold,
            metric: self.metric.unwrap_or(Metric::PositionsRmsd),
            align: self.align.unwrap_or(true),
        })
    }
}
