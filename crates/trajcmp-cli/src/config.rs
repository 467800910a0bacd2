use crate::cli::TrajectoryArgs;
use crate::error::{CliError, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::debug;
use trajcmp::core::models::trajectory::TrajectorySource;
use trajcmp::engine::config::{AnalysisConfig, AnalysisConfigBuilder};
use trajcmp::engine::metrics::MetricSpec;

/// Trajectory analysis settings as written in a TOML file.
///
/// ```toml
/// description = "relaxation from the crystal geometry"
/// metrics = ["positions-rmsd", "pairs=distances-mad"]
/// steps = 20
///
/// [base]
/// path = "reference.xyz"
/// name = "reference"
///
/// [[comparisons]]
/// path = "run_a.xyz"
/// name = "run_a"
/// selection = { indices = [0, 5, 10] }
/// ```
#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct PartialAnalysisConfig {
    description: Option<String>,
    base: Option<TrajectorySource>,
    #[serde(default)]
    comparisons: Vec<TrajectorySource>,
    #[serde(default)]
    metrics: Vec<String>,
    steps: Option<usize>,
}

impl PartialAnalysisConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })?;
        config.resolve_paths(path.parent().unwrap_or_else(|| Path::new("")));
        Ok(config)
    }

    /// Relative trajectory paths are taken relative to the directory of the config file.
    fn resolve_paths(&mut self, root: &Path) {
        for source in self.base.iter_mut().chain(self.comparisons.iter_mut()) {
            if source.path.is_relative() {
                source.path = root.join(&source.path);
            }
        }
    }

    pub fn merge_with_cli(mut self, args: &TrajectoryArgs) -> Result<AnalysisConfig> {
        self.apply_set_values(&args.set_values)?;

        let metrics = if args.metrics.is_empty() {
            self.metrics
                .iter()
                .map(|m| {
                    m.parse::<MetricSpec>()
                        .map_err(|e| CliError::Config(e.to_string()))
                })
                .collect::<Result<Vec<_>>>()?
        } else {
            args.metrics.clone()
        };

        let mut builder = AnalysisConfigBuilder::new()
            .comparisons(self.comparisons)
            .metrics(metrics);
        if let Some(base) = self.base {
            builder = builder.base(base);
        }
        if let Some(description) = self.description {
            builder = builder.description(description);
        }
        if let Some(steps) = args.steps.or(self.steps) {
            builder = builder.steps(steps);
        }

        Ok(builder.build()?)
    }

    fn apply_set_values(&mut self, set_values: &[String]) -> Result<()> {
        for kv_pair in set_values {
            let Some((key, value_str)) = kv_pair.split_once('=') else {
                return Err(CliError::Config(format!(
                    "Invalid --set format: '{}'. Expected KEY=VALUE.",
                    kv_pair
                )));
            };

            match key {
                "description" => self.description = Some(value_str.to_string()),
                "steps" => {
                    self.steps = Some(value_str.parse().map_err(|_| {
                        CliError::Config(format!(
                            "Invalid integer value for {}: {}",
                            key, value_str
                        ))
                    })?);
                }
                "base.name" => {
                    self.base
                        .as_mut()
                        .ok_or_else(|| {
                            CliError::Config("Cannot set 'base.name' without a [base] table".into())
                        })?
                        .name = value_str.to_string();
                }
                _ => {
                    return Err(CliError::Config(format!(
                        "Unsupported configuration key for --set: '{}'",
                        key
                    )));
                }
            }
        }
        Ok(())
    }
}
