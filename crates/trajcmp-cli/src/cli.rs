use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use trajcmp::engine::metrics::{Metric, MetricSpec};

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    version,
    about = "trajcmp - geometric similarity of molecular conformers and optimization trajectories.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Set the number of threads for parallel computation.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compare N trajectories step by step against a base trajectory.
    Trajectory(TrajectoryArgs),
    /// Find near-duplicate structures in one file or between two files.
    Duplicates(DuplicatesArgs),
    /// Compute the full metric matrix between the structures of two files.
    Compare(CompareArgs),
    /// Superimpose every structure of a file onto a target structure.
    Align(AlignArgs),
    /// Measure distances, angles and dihedrals and check bonds against a reference.
    Measure(MeasureArgs),
}

/// Arguments for the `trajectory` subcommand.
#[derive(Args, Debug)]
pub struct TrajectoryArgs {
    /// Path to the analysis configuration file in TOML format.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub config: PathBuf,

    /// Path for the CSV file receiving every series value.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,

    /// Resample every trajectory to this many linearly spaced steps.
    #[arg(long, value_name = "INT")]
    pub steps: Option<usize>,

    /// Metric to evaluate, optionally labeled (e.g. 'rmsd=positions-rmsd').
    /// Can be used multiple times and replaces the metrics of the config file.
    #[arg(short, long = "metric", value_name = "[LABEL=]METRIC")]
    pub metrics: Vec<MetricSpec>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S steps=20
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// Options shared by the commands that compare structures pairwise.
#[derive(Args, Debug, Clone, Copy)]
pub struct ComparisonOptions {
    /// Structural metric used for every comparison.
    #[arg(short, long, default_value_t = Metric::PositionsRmsd, value_name = "METRIC")]
    pub metric: Metric,

    /// Compare the structures as given, without superimposing them first.
    #[arg(long)]
    pub no_align: bool,
}

/// Arguments for the `duplicates` subcommand.
#[derive(Args, Debug)]
pub struct DuplicatesArgs {
    /// Multi-structure XYZ file to search.
    #[arg(value_name = "PATH")]
    pub targets: PathBuf,

    /// Second XYZ file; every target is compared against each of its structures.
    #[arg(short, long, value_name = "PATH")]
    pub against: Option<PathBuf>,

    /// Pairs with a metric value strictly below this are reported.
    #[arg(short, long, required = true, value_name = "FLOAT")]
    pub threshold: f64,

    #[command(flatten)]
    pub comparison: ComparisonOptions,

    /// Path for the CSV file receiving the matches. Prints to stdout when omitted.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}

/// Arguments for the `compare` subcommand.
#[derive(Args, Debug)]
pub struct CompareArgs {
    /// XYZ file holding the target structures (matrix rows).
    #[arg(value_name = "TARGETS")]
    pub targets: PathBuf,

    /// XYZ file holding the structures compared to every target (matrix columns).
    #[arg(value_name = "STRUCTURES")]
    pub structures: PathBuf,

    #[command(flatten)]
    pub comparison: ComparisonOptions,

    /// Path for the CSV file receiving one row per pair. Prints to stdout when omitted.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}

/// Arguments for the `align` subcommand.
#[derive(Args, Debug)]
pub struct AlignArgs {
    /// XYZ file holding the structures to superimpose.
    #[arg(value_name = "PATH")]
    pub input: PathBuf,

    /// XYZ file holding the target structure.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub target: PathBuf,

    /// 0-based index of the target structure within its file.
    #[arg(long, default_value_t = 0, value_name = "INT")]
    pub index: usize,

    /// Path for the aligned multi-structure XYZ file.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,

    /// Optional CSV file receiving the RMSD before and after alignment of each structure.
    #[arg(long, value_name = "PATH")]
    pub summary: Option<PathBuf>,
}

/// Arguments for the `measure` subcommand.
#[derive(Args, Debug)]
pub struct MeasureArgs {
    /// XYZ file holding the structures to measure.
    #[arg(value_name = "PATH")]
    pub input: PathBuf,

    /// TOML file listing the features and the constraints they must satisfy.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub constraints: PathBuf,

    /// CSV file of reference bonds (columns: first, second, i, j).
    #[arg(short, long, value_name = "PATH")]
    pub reference: Option<PathBuf>,

    /// Path for the CSV file receiving the measurements. Prints to stdout when omitted.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Path for the CSV file listing bonds broken or formed relative to the reference.
    #[arg(long, value_name = "PATH", requires = "reference")]
    pub bond_report: Option<PathBuf>,
}
