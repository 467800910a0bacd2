use crate::cli::TrajectoryArgs;
use crate::config::PartialAnalysisConfig;
use crate::error::Result;
use crate::utils::{output, progress::CliProgressHandler};
use tracing::{info, warn};
use trajcmp::engine::progress::ProgressReporter;
use trajcmp::workflows;

pub fn run(args: TrajectoryArgs) -> Result<()> {
    let partial_config = PartialAnalysisConfig::from_file(&args.config)?;
    info!("Merging configuration from file and CLI arguments...");
    let config = partial_config.merge_with_cli(&args)?;

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    println!(
        "Analyzing {} trajectory(ies) against '{}'...",
        config.comparisons.len(),
        config.base.name
    );
    let analyzer = workflows::analyze::run(&config, &reporter)?;

    let mut failed = 0;
    for (spec, result) in analyzer.results() {
        if let Err(e) = result {
            failed += 1;
            warn!("Metric '{}' failed: {}", spec.label, e);
            println!("Warning: metric '{}' produced no series: {}", spec.label, e);
        }
    }

    let records = analyzer.records();
    output::write_records(Some(args.output.as_path()), &records)?;
    println!(
        "✓ {} series value(s) over {} step(s) for {} metric(s) written to: {}",
        records.len(),
        analyzer.num_steps(),
        analyzer.results().len() - failed,
        args.output.display()
    );

    Ok(())
}
