use crate::cli::DuplicatesArgs;
use crate::error::Result;
use crate::utils::{output, progress::CliProgressHandler};
use tracing::{info, warn};
use trajcmp::engine::config::DuplicateSearchConfigBuilder;
use trajcmp::engine::progress::ProgressReporter;
use trajcmp::workflows;

pub fn run(args: DuplicatesArgs) -> Result<()> {
    let mut builder = DuplicateSearchConfigBuilder::new()
        .targets(args.targets.clone())
        .threshold(args.threshold)
        .metric(args.comparison.metric)
        .align(!args.comparison.no_align);
    if let Some(against) = &args.against {
        builder = builder.structures(against.clone());
    }
    let config = builder.build()?;

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    info!(
        "Searching for pairs with {} below {}",
        config.metric, config.threshold
    );
    let report = workflows::duplicates::run(&config, &reporter)?;

    if report.failed > 0 {
        warn!("{} comparison(s) failed and were skipped.", report.failed);
    }
    output::write_records(args.output.as_deref(), &report.matches)?;

    eprintln!(
        "Found {} near-duplicate pair(s) among {} comparison(s).",
        report.matches.len(),
        report.compared
    );
    Ok(())
}
