use crate::cli::AlignArgs;
use crate::error::Result;
use crate::utils::{output, progress::CliProgressHandler};
use tracing::info;
use trajcmp::engine::progress::ProgressReporter;
use trajcmp::workflows;

pub fn run(args: AlignArgs) -> Result<()> {
    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    let summaries = workflows::align::run(
        &args.target,
        args.index,
        &args.input,
        &args.output,
        &reporter,
    )?;

    if let Some(path) = &args.summary {
        output::write_records(Some(path.as_path()), &summaries)?;
    }

    if let Some(worst) = summaries
        .iter()
        .max_by(|a, b| a.rmsd_after.total_cmp(&b.rmsd_after))
    {
        info!(
            "Largest RMSD after alignment: {:.4} ({})",
            worst.rmsd_after, worst.name
        );
    }
    println!(
        "✓ {} aligned structure(s) written to: {}",
        summaries.len(),
        args.output.display()
    );
    Ok(())
}
