use crate::cli::CompareArgs;
use crate::error::Result;
use crate::utils::{output, progress::CliProgressHandler};
use tracing::info;
use trajcmp::engine::batch::Comparator;
use trajcmp::engine::progress::ProgressReporter;
use trajcmp::workflows;

pub fn run(args: CompareArgs) -> Result<()> {
    let comparator = Comparator::new(args.comparison.metric, !args.comparison.no_align);

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    let table = workflows::compare::run(&args.targets, &args.structures, comparator, &reporter)?;
    info!(
        "Compared {} target(s) against {} structure(s).",
        table.target_names.len(),
        table.structure_names.len()
    );

    output::write_records(args.output.as_deref(), &table.records())?;

    for (target, best) in table.target_names.iter().zip(table.best_matches()) {
        if let Some((index, value)) = best {
            eprintln!(
                "  {} -> {} ({} = {:.4})",
                target, table.structure_names[index], comparator.metric, value
            );
        }
    }
    Ok(())
}
