use crate::cli::MeasureArgs;
use crate::error::{CliError, Result};
use crate::utils::output;
use tracing::info;
use trajcmp::core::bonds::ReferenceBonds;
use trajcmp::core::features::constraints::ConstraintSet;
use trajcmp::workflows;

pub fn run(args: MeasureArgs) -> Result<()> {
    let constraints =
        ConstraintSet::load(&args.constraints).map_err(|e| CliError::FileParsing {
            path: args.constraints.clone(),
            source: e.into(),
        })?;
    let reference = args
        .reference
        .as_ref()
        .map(|path| {
            ReferenceBonds::load(path).map_err(|e| CliError::FileParsing {
                path: path.clone(),
                source: e.into(),
            })
        })
        .transpose()?;

    info!(
        "Measuring {} constrained feature(s) on {:?}",
        constraints.constraints.len(),
        &args.input
    );
    let report = workflows::measure::run(&args.input, &constraints, reference.as_ref())?;

    output::write_records(args.output.as_deref(), &report.measurements)?;
    if let Some(path) = &args.bond_report {
        output::write_records(Some(path.as_path()), &report.bond_reports)?;
    }

    eprintln!(
        "{} structure(s) satisfy every constraint{}.",
        report.valid.len(),
        if reference.is_some() {
            " and match the reference bonds"
        } else {
            ""
        }
    );
    Ok(())
}
