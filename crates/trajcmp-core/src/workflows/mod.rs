//! # Workflows Module
//!
//! File-level procedures that tie the [`core`](crate::core) codecs and the
//! [`engine`](crate::engine) together. Each workflow reads its inputs from disk, reports
//! progress through a [`ProgressReporter`](crate::engine::progress::ProgressReporter) and
//! returns plain, serializable results.
//!
//! - [`analyze`] - Trajectory analysis of several runs against a base run
//! - [`duplicates`] - Near-duplicate search within one file or across two files
//! - [`compare`] - Dense target-by-structure metric table for two files
//! - [`align`] - Superposition of every structure in a file onto a target, with export
//! - [`measure`] - Feature measurement, constraint checks and bond bookkeeping

pub mod align;
pub mod analyze;
pub mod compare;
pub mod duplicates;
pub mod error;
pub mod measure;

use crate::core::io::traits::MolecularFile;
use crate::core::io::xyz::XyzFile;
use crate::core::models::structure::MolecularStructure;
use error::WorkflowError;
use std::path::Path;
use tracing::debug;

/// Reads every structure of an XYZ file, failing on an empty file.
pub(crate) fn read_structures(path: &Path) -> Result<Vec<MolecularStructure>, WorkflowError> {
    let structures = XyzFile::read_from_path(path).map_err(|e| WorkflowError::Xyz {
        path: path.display().to_string(),
        source: e,
    })?;
    if structures.is_empty() {
        return Err(WorkflowError::EmptyInput(path.display().to_string()));
    }
    debug!(
        "Read {} structure(s) from '{}'.",
        structures.len(),
        path.display()
    );
    Ok(structures)
}
