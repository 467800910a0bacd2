use crate::core::models::structure::MolecularStructure;
use std::error::Error;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Defines the interface for reading and writing molecular geometry files.
///
/// A single file may hold several geometries (an optimization trajectory or a conformer
/// ensemble), so readers return every block in file order and writers accept a slice.
pub trait MolecularFile {
    /// The error type for I/O operations.
    type Error: Error + From<io::Error>;

    /// Reads every structure from a buffered reader.
    ///
    /// Structures carry the description found in the file; `name` and `source` are left empty.
    ///
    /// # Errors
    ///
    /// Returns an error if parsing fails or I/O operations encounter issues.
    fn read_from(reader: &mut impl BufRead) -> Result<Vec<MolecularStructure>, Self::Error>;

    /// Writes structures, one block each, to a writer.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    fn write_to(
        structures: &[MolecularStructure],
        writer: &mut impl Write,
    ) -> Result<(), Self::Error>;

    /// Reads every structure from a file, naming them after the file stem.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or parsing fails.
    fn read_from_path<P: AsRef<Path>>(path: P) -> Result<Vec<MolecularStructure>, Self::Error> {
        let path = path.as_ref();
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self::read_named_from_path(path, &stem)
    }

    /// Reads every structure from a file under a caller-chosen logical name.
    ///
    /// The file name becomes each structure's `source`. When the file holds more than one
    /// block, names receive a 1-based suffix (`name_1`, `name_2`, ...); a single block keeps
    /// the bare name.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or parsing fails.
    fn read_named_from_path<P: AsRef<Path>>(
        path: P,
        name: &str,
    ) -> Result<Vec<MolecularStructure>, Self::Error> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        let mut structures = Self::read_from(&mut reader)?;

        let source = path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        assign_block_names(&mut structures, name);
        for structure in &mut structures {
            structure.set_source(source.clone());
        }
        Ok(structures)
    }

    /// Writes structures to a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or writing fails.
    fn write_to_path<P: AsRef<Path>>(
        structures: &[MolecularStructure],
        path: P,
    ) -> Result<(), Self::Error> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        Self::write_to(structures, &mut writer)?;
        writer.flush()?;
        Ok(())
    }
}

/// Names a sequence of blocks read from one file.
pub fn assign_block_names(structures: &mut [MolecularStructure], name: &str) {
    let numbered = structures.len() > 1;
    for (idx, structure) in structures.iter_mut().enumerate() {
        if numbered {
            structure.set_name(format!("{}_{}", name, idx + 1));
        } else {
            structure.set_name(name);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn atom() -> MolecularStructure {
        MolecularStructure::from_coords(vec![1], &[[0.0, 0.0, 0.0]]).unwrap()
    }

    #[test]
    fn single_block_keeps_bare_name() {
        let mut structures = vec![atom()];
        assign_block_names(&mut structures, "mol");
        assert_eq!(structures[0].name(), "mol");
    }

    #[test]
    fn multiple_blocks_get_one_based_suffixes() {
        let mut structures = vec![atom(), atom(), atom()];
        assign_block_names(&mut structures, "mol");
        let names: Vec<_> = structures.iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["mol_1", "mol_2", "mol_3"]);
    }
}
