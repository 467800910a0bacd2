use crate::core::io::traits::MolecularFile;
use crate::core::models::element;
use crate::core::models::structure::{MolecularStructure, StructureError, StructureInfo};
use nalgebra::Point3;
use std::io::{self, BufRead, Write};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum XyzError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error on line {line}: {kind}")]
    Parse { line: usize, kind: XyzParseErrorKind },
    #[error("Invalid structure: {0}")]
    Structure(#[from] StructureError),
}

#[derive(Debug, Error, PartialEq)]
pub enum XyzParseErrorKind {
    #[error("Invalid atom count '{0}'")]
    InvalidCount(String),
    #[error("Invalid {axis} coordinate (value: '{value}')")]
    InvalidFloat { axis: char, value: String },
    #[error("Unknown element '{0}'")]
    UnknownElement(String),
    #[error("Atom line needs an element and three coordinates, found {found} field(s)")]
    MissingField { found: usize },
    #[error("Block declares {expected} atoms but only {found} atom line(s) follow")]
    TruncatedBlock { expected: usize, found: usize },
}

/// Multi-block XYZ format: an atom-count line, a free-text description line, then one
/// `element x y z` line per atom, repeated for every geometry in the file.
pub struct XyzFile;

impl XyzFile {
    fn parse_atom_line(line: &str, line_num: usize) -> Result<(u8, Point3<f64>), XyzError> {
        let fields: Vec<&str> = line.split_whitespace().take(4).collect();
        if fields.len() < 4 {
            return Err(XyzError::Parse {
                line: line_num,
                kind: XyzParseErrorKind::MissingField {
                    found: fields.len(),
                },
            });
        }

        let z = element::parse_element(fields[0]).ok_or_else(|| XyzError::Parse {
            line: line_num,
            kind: XyzParseErrorKind::UnknownElement(fields[0].to_string()),
        })?;

        let mut coords = [0.0f64; 3];
        for (k, axis) in ['x', 'y', 'z'].into_iter().enumerate() {
            let raw = fields[k + 1];
            coords[k] = raw.parse().map_err(|_| XyzError::Parse {
                line: line_num,
                kind: XyzParseErrorKind::InvalidFloat {
                    axis,
                    value: raw.to_string(),
                },
            })?;
        }

        Ok((z, Point3::new(coords[0], coords[1], coords[2])))
    }

    fn is_count_line(line: &str) -> bool {
        let trimmed = line.trim();
        !trimmed.is_empty() && trimmed.bytes().all(|b| b.is_ascii_digit())
    }

    /// Formats one atom line: symbol in two columns, then three 18-column coordinates.
    pub fn format_atom_line(symbol: &str, position: &Point3<f64>) -> String {
        format!(
            "{:<2}{:>18.8}{:>18.8}{:>18.8}",
            symbol, position.x, position.y, position.z
        )
    }

    /// Comment line written for a structure: `"{name}, {description}, source: {source}"`.
    pub fn format_description(info: &StructureInfo) -> String {
        format!(
            "{}, {}, source: {}",
            info.name, info.description, info.source
        )
    }
}

impl MolecularFile for XyzFile {
    type Error = XyzError;

    fn read_from(reader: &mut impl BufRead) -> Result<Vec<MolecularStructure>, Self::Error> {
        let lines: Vec<String> = reader.lines().collect::<Result<_, _>>()?;
        let mut structures = Vec::new();
        let mut cursor = 0;

        while cursor < lines.len() {
            if !Self::is_count_line(&lines[cursor]) {
                cursor += 1;
                continue;
            }

            let count_line_num = cursor + 1;
            let count_str = lines[cursor].trim();
            let num_atoms: usize = count_str.parse().map_err(|_| XyzError::Parse {
                line: count_line_num,
                kind: XyzParseErrorKind::InvalidCount(count_str.to_string()),
            })?;

            let description = lines
                .get(cursor + 1)
                .map(|l| l.trim().to_string())
                .ok_or(XyzError::Parse {
                    line: count_line_num,
                    kind: XyzParseErrorKind::TruncatedBlock {
                        expected: num_atoms,
                        found: 0,
                    },
                })?;

            let first_atom = cursor + 2;
            let end = match first_atom.checked_add(num_atoms) {
                Some(end) if end <= lines.len() => end,
                _ => {
                    return Err(XyzError::Parse {
                        line: count_line_num,
                        kind: XyzParseErrorKind::TruncatedBlock {
                            expected: num_atoms,
                            found: lines.len().saturating_sub(first_atom),
                        },
                    });
                }
            };

            let mut atomic_numbers = Vec::with_capacity(num_atoms);
            let mut positions = Vec::with_capacity(num_atoms);
            for (offset, line) in lines[first_atom..end].iter().enumerate() {
                let (z, position) = Self::parse_atom_line(line, first_atom + offset + 1)?;
                atomic_numbers.push(z);
                positions.push(position);
            }

            let info = StructureInfo {
                description,
                ..StructureInfo::default()
            };
            structures.push(MolecularStructure::new(atomic_numbers, positions, info)?);
            cursor = end;
        }

        Ok(structures)
    }

    fn write_to(
        structures: &[MolecularStructure],
        writer: &mut impl Write,
    ) -> Result<(), Self::Error> {
        for structure in structures {
            writeln!(writer, "{}", structure.len())?;
            writeln!(writer, "{}", Self::format_description(structure.info()))?;
            for (symbol, position) in structure.symbols().iter().zip(structure.positions()) {
                writeln!(writer, "{}", Self::format_atom_line(symbol, position))?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufReader, Cursor};
    use tempfile::tempdir;

    const TWO_BLOCKS: &str = "\
3
step one
O   0.000000   0.000000   0.117300
H   0.000000   0.757200  -0.469200
H   0.000000  -0.757200  -0.469200

3
step two
o   0.000000   0.000000   0.120000
1   0.000000   0.760000  -0.470000
h   0.000000  -0.760000  -0.470000
";

    fn read(content: &str) -> Result<Vec<MolecularStructure>, XyzError> {
        XyzFile::read_from(&mut BufReader::new(Cursor::new(content)))
    }

    #[test]
    fn reads_every_block_in_order() {
        let structures = read(TWO_BLOCKS).unwrap();

        assert_eq!(structures.len(), 2);
        assert_eq!(structures[0].atomic_numbers(), &[8, 1, 1]);
        assert_eq!(structures[1].atomic_numbers(), &[8, 1, 1]);
        assert_eq!(structures[0].description(), "step one");
        assert_eq!(structures[1].description(), "step two");
        assert_eq!(structures[1].positions()[1], Point3::new(0.0, 0.76, -0.47));
        assert_eq!(structures[0].name(), "");
    }

    #[test]
    fn skips_leading_and_interleaved_junk_lines() {
        let content = format!("# generated\n\n{}", TWO_BLOCKS);
        assert_eq!(read(&content).unwrap().len(), 2);
    }

    #[test]
    fn empty_input_yields_no_structures() {
        assert!(read("").unwrap().is_empty());
    }

    #[test]
    fn truncated_block_is_reported() {
        let err = read("3\ncut short\nC 0 0 0\n").unwrap_err();
        match err {
            XyzError::Parse { line, kind } => {
                assert_eq!(line, 1);
                assert_eq!(
                    kind,
                    XyzParseErrorKind::TruncatedBlock {
                        expected: 3,
                        found: 1
                    }
                );
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn oversized_atom_count_is_a_truncated_block() {
        let err = read("18446744073709551615\ndesc\nH 0 0 0\n").unwrap_err();
        match err {
            XyzError::Parse { line, kind } => {
                assert_eq!(line, 1);
                assert_eq!(
                    kind,
                    XyzParseErrorKind::TruncatedBlock {
                        expected: usize::MAX,
                        found: 1
                    }
                );
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn invalid_coordinate_reports_line_and_axis() {
        let err = read("1\n\nC 0.0 abc 0.0\n").unwrap_err();
        match err {
            XyzError::Parse { line, kind } => {
                assert_eq!(line, 3);
                assert_eq!(
                    kind,
                    XyzParseErrorKind::InvalidFloat {
                        axis: 'y',
                        value: "abc".to_string()
                    }
                );
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn unknown_element_is_reported() {
        let err = read("1\n\nQq 0.0 0.0 0.0\n").unwrap_err();
        assert!(matches!(
            err,
            XyzError::Parse {
                kind: XyzParseErrorKind::UnknownElement(_),
                ..
            }
        ));
    }

    #[test]
    fn short_atom_line_is_reported() {
        let err = read("1\n\nC 0.0 0.0\n").unwrap_err();
        assert!(matches!(
            err,
            XyzError::Parse {
                kind: XyzParseErrorKind::MissingField { found: 3 },
                ..
            }
        ));
    }

    #[test]
    fn atom_lines_are_fixed_width() {
        let line = XyzFile::format_atom_line("C", &Point3::new(1.5, -0.25, 10.0));
        assert_eq!(line.len(), 56);
        assert_eq!(
            line,
            "C         1.50000000       -0.25000000       10.00000000"
        );
    }

    #[test]
    fn read_from_path_names_blocks_after_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("water_opt.xyz");
        std::fs::write(&path, TWO_BLOCKS).unwrap();

        let structures = XyzFile::read_from_path(&path).unwrap();

        assert_eq!(structures[0].name(), "water_opt_1");
        assert_eq!(structures[1].name(), "water_opt_2");
        assert_eq!(structures[0].source(), "water_opt.xyz");
    }

    #[test]
    fn written_file_reads_back_with_same_coordinates() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("in.xyz");
        let output = dir.path().join("out.xyz");
        std::fs::write(&input, TWO_BLOCKS).unwrap();

        let original = XyzFile::read_from_path(&input).unwrap();
        XyzFile::write_to_path(&original, &output).unwrap();
        let reread = XyzFile::read_from_path(&output).unwrap();

        assert_eq!(reread.len(), original.len());
        assert_eq!(reread[0].description(), "in_1, step one, source: in.xyz");
        for (a, b) in original.iter().zip(reread.iter()) {
            assert_eq!(a.atomic_numbers(), b.atomic_numbers());
            for (p, q) in a.positions().iter().zip(b.positions()) {
                assert!((p - q).norm() < 1e-8);
            }
        }
    }
}
