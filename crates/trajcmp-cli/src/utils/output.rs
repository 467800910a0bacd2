use crate::error::Result;
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use tracing::info;

/// Writes `records` as CSV with a header row, to `path` or to stdout when `path` is `None`.
pub fn write_records<T: Serialize>(path: Option<&Path>, records: &[T]) -> Result<()> {
    match path {
        Some(path) => {
            info!("Writing {} record(s) to {:?}", records.len(), path);
            write_to(csv::Writer::from_path(path)?, records)
        }
        None => write_to(csv::Writer::from_writer(std::io::stdout().lock()), records),
    }
}

fn write_to<W: Write, T: Serialize>(mut writer: csv::Writer<W>, records: &[T]) -> Result<()> {
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Row<'a> {
        target: &'a str,
        value: f64,
    }

    #[test]
    fn records_are_written_with_a_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rows.csv");

        write_records(
            Some(path.as_path()),
            &[
                Row { target: "conf_1", value: 0.25 },
                Row { target: "conf_2", value: 1.5 },
            ],
        )
        .unwrap();

        let content = std::fs::read_to_string(path).unwrap();
        assert_eq!(content, "target,value\nconf_1,0.25\nconf_2,1.5\n");
    }

    #[test]
    fn missing_output_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("rows.csv");
        assert!(write_records::<Row>(Some(path.as_path()), &[]).is_err());
    }
}
