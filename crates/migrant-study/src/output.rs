//! Dataset writers.

use std::io::Write;

use serde_json::{Map, Value as JsonValue};

use crate::dataset::Dataset;
use crate::error::StudyResult;

/// Output encoding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Comma-separated values with a header row.
    #[default]
    Csv,
    /// One JSON object per row.
    JsonLines,
}

/// Writes a dataset in the requested format.
pub fn write_dataset<W: Write>(dataset: &Dataset, writer: W, format: OutputFormat) -> StudyResult<()> {
    match format {
        OutputFormat::Csv => write_csv(dataset, writer),
        OutputFormat::JsonLines => write_json_lines(dataset, writer),
    }
}

/// Writes a dataset as CSV.
pub fn write_csv<W: Write>(dataset: &Dataset, writer: W) -> StudyResult<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(dataset.header())?;
    for row in dataset.rows() {
        csv_writer.write_record(row.iter().map(|v| v.to_csv_field()))?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Writes a dataset as JSON lines keyed by column name.
pub fn write_json_lines<W: Write>(dataset: &Dataset, mut writer: W) -> StudyResult<()> {
    for row in dataset.rows() {
        let mut object = Map::with_capacity(row.len());
        for (name, value) in dataset.header().iter().zip(row) {
            object.insert(name.clone(), serde_json::to_value(value)?);
        }
        serde_json::to_writer(&mut writer, &JsonValue::Object(object))?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    fn dataset() -> Dataset {
        Dataset::new(
            "test",
            vec!["patient_id".to_string(), "region".to_string(), "any_migrant".to_string()],
            vec![
                vec![Value::Int(1), Value::from("North East"), Value::from(true)],
                vec![Value::Int(2), Value::Null, Value::from(false)],
            ],
        )
    }

    #[test]
    fn test_csv_output() {
        let mut out = Vec::new();
        write_dataset(&dataset(), &mut out, OutputFormat::Csv).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "patient_id,region,any_migrant\n1,North East,T\n2,,F\n"
        );
    }

    #[test]
    fn test_json_lines_output() {
        let mut out = Vec::new();
        write_dataset(&dataset(), &mut out, OutputFormat::JsonLines).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<JsonValue> = text
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["region"], "North East");
        assert_eq!(lines[1]["region"], JsonValue::Null);
        assert_eq!(lines[1]["any_migrant"], false);
    }

    #[test]
    fn test_empty_dataset_writes_header_only() {
        let empty = Dataset::new("empty", vec!["patient_id".to_string()], Vec::new());
        let mut out = Vec::new();
        write_csv(&empty, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "patient_id\n");
    }
}
